//! Core data types for the portfolio engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A sparse daily equity series: at most one sample per calendar day.
///
/// Backed by an ordered map, so iteration is always chronological. Gaps are
/// expected and meaningful (non-trading days, missing data) — consumers that
/// need a value for every date use carry-forward resolution, not this type.
/// Series are built once at load time and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    samples: BTreeMap<NaiveDate, f64>,
}

impl TimeSeries {
    /// Create an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from (date, value) pairs. Non-finite values are
    /// dropped; a repeated date keeps the last value seen.
    pub fn from_samples(samples: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        let mut series = Self::new();
        for (date, value) in samples {
            series.insert(date, value);
        }
        series
    }

    /// Insert a sample. Non-finite values are ignored.
    pub fn insert(&mut self, date: NaiveDate, value: f64) {
        if value.is_finite() {
            self.samples.insert(date, value);
        }
    }

    /// The sample recorded exactly on `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.samples.get(&date).copied()
    }

    /// The most recent sample at or before `date`.
    pub fn at_or_before(&self, date: NaiveDate) -> Option<f64> {
        self.samples.range(..=date).next_back().map(|(_, v)| *v)
    }

    /// The earliest sample at or after `date`.
    pub fn at_or_after(&self, date: NaiveDate) -> Option<f64> {
        self.samples.range(date..).next().map(|(_, v)| *v)
    }

    /// Date of the earliest sample.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.samples.keys().next().copied()
    }

    /// Date of the latest sample.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.samples.keys().next_back().copied()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Chronological iterator over sampled dates.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.samples.keys().copied()
    }

    /// Chronological iterator over (date, value) samples.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.samples.iter().map(|(d, v)| (*d, *v))
    }
}

/// A tradeable strategy: identity, display attributes and its equity series.
///
/// `price` and `info_url` are commercial metadata carried for catalog
/// consumers; the simulation never reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// Stable identifier used as the allocation key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display color (hex string).
    pub color: String,
    /// Built-in catalog entry vs. user-supplied upload.
    pub built_in: bool,
    /// The strategy's equity curve samples.
    pub series: TimeSeries,
    /// Optional list price.
    #[serde(default)]
    pub price: Option<f64>,
    /// Optional product info link.
    #[serde(default)]
    pub info_url: Option<String>,
}

impl Strategy {
    /// Create a user-supplied strategy with default display attributes.
    pub fn new(id: impl Into<String>, name: impl Into<String>, series: TimeSeries) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: "#3b82f6".to_string(),
            built_in: false,
            series,
            price: None,
            info_url: None,
        }
    }

    /// Set the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Mark as a built-in catalog entry with commercial metadata.
    pub fn with_listing(mut self, price: f64, info_url: impl Into<String>) -> Self {
        self.built_in = true;
        self.price = Some(price);
        self.info_url = Some(info_url.into());
        self
    }
}

/// Cadence of the recurring cash flow.
///
/// An event is only ever considered at an observed month transition on the
/// simulated timeline; the cadence then filters which transitions qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ContributionFrequency {
    /// Every month transition.
    #[default]
    Monthly,
    /// Transitions into January, April, July, October.
    Quarterly,
    /// Transitions into January and July.
    SemiAnnually,
    /// Transitions into January only.
    Annually,
}

impl ContributionFrequency {
    /// Whether a transition into the given 0-based month qualifies.
    pub fn fires_on(&self, month0: u32) -> bool {
        match self {
            ContributionFrequency::Monthly => true,
            ContributionFrequency::Quarterly => month0 % 3 == 0,
            ContributionFrequency::SemiAnnually => month0 % 6 == 0,
            ContributionFrequency::Annually => month0 == 0,
        }
    }
}

impl fmt::Display for ContributionFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContributionFrequency::Monthly => "monthly",
            ContributionFrequency::Quarterly => "quarterly",
            ContributionFrequency::SemiAnnually => "semi-annually",
            ContributionFrequency::Annually => "annually",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ContributionFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(ContributionFrequency::Monthly),
            "quarterly" => Ok(ContributionFrequency::Quarterly),
            "semi-annually" | "semiannually" => Ok(ContributionFrequency::SemiAnnually),
            "annually" | "yearly" => Ok(ContributionFrequency::Annually),
            other => Err(format!("unknown contribution frequency: {}", other)),
        }
    }
}
