//! Master-timeline construction and carry-forward price resolution.
//!
//! Active strategies sample on different calendars: some daily, some weekly,
//! some with holes. The simulation runs on the union of all observed dates,
//! clamped so it never starts before every active strategy has data, and
//! resolves a price for every (series, date) pair by carrying the last known
//! value across gaps.

use crate::types::TimeSeries;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

/// Merged, ascending trading dates across all series.
///
/// The simulation start is the latest first-sample date among `series` — a
/// strategy cannot contribute before it has data, so it constrains the whole
/// window. Benchmark dates widen the union but never move the start. Returns
/// `None` when fewer than 2 dates survive: a single point cannot produce a
/// return series. Series with no samples at all are ignored.
pub fn master_timeline(
    series: &[&TimeSeries],
    benchmark: Option<&TimeSeries>,
) -> Option<Vec<NaiveDate>> {
    let mut start: Option<NaiveDate> = None;
    let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();

    for s in series {
        let Some(first) = s.first_date() else {
            continue;
        };
        start = Some(match start {
            Some(cur) if cur >= first => cur,
            _ => first,
        });
        dates.extend(s.dates());
    }

    if let Some(bench) = benchmark {
        dates.extend(bench.dates());
    }

    let start = start?;
    let timeline: Vec<NaiveDate> = dates.range(start..).copied().collect();
    debug!(
        start = %start,
        dates = timeline.len(),
        "built master timeline"
    );
    (timeline.len() >= 2).then_some(timeline)
}

/// Carry-forward price resolution over one series.
///
/// Seeded at the first simulated date with the exact sample, else the most
/// recent prior sample, else the first sample after it. A series with no
/// samples at all resolves to nothing, and every return it is asked for is 0
/// — absence of data is never treated as a price change.
#[derive(Debug, Clone)]
pub struct PriceCursor<'a> {
    series: &'a TimeSeries,
    last: Option<f64>,
}

impl<'a> PriceCursor<'a> {
    /// Seed the cursor at the first simulated date.
    pub fn new(series: &'a TimeSeries, start: NaiveDate) -> Self {
        let last = series
            .at_or_before(start)
            .or_else(|| series.at_or_after(start));
        Self { series, last }
    }

    /// The last resolved price, if any sample has been seen.
    pub fn current(&self) -> Option<f64> {
        self.last
    }

    /// Move to `date`, carrying the previous value through gaps, and return
    /// the resolved price.
    pub fn advance(&mut self, date: NaiveDate) -> Option<f64> {
        if let Some(v) = self.series.get(date) {
            self.last = Some(v);
        }
        self.last
    }

    /// Simple return from the carried value to the value resolved at `date`.
    ///
    /// The previous value is whatever the cursor last resolved, not the
    /// calendar-yesterday sample, so a data gap yields a flat stretch of 0
    /// returns rather than one large jump. Non-positive or missing prior
    /// values also yield 0.
    pub fn daily_return(&mut self, date: NaiveDate) -> f64 {
        let prev = self.last;
        let curr = self.advance(date);
        match (prev, curr) {
            (Some(p), Some(c)) if p > 0.0 => (c - p) / p,
            _ => 0.0,
        }
    }
}
