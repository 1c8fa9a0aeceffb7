//! Performance statistics, drawdown analysis and reporting.

use crate::engine::SimulationResult;
use chrono::{Datelike, NaiveDate};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabled::{builder::Builder, settings::Style};

/// Risk/return statistics derived from one equity curve and its date axis.
///
/// All ratio fields are plain fractions (0.12 = 12%), not percentages.
/// Computed once per curve; curves shorter than 2 points produce the zeroed
/// default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    /// Compound annual growth rate.
    pub cagr: f64,
    /// Annualized mean/volatility of daily returns.
    pub sharpe: f64,
    /// Like Sharpe, but over downside deviation only.
    pub sortino: f64,
    /// Maximum peak-to-trough decline, as a positive fraction.
    pub max_drawdown: f64,
    /// CAGR divided by max drawdown.
    pub calmar: f64,
    /// Total return over the whole curve.
    pub total_return: f64,
    /// Last value of the curve.
    pub final_balance: f64,
    /// Best calendar-year return.
    pub best_year: f64,
    /// Worst calendar-year return.
    pub worst_year: f64,
    /// Fraction of days with a positive return; zero-return days count in
    /// the denominator but are neither wins nor losses.
    pub win_rate: f64,
    /// Longest run of consecutive positive-return days.
    pub max_win_streak: usize,
    /// Longest run of consecutive negative-return days.
    pub max_loss_streak: usize,
    /// Calendar-year returns, geometrically compounded.
    pub annual_returns: BTreeMap<i32, f64>,
    /// Year -> month (0-11) -> geometrically compounded return.
    pub monthly_returns: BTreeMap<i32, BTreeMap<u32, f64>>,
    /// Year -> intra-year max drawdown; the peak resets each calendar year.
    pub annual_max_drawdowns: BTreeMap<i32, f64>,
}

impl PortfolioStats {
    /// Derive statistics from an equity curve positionally aligned to
    /// `dates`. Returns the zeroed default when fewer than 2 points exist or
    /// the axes disagree in length.
    pub fn from_curve(curve: &[f64], dates: &[NaiveDate]) -> Self {
        if curve.len() < 2 || dates.len() != curve.len() {
            return Self::default();
        }

        // Daily simple returns; a non-positive prior value yields 0.
        let returns: Vec<f64> = curve
            .windows(2)
            .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
            .collect();

        // Group returns by the date they were realized on and compound
        // geometrically within each (year, month) and year bucket.
        let mut month_factors: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        let mut year_factors: BTreeMap<i32, f64> = BTreeMap::new();
        for (i, r) in returns.iter().enumerate() {
            let date = dates[i + 1];
            *month_factors
                .entry((date.year(), date.month0()))
                .or_insert(1.0) *= 1.0 + r;
            *year_factors.entry(date.year()).or_insert(1.0) *= 1.0 + r;
        }

        let mut monthly_returns: BTreeMap<i32, BTreeMap<u32, f64>> = BTreeMap::new();
        for ((year, month), factor) in month_factors {
            monthly_returns
                .entry(year)
                .or_default()
                .insert(month, factor - 1.0);
        }
        let annual_returns: BTreeMap<i32, f64> =
            year_factors.into_iter().map(|(y, f)| (y, f - 1.0)).collect();

        // Intra-year max drawdown: the running peak resets at each year
        // boundary, unlike the whole-curve figure below.
        let mut annual_max_drawdowns: BTreeMap<i32, f64> = BTreeMap::new();
        let mut year_peak = f64::NEG_INFINITY;
        let mut current_year: Option<i32> = None;
        for (i, &value) in curve.iter().enumerate() {
            let year = dates[i].year();
            if current_year != Some(year) {
                current_year = Some(year);
                year_peak = f64::NEG_INFINITY;
                annual_max_drawdowns.entry(year).or_insert(0.0);
            }
            if value > year_peak {
                year_peak = value;
            }
            let dd = if year_peak > 0.0 {
                (year_peak - value) / year_peak
            } else {
                0.0
            };
            let entry = annual_max_drawdowns.entry(year).or_insert(0.0);
            if dd > *entry {
                *entry = dd;
            }
        }

        let first = curve[0];
        let last = curve[curve.len() - 1];

        // Duration floored at 0.1 years so near-degenerate windows cannot
        // explode the annualization exponent.
        let days = (dates[dates.len() - 1] - dates[0]).num_days().abs() as f64;
        let years = (days / 365.25).max(0.1);
        let cagr = if first > 0.0 {
            (last / first).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let max_drawdown = max_drawdown(curve);

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let downside_dev = if downside.is_empty() {
            0.0
        } else {
            (downside.iter().map(|r| r.powi(2)).sum::<f64>() / downside.len() as f64).sqrt()
        };

        // Dynamic annualization: derive samples-per-year from the data so
        // mixed trading calendars (252-day equities, 365-day crypto)
        // self-calibrate instead of assuming one constant.
        let samples_per_year = n / years;
        let annualization = if samples_per_year > 0.0 {
            samples_per_year.sqrt()
        } else {
            252.0_f64.sqrt()
        };

        let sharpe = if std_dev > 0.0 {
            mean / std_dev * annualization
        } else {
            0.0
        };
        let sortino = if downside_dev > 0.0 {
            mean / downside_dev * annualization
        } else {
            0.0
        };
        let calmar = if max_drawdown > 0.0 {
            cagr / max_drawdown
        } else {
            0.0
        };

        let best_year = annual_returns.values().copied().fold(f64::MIN, f64::max);
        let worst_year = annual_returns.values().copied().fold(f64::MAX, f64::min);
        let (best_year, worst_year) = if annual_returns.is_empty() {
            (0.0, 0.0)
        } else {
            (best_year, worst_year)
        };

        // Streaks: zero-return days break nothing and count as neither win
        // nor loss.
        let mut wins = 0usize;
        let mut max_win_streak = 0usize;
        let mut max_loss_streak = 0usize;
        let mut current_win = 0usize;
        let mut current_loss = 0usize;
        for r in &returns {
            if *r > 0.0 {
                wins += 1;
                current_win += 1;
                current_loss = 0;
                max_win_streak = max_win_streak.max(current_win);
            } else if *r < 0.0 {
                current_loss += 1;
                current_win = 0;
                max_loss_streak = max_loss_streak.max(current_loss);
            }
        }
        let win_rate = wins as f64 / n;

        let total_return = if first > 0.0 { (last - first) / first } else { 0.0 };

        Self {
            cagr,
            sharpe,
            sortino,
            max_drawdown,
            calmar,
            total_return,
            final_balance: last,
            best_year,
            worst_year,
            win_rate,
            max_win_streak,
            max_loss_streak,
            annual_returns,
            monthly_returns,
            annual_max_drawdowns,
        }
    }
}

/// Maximum peak-to-trough decline over a curve, as a positive fraction.
pub fn max_drawdown(curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0;
    for &value in curve {
        if value > peak {
            peak = value;
        }
        let dd = if peak > 0.0 { (peak - value) / peak } else { 0.0 };
        if dd > max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

/// Per-date drawdown from the running peak, in charting convention:
/// values are percentages and never positive (0 at every new high).
pub fn drawdown_series(curve: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    curve
        .iter()
        .map(|&value| {
            if value > peak {
                peak = value;
            }
            if peak > 0.0 {
                (value - peak) / peak * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Max drawdown restricted to the closed date interval `[start, end]`.
///
/// The running peak is local to the window, so a decline that began before
/// `start` only counts from the highest in-window value. `None` when fewer
/// than 2 samples fall inside the interval.
pub fn max_drawdown_in_window(
    curve: &[f64],
    dates: &[NaiveDate],
    start: NaiveDate,
    end: NaiveDate,
) -> Option<f64> {
    let subset: Vec<f64> = dates
        .iter()
        .zip(curve.iter())
        .filter(|(d, _)| **d >= start && **d <= end)
        .map(|(_, v)| *v)
        .collect();
    if subset.len() < 2 {
        return None;
    }
    Some(max_drawdown(&subset))
}

/// A named historical stress interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressWindow {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl StressWindow {
    fn new(name: &str, start: (i32, u32, u32), end: (i32, u32, u32)) -> Self {
        Self {
            name: name.to_string(),
            start: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        }
    }
}

/// The fixed set of historical market stress periods used in reports.
pub fn historical_stress_windows() -> Vec<StressWindow> {
    vec![
        StressWindow::new("Dotcom Bubble", (2000, 1, 1), (2002, 10, 8)),
        StressWindow::new("2008 Fin. Crisis", (2007, 10, 10), (2009, 3, 6)),
        StressWindow::new("Covid-19 Crash", (2020, 2, 19), (2020, 3, 23)),
        StressWindow::new("2022 Bear Market", (2022, 1, 4), (2022, 10, 12)),
        StressWindow::new("2025 Tariffs Crash", (2025, 2, 19), (2025, 4, 7)),
    ]
}

/// Drawdown figures for one stress window. `None` marks a window the curve
/// does not cover with at least 2 samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressEntry {
    pub window: StressWindow,
    pub portfolio_drawdown: Option<f64>,
    pub benchmark_drawdown: Option<f64>,
}

/// Max drawdowns of the combined and benchmark curves over each historical
/// stress window.
pub fn stress_report(result: &SimulationResult) -> Vec<StressEntry> {
    historical_stress_windows()
        .into_iter()
        .map(|window| {
            let portfolio_drawdown = max_drawdown_in_window(
                &result.combined_equity,
                &result.dates,
                window.start,
                window.end,
            );
            let benchmark_drawdown = result.benchmark_equity.as_ref().and_then(|curve| {
                max_drawdown_in_window(curve, &result.dates, window.start, window.end)
            });
            StressEntry {
                window,
                portfolio_drawdown,
                benchmark_drawdown,
            }
        })
        .collect()
}

/// Format simulation results for terminal display.
pub struct ResultFormatter;

impl ResultFormatter {
    /// Print the portfolio-vs-benchmark metrics report to stdout.
    pub fn print_report(result: &SimulationResult) {
        println!();
        println!("{}", "═".repeat(60).blue());
        println!("{}", " PORTFOLIO SIMULATION ".bold().blue());
        println!("{}", "═".repeat(60).blue());
        println!();

        let first = result.dates.first();
        let last = result.dates.last();
        if let (Some(start), Some(end)) = (first, last) {
            println!("{}", "Overview".bold().underline());
            println!("  Period:          {} to {}", start, end);
            println!("  Trading Days:    {}", result.dates.len());
            println!("  Strategies:      {}", result.strategy_ids.join(", "));
            println!();
        }

        let mut builder = Builder::new();
        builder.push_record(["Metric", "Portfolio", "Benchmark"]);
        let bench = result.benchmark_stats.as_ref();
        let rows: [(&str, String, Option<String>); 12] = [
            (
                "CAGR",
                Self::pct(result.stats.cagr),
                bench.map(|b| Self::pct(b.cagr)),
            ),
            (
                "Sharpe Ratio",
                format!("{:.2}", result.stats.sharpe),
                bench.map(|b| format!("{:.2}", b.sharpe)),
            ),
            (
                "Sortino Ratio",
                format!("{:.2}", result.stats.sortino),
                bench.map(|b| format!("{:.2}", b.sortino)),
            ),
            (
                "Max Drawdown",
                format!("-{}", Self::pct(result.stats.max_drawdown)),
                bench.map(|b| format!("-{}", Self::pct(b.max_drawdown))),
            ),
            (
                "Calmar Ratio",
                format!("{:.2}", result.stats.calmar),
                bench.map(|b| format!("{:.2}", b.calmar)),
            ),
            (
                "Total Return",
                Self::pct(result.stats.total_return),
                bench.map(|b| Self::pct(b.total_return)),
            ),
            (
                "Final Balance",
                format!("${:.0}", result.stats.final_balance),
                bench.map(|b| format!("${:.0}", b.final_balance)),
            ),
            (
                "Best Year",
                Self::pct(result.stats.best_year),
                bench.map(|b| Self::pct(b.best_year)),
            ),
            (
                "Worst Year",
                Self::pct(result.stats.worst_year),
                bench.map(|b| Self::pct(b.worst_year)),
            ),
            (
                "Win Rate",
                Self::pct(result.stats.win_rate),
                bench.map(|b| Self::pct(b.win_rate)),
            ),
            (
                "Max Win Streak",
                format!("{} days", result.stats.max_win_streak),
                bench.map(|b| format!("{} days", b.max_win_streak)),
            ),
            (
                "Max Loss Streak",
                format!("{} days", result.stats.max_loss_streak),
                bench.map(|b| format!("{} days", b.max_loss_streak)),
            ),
        ];
        for (label, portfolio, benchmark) in rows {
            builder.push_record([
                label.to_string(),
                portfolio,
                benchmark.unwrap_or_else(|| "-".to_string()),
            ]);
        }
        println!("{}", builder.build().with(Style::rounded()));
    }

    /// Print the historical stress-period table.
    pub fn print_stress_table(result: &SimulationResult) {
        let entries = stress_report(result);

        println!();
        println!("{}", "Historical Market Stress Periods".bold().underline());
        let mut builder = Builder::new();
        builder.push_record(["Event", "Date Range", "Portfolio Max DD", "Benchmark Max DD"]);
        for entry in &entries {
            builder.push_record([
                entry.window.name.clone(),
                format!("{} to {}", entry.window.start, entry.window.end),
                Self::dd(entry.portfolio_drawdown),
                Self::dd(entry.benchmark_drawdown),
            ]);
        }
        println!("{}", builder.build().with(Style::rounded()));
    }

    /// Print the monthly-returns grid, one row per year.
    pub fn print_monthly_table(stats: &PortfolioStats) {
        const MONTHS: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];

        println!();
        println!("{}", "Monthly Returns".bold().underline());
        let mut builder = Builder::new();
        let mut header = vec!["Year".to_string()];
        header.extend(MONTHS.iter().map(|m| m.to_string()));
        header.push("FY".to_string());
        builder.push_record(header);

        for (year, months) in &stats.monthly_returns {
            let mut row = vec![year.to_string()];
            for month in 0..12u32 {
                row.push(
                    months
                        .get(&month)
                        .map(|r| Self::pct(*r))
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            row.push(
                stats
                    .annual_returns
                    .get(year)
                    .map(|r| Self::pct(*r))
                    .unwrap_or_else(|| "-".to_string()),
            );
            builder.push_record(row);
        }
        println!("{}", builder.build().with(Style::rounded()));
    }

    /// Export a result to pretty-printed JSON.
    pub fn to_json(result: &SimulationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    fn pct(fraction: f64) -> String {
        format!("{:.2}%", fraction * 100.0)
    }

    fn dd(value: Option<f64>) -> String {
        match value {
            Some(v) => format!("-{:.2}%", v * 100.0),
            None => "-".to_string(),
        }
    }
}
