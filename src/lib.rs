//! Blendfolio - a backtesting engine for weighted blends of strategy equity
//! curves.
//!
//! # Overview
//!
//! Blendfolio takes a set of strategy equity series sampled on irregular,
//! gappy daily calendars, aligns them onto one master timeline, and runs a
//! day-by-day compounding simulation of a weighted blend against an optional
//! benchmark:
//!
//! - **Timeline alignment**: the union of all sampled dates, clamped so the
//!   simulation never starts before every active strategy has data
//! - **Carry-forward pricing**: missing samples resolve to the last known
//!   value, so data gaps read as flat days rather than price jumps
//! - **Scheduled cash flows**: monthly through annual contributions (or
//!   withdrawals) injected at observed month boundaries
//! - **Analytics**: CAGR, Sharpe, Sortino, Calmar, drawdowns, annual and
//!   monthly return tables, win/loss streaks, pairwise correlations, and
//!   max drawdown over historical stress windows
//!
//! The engine is synchronous, single-threaded and pure: identical inputs
//! produce bit-identical curves, so callers simply recompute on every input
//! change.
//!
//! # Quick Start
//!
//! ```
//! use blendfolio::{run_simulation, SimulationConfig, Strategy, TimeSeries};
//! use chrono::NaiveDate;
//! use std::collections::BTreeMap;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let series = TimeSeries::from_samples([
//!     (day(2), 100.0),
//!     (day(3), 101.5),
//!     (day(4), 103.0),
//! ]);
//! let strategy = Strategy::new("trend", "Trend Following", series);
//!
//! let mut allocations = BTreeMap::new();
//! allocations.insert("trend".to_string(), 100.0);
//!
//! let result = run_simulation(&[strategy], &allocations, None, &SimulationConfig::default())
//!     .expect("at least two aligned dates");
//! println!("CAGR:   {:.2}%", result.stats.cagr * 100.0);
//! println!("Max DD: {:.2}%", result.stats.max_drawdown * 100.0);
//! ```
//!
//! # Modules
//!
//! - [`types`]: Core data types (TimeSeries, Strategy, ContributionFrequency)
//! - [`data`]: Date/value normalization for externally supplied records
//! - [`timeline`]: Master-timeline alignment and carry-forward resolution
//! - [`schedule`]: Contribution scheduling at month boundaries
//! - [`engine`]: The daily blend simulation
//! - [`analytics`]: Performance statistics, drawdowns and reporting
//! - [`correlation`]: Pairwise return correlations
//! - [`config`]: TOML configuration file support

pub mod analytics;
pub mod config;
pub mod correlation;
pub mod data;
pub mod engine;
pub mod error;
pub mod schedule;
pub mod timeline;
pub mod types;

// Re-exports for convenience
pub use analytics::{
    drawdown_series, historical_stress_windows, max_drawdown, max_drawdown_in_window,
    stress_report, PortfolioStats, ResultFormatter, StressEntry, StressWindow,
};
pub use config::{PortfolioFileConfig, PortfolioSettings};
pub use correlation::{pairwise_correlation, CorrelationMatrix};
pub use data::{normalize_date, parse_value, series_from_records};
pub use engine::{run_simulation, SimulationConfig, SimulationResult};
pub use error::{PortfolioError, Result};
pub use schedule::ContributionSchedule;
pub use timeline::{master_timeline, PriceCursor};
pub use types::{ContributionFrequency, Strategy, TimeSeries};
