//! Daily blend simulation over the master timeline.
//!
//! The engine is a pure function of its inputs: immutable series, a weight
//! table and scalar settings in, freshly allocated curves out. Rerunning on
//! identical inputs yields bit-identical results, so callers recompute from
//! scratch on every input change instead of patching previous output.

use crate::analytics::{self, PortfolioStats};
use crate::schedule::ContributionSchedule;
use crate::timeline::{self, PriceCursor};
use crate::types::{ContributionFrequency, Strategy, TimeSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Scalar settings for a blend simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Starting dollar balance.
    #[serde(default = "default_balance")]
    pub initial_balance: f64,
    /// Recurring cash flow per qualifying month transition; negative
    /// withdraws.
    #[serde(default)]
    pub contribution_amount: f64,
    /// Cadence of the recurring cash flow.
    #[serde(default)]
    pub contribution_frequency: ContributionFrequency,
}

fn default_balance() -> f64 {
    100_000.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_balance: 100_000.0,
            contribution_amount: 0.0,
            contribution_frequency: ContributionFrequency::Monthly,
        }
    }
}

/// Output of a blend simulation. All curves are positionally aligned to
/// `dates` and equal in length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// The master timeline the curves are sampled on.
    pub dates: Vec<NaiveDate>,
    /// Dollar equity of the blend, scheduled contributions included.
    pub combined_equity: Vec<f64>,
    /// Time-weighted return index, base 100, free of cash-flow distortion.
    pub twr_index: Vec<f64>,
    /// Ids of the simulated strategies, parallel to `strategy_equities`.
    pub strategy_ids: Vec<String>,
    /// Per-strategy dollar equity. The weight sizes only the starting
    /// slice; each curve then compounds on its own returns.
    pub strategy_equities: Vec<Vec<f64>>,
    /// Benchmark dollar equity scaled to the starting balance; `None` when
    /// no benchmark was given or it has no usable price in the window.
    pub benchmark_equity: Option<Vec<f64>>,
    /// Combined-curve drawdown per date (percent, never positive).
    pub combined_drawdown: Vec<f64>,
    /// Benchmark drawdown per date (percent, never positive).
    pub benchmark_drawdown: Option<Vec<f64>>,
    /// Statistics of the blend. Ratio metrics are computed on the TWR index
    /// so contributions do not masquerade as returns; `final_balance` and
    /// `total_return` come from the dollar curve.
    pub stats: PortfolioStats,
    /// Statistics of the benchmark curve.
    pub benchmark_stats: Option<PortfolioStats>,
}

/// Run the day-by-day blend simulation.
///
/// Active strategies are those with a weight > 0 in `allocations` (percent
/// of deployed capital, 0-100). Weights are set once at inception: they size
/// the starting dollar slices and the blended daily return, and no
/// rebalancing ever occurs mid-simulation. Weights need not sum to 100.
///
/// Returns `None` — never a partial result — when no strategy is active or
/// the aligned timeline has fewer than 2 dates.
pub fn run_simulation(
    strategies: &[Strategy],
    allocations: &BTreeMap<String, f64>,
    benchmark: Option<&TimeSeries>,
    config: &SimulationConfig,
) -> Option<SimulationResult> {
    let active: Vec<&Strategy> = strategies
        .iter()
        .filter(|s| allocations.get(&s.id).copied().unwrap_or(0.0) > 0.0)
        .collect();
    if active.is_empty() {
        warn!("no strategy has a positive weight; nothing to simulate");
        return None;
    }

    let weights: Vec<f64> = active.iter().map(|s| allocations[&s.id] / 100.0).collect();
    let series: Vec<&TimeSeries> = active.iter().map(|s| &s.series).collect();

    let dates = timeline::master_timeline(&series, benchmark)?;
    let n = dates.len();
    let start = dates[0];
    let balance = config.initial_balance;
    let schedule = ContributionSchedule::new(
        config.contribution_amount,
        config.contribution_frequency,
    );

    info!(
        strategies = active.len(),
        days = n,
        start = %start,
        "running blend simulation"
    );

    let mut cursors: Vec<PriceCursor> = series.iter().map(|s| PriceCursor::new(s, start)).collect();

    let mut combined = Vec::with_capacity(n);
    combined.push(balance);
    let mut twr = Vec::with_capacity(n);
    twr.push(100.0);

    let mut strategy_equities: Vec<Vec<f64>> = weights
        .iter()
        .map(|w| {
            let slice = balance * w;
            let mut curve = Vec::with_capacity(n);
            curve.push(if slice > 0.0 { slice } else { balance });
            curve
        })
        .collect();

    // The benchmark is scaled by a fixed factor so its curve starts at the
    // same balance; it receives no contributions and ignores the weights.
    let mut bench_state = benchmark.and_then(|b| {
        let cursor = PriceCursor::new(b, start);
        match cursor.current() {
            Some(price) if price > 0.0 => {
                let mut curve = Vec::with_capacity(n);
                curve.push(balance);
                Some((cursor, balance / price, curve))
            }
            _ => {
                warn!("benchmark has no usable price in the simulation window");
                None
            }
        }
    });

    for i in 1..n {
        let date = dates[i];

        let mut weighted_return = 0.0;
        for (idx, cursor) in cursors.iter_mut().enumerate() {
            let daily = cursor.daily_return(date);
            weighted_return += daily * weights[idx];

            let prev = strategy_equities[idx][i - 1];
            strategy_equities[idx].push(prev * (1.0 + daily));
        }

        twr.push(twr[i - 1] * (1.0 + weighted_return));

        let injection = schedule.injection(dates[i - 1], date);
        combined.push(combined[i - 1] * (1.0 + weighted_return) + injection);

        if let Some((cursor, factor, curve)) = bench_state.as_mut() {
            let price = cursor.advance(date).unwrap_or(0.0);
            curve.push(price * *factor);
        }
    }

    // Ratio metrics come from the cash-flow-free index; the dollar totals
    // are overlaid from the contribution-bearing curve.
    let mut stats = PortfolioStats::from_curve(&twr, &dates);
    stats.final_balance = combined.last().copied().unwrap_or(balance);
    stats.total_return = if balance > 0.0 {
        (stats.final_balance - balance) / balance
    } else {
        0.0
    };

    let combined_drawdown = analytics::drawdown_series(&combined);

    let (benchmark_equity, benchmark_drawdown, benchmark_stats) = match bench_state {
        Some((_, _, curve)) => {
            let dd = analytics::drawdown_series(&curve);
            let stats = PortfolioStats::from_curve(&curve, &dates);
            (Some(curve), Some(dd), Some(stats))
        }
        None => (None, None, None),
    };

    Some(SimulationResult {
        dates,
        combined_equity: combined,
        twr_index: twr,
        strategy_ids: active.iter().map(|s| s.id.clone()).collect(),
        strategy_equities,
        benchmark_equity,
        combined_drawdown,
        benchmark_drawdown,
        stats,
        benchmark_stats,
    })
}
