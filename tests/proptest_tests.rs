//! Property-based tests using proptest for fuzzing and invariant testing.
//!
//! These tests verify that:
//! 1. The simulation is a pure function (bit-identical reruns)
//! 2. Drawdown invariants hold for arbitrary curves
//! 3. Correlation is symmetric and self-correlation is 1
//! 4. A single fully weighted strategy reproduces its own curve
//! 5. Contribution events respect the month-transition rule

use chrono::{Datelike, Duration, NaiveDate};
use proptest::prelude::*;
use proptest::strategy::Strategy as _;
use std::collections::BTreeMap;

use blendfolio::analytics::{drawdown_series, max_drawdown, PortfolioStats};
use blendfolio::correlation::pairwise_correlation;
use blendfolio::engine::{run_simulation, SimulationConfig};
use blendfolio::schedule::ContributionSchedule;
use blendfolio::timeline::master_timeline;
use blendfolio::types::{ContributionFrequency, Strategy, TimeSeries};

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()
}

/// Strategy producing a sparse series: 3-40 samples on distinct day offsets
/// within a two-year window, values well away from zero.
fn sparse_series_strategy() -> impl proptest::strategy::Strategy<Value = TimeSeries> {
    (
        prop::collection::btree_set(0i64..730, 3..40),
        prop::collection::vec(1.0..1000.0f64, 40),
    )
        .prop_map(|(offsets, values)| {
            TimeSeries::from_samples(
                offsets
                    .into_iter()
                    .zip(values)
                    .map(|(offset, value)| (epoch() + Duration::days(offset), value)),
            )
        })
}

/// Strategy producing an equity curve of positive values.
fn curve_strategy() -> impl proptest::strategy::Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.1..100_000.0f64, 2..200)
}

/// Strategy producing a sorted, unique list of simulated dates.
fn timeline_strategy() -> impl proptest::strategy::Strategy<Value = Vec<NaiveDate>> {
    prop::collection::btree_set(0i64..1500, 2..120).prop_map(|offsets| {
        offsets
            .into_iter()
            .map(|offset| epoch() + Duration::days(offset))
            .collect()
    })
}

fn frequency_strategy() -> impl proptest::strategy::Strategy<Value = ContributionFrequency> {
    prop_oneof![
        Just(ContributionFrequency::Monthly),
        Just(ContributionFrequency::Quarterly),
        Just(ContributionFrequency::SemiAnnually),
        Just(ContributionFrequency::Annually),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // ========================================================================
    // Simulation purity
    // ========================================================================

    #[test]
    fn simulation_is_idempotent(
        series_a in sparse_series_strategy(),
        series_b in sparse_series_strategy(),
        weight_a in 1.0..100.0f64,
        weight_b in 1.0..100.0f64,
        amount in -1000.0..1000.0f64,
        frequency in frequency_strategy(),
    ) {
        let a = Strategy::new("a", "A", series_a);
        let b = Strategy::new("b", "B", series_b);
        let mut allocations = BTreeMap::new();
        allocations.insert("a".to_string(), weight_a);
        allocations.insert("b".to_string(), weight_b);
        let config = SimulationConfig {
            initial_balance: 10_000.0,
            contribution_amount: amount,
            contribution_frequency: frequency,
        };

        let first = run_simulation(&[a.clone(), b.clone()], &allocations, None, &config);
        let second = run_simulation(&[a, b], &allocations, None, &config);

        // Bit-identical, including every curve.
        prop_assert_eq!(first, second);
    }

    #[test]
    fn single_full_weight_strategy_matches_combined(series in sparse_series_strategy()) {
        let strat = Strategy::new("solo", "Solo", series);
        let mut allocations = BTreeMap::new();
        allocations.insert("solo".to_string(), 100.0);
        let config = SimulationConfig {
            initial_balance: 10_000.0,
            contribution_amount: 0.0,
            contribution_frequency: ContributionFrequency::Monthly,
        };

        if let Some(result) = run_simulation(&[strat], &allocations, None, &config) {
            prop_assert_eq!(&result.combined_equity, &result.strategy_equities[0]);
        }
    }

    // ========================================================================
    // Drawdown invariants
    // ========================================================================

    #[test]
    fn drawdown_series_is_never_positive(curve in curve_strategy()) {
        let dd = drawdown_series(&curve);
        prop_assert_eq!(dd.len(), curve.len());

        let mut peak = f64::NEG_INFINITY;
        for (value, dd_value) in curve.iter().zip(dd.iter()) {
            prop_assert!(*dd_value <= 0.0);
            if *value > peak {
                peak = *value;
                // A new running maximum has zero drawdown.
                prop_assert_eq!(*dd_value, 0.0);
            }
        }
    }

    #[test]
    fn max_drawdown_is_a_fraction(curve in curve_strategy()) {
        let dd = max_drawdown(&curve);
        prop_assert!(dd >= 0.0);
        // Positive curves can never lose more than everything.
        prop_assert!(dd < 1.0);
    }

    #[test]
    fn window_peak_never_exceeds_global(curve in curve_strategy()) {
        // The whole-curve drawdown bounds any windowed one.
        let dates: Vec<NaiveDate> = (0..curve.len())
            .map(|i| epoch() + Duration::days(i as i64))
            .collect();
        let whole = max_drawdown(&curve);
        let windowed = blendfolio::max_drawdown_in_window(
            &curve,
            &dates,
            dates[dates.len() / 4],
            dates[dates.len() - 1],
        );
        if let Some(w) = windowed {
            prop_assert!(w <= whole + 1e-12);
        }
    }

    // ========================================================================
    // Correlation
    // ========================================================================

    #[test]
    fn correlation_is_symmetric(
        series_a in sparse_series_strategy(),
        series_b in sparse_series_strategy(),
    ) {
        let ab = pairwise_correlation(&series_a, &series_b);
        let ba = pairwise_correlation(&series_b, &series_a);
        // Same sums in the same order: bit-identical either way.
        prop_assert_eq!(ab.map(f64::to_bits), ba.map(f64::to_bits));
    }

    #[test]
    fn self_correlation_is_one(series in sparse_series_strategy()) {
        if let Some(corr) = pairwise_correlation(&series, &series) {
            // Degenerate constant-return series legitimately report 0.
            prop_assert!(corr == 0.0 || (corr - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn correlation_is_bounded(
        series_a in sparse_series_strategy(),
        series_b in sparse_series_strategy(),
    ) {
        if let Some(corr) = pairwise_correlation(&series_a, &series_b) {
            prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&corr));
        }
    }

    // ========================================================================
    // Timeline alignment
    // ========================================================================

    #[test]
    fn master_timeline_is_sorted_and_clamped(
        series_a in sparse_series_strategy(),
        series_b in sparse_series_strategy(),
    ) {
        if let Some(timeline) = master_timeline(&[&series_a, &series_b], None) {
            prop_assert!(timeline.windows(2).all(|w| w[0] < w[1]));

            let latest_start = series_a
                .first_date()
                .into_iter()
                .chain(series_b.first_date())
                .max()
                .unwrap();
            prop_assert_eq!(timeline[0], latest_start);
            prop_assert!(timeline.len() >= 2);
        }
    }

    // ========================================================================
    // Contribution scheduling
    // ========================================================================

    #[test]
    fn injections_only_fire_on_month_transitions(
        dates in timeline_strategy(),
        amount in 1.0..5000.0f64,
        frequency in frequency_strategy(),
    ) {
        let schedule = ContributionSchedule::new(amount, frequency);

        let mut fired = 0usize;
        let mut transitions = 0usize;
        for pair in dates.windows(2) {
            let transition = pair[0].month0() != pair[1].month0();
            if transition {
                transitions += 1;
            }
            let injection = schedule.injection(pair[0], pair[1]);
            if injection != 0.0 {
                prop_assert!(transition, "injection outside a month transition");
                prop_assert_eq!(injection, amount);
                fired += 1;
            }
        }
        prop_assert!(fired <= transitions);
    }

    #[test]
    fn monthly_cadence_fires_on_every_transition(dates in timeline_strategy()) {
        let schedule = ContributionSchedule::new(100.0, ContributionFrequency::Monthly);
        for pair in dates.windows(2) {
            let expected = pair[0].month0() != pair[1].month0();
            prop_assert_eq!(schedule.injection(pair[0], pair[1]) != 0.0, expected);
        }
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    #[test]
    fn stats_are_zeroed_below_two_points(value in 0.1..1000.0f64) {
        let date = epoch();
        let stats = PortfolioStats::from_curve(&[value], &[date]);
        prop_assert_eq!(stats, PortfolioStats::default());
    }

    #[test]
    fn win_rate_is_a_fraction(curve in curve_strategy()) {
        let dates: Vec<NaiveDate> = (0..curve.len())
            .map(|i| epoch() + Duration::days(i as i64))
            .collect();
        let stats = PortfolioStats::from_curve(&curve, &dates);
        prop_assert!((0.0..=1.0).contains(&stats.win_rate));
        prop_assert!(stats.max_win_streak < curve.len());
        prop_assert!(stats.max_loss_streak < curve.len());
    }
}
