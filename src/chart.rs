// src/chart.rs
//! Synthetic popularity history: noise around a base score, not measured data.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::trend::ChartPoint;

pub const CHART_POINTS: usize = 7;
const STEP_HOURS: i64 = 1;
const MAX_VARIANCE: f64 = 10.0;

/// 7 hourly points ending at `now`, oldest first.
/// Each value is `floor(clamp(base ± 10, 0, 100))`.
pub fn synthesize<R: Rng>(base: i64, now: DateTime<Utc>, rng: &mut R) -> Vec<ChartPoint> {
    (0..CHART_POINTS as i64)
        .rev()
        .map(|i| {
            let at = now - Duration::hours(i * STEP_HOURS);
            let variance = rng.random_range(-MAX_VARIANCE..MAX_VARIANCE);
            let value = (base as f64 + variance).clamp(0.0, 100.0).floor() as i64;
            ChartPoint {
                time: at.format("%I:%M %p").to_string(),
                value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn seven_hourly_points_ending_now() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let pts = synthesize(50, now, &mut rng);
        assert_eq!(pts.len(), CHART_POINTS);
        assert_eq!(pts.first().unwrap().time, "08:30 AM");
        assert_eq!(pts.last().unwrap().time, "02:30 PM");
    }

    #[test]
    fn values_stay_within_variance_and_bounds() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(42);
        for base in [-50, 0, 5, 50, 95, 100, 4_000] {
            for p in synthesize(base, now, &mut rng) {
                assert!((0..=100).contains(&p.value), "base {base} gave {}", p.value);
                if (10..=90).contains(&base) {
                    assert!((p.value - base).abs() <= 10);
                }
            }
        }
    }

    #[test]
    fn same_seed_same_series() {
        let now = Utc::now();
        let a = synthesize(60, now, &mut StdRng::seed_from_u64(1));
        let b = synthesize(60, now, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
