//! Synthetic history generation for chart back-fill
//!
//! When a field has no recorded series, the dashboard still needs chart
//! data. Series are grown backwards from the current value: a baseline that
//! drifts up to today's reading, a day-of-year seasonal term, and bounded
//! seeded noise. Values are clamped to each metric's plotting range.

use chrono::{Datelike, Duration, NaiveDate};
use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::{MetricKind, MetricPoint, YearPoint};

/// Fraction of the current value the daily series starts from
const DAILY_START_RATIO: f64 = 0.85;

/// Fraction of the current yield the yearly series starts from
const YEARLY_START_RATIO: f64 = 0.70;

/// Fixed per-index weather multipliers for yearly series
const YEARLY_WEATHER_FACTORS: [f64; 5] = [0.94, 1.03, 0.90, 1.06, 1.0];

/// Generate a daily series of `point_count` points ending at `end_date`,
/// oldest first
pub fn generate_metric_history(
    current_value: f64,
    kind: MetricKind,
    point_count: usize,
    end_date: NaiveDate,
    seed: u64,
) -> Vec<MetricPoint> {
    if point_count == 0 {
        return Vec::new();
    }

    let (low, high) = kind.history_range();
    let (amplitude, jitter) = match kind {
        MetricKind::Ndvi => (0.04, 0.03),
        MetricKind::SoilMoisture => (2.5, 2.0),
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let start = current_value * DAILY_START_RATIO;
    let mut points = Vec::with_capacity(point_count);

    for i in 0..point_count {
        let date = end_date - Duration::days((point_count - 1 - i) as i64);
        let progress = if point_count == 1 {
            1.0
        } else {
            i as f64 / (point_count - 1) as f64
        };
        let baseline = start + (current_value - start) * progress;
        let seasonal =
            (2.0 * std::f64::consts::PI * date.ordinal() as f64 / 365.0).sin() * amplitude;
        let noise: f64 = rng.gen_range(-jitter..=jitter);

        points.push(MetricPoint {
            date,
            value: (baseline + seasonal + noise).clamp(low, high),
        });
    }

    points
}

/// Generate a yearly yield series ending at `end_year`, oldest first
///
/// Trends upward from ~70% of the current yield so the chart reflects
/// improving practices; values stay positive.
pub fn generate_yield_history(
    current_yield: f64,
    point_count: usize,
    end_year: i32,
    seed: u64,
) -> Vec<YearPoint> {
    if point_count == 0 {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let start = current_yield * YEARLY_START_RATIO;
    let mut points = Vec::with_capacity(point_count);

    for i in 0..point_count {
        let year = end_year - (point_count - 1 - i) as i32;
        let progress = if point_count == 1 {
            1.0
        } else {
            i as f64 / (point_count - 1) as f64
        };
        let baseline = start + (current_yield - start) * progress;
        let weather = YEARLY_WEATHER_FACTORS[i % YEARLY_WEATHER_FACTORS.len()];
        let noise: f64 = rng.gen_range(0.97..=1.03);

        points.push(YearPoint {
            year,
            value: (baseline * weather * noise).max(0.1),
        });
    }

    points
}
