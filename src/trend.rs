use chrono::Duration;

use crate::models::{DataPoint, TrendPoint};

/// Least-squares fit of response counts against sequence index. Calendar
/// gaps between points are not normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
}

pub fn compute_trend(points: &[DataPoint]) -> Trend {
    let n = points.len();
    if n == 0 {
        return Trend {
            slope: 0.0,
            intercept: 0.0,
        };
    }

    let y_mean = points.iter().map(|p| f64::from(p.count)).sum::<f64>() / n as f64;
    if n < 2 {
        // A single point cannot carry a direction.
        return Trend {
            slope: 0.0,
            intercept: y_mean,
        };
    }

    let x_mean = (n as f64 - 1.0) / 2.0;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, point) in points.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (f64::from(point.count) - y_mean);
        denominator += dx * dx;
    }

    let slope = numerator / denominator;
    Trend {
        slope,
        intercept: y_mean - slope * x_mean,
    }
}

/// Extends the fitted line `horizon_days` past the last observed date, one
/// point per calendar day. Pure and restartable; an empty series projects
/// nothing.
pub fn project_forward(
    points: &[DataPoint],
    trend: Trend,
    horizon_days: u32,
) -> impl Iterator<Item = TrendPoint> + Clone {
    let n = points.len();
    let last = points.last().map(|p| p.date);

    (1..=horizon_days).filter_map(move |k| {
        let date = last? + Duration::days(i64::from(k));
        Some(TrendPoint {
            date,
            value: trend.slope * (n as f64 + f64::from(k) - 1.0) + trend.intercept,
        })
    })
}

pub fn average_daily(points: &[DataPoint]) -> i64 {
    if points.is_empty() {
        return 0;
    }
    let total: f64 = points.iter().map(|p| f64::from(p.count)).sum();
    (total / points.len() as f64).round() as i64
}

/// Compares the mean of the first min(7, n) points against the mean of the
/// last min(7, n). `None` when the series is empty or the opening window
/// averaged zero responses, so a non-finite percentage never escapes.
pub fn projected_growth_percent(points: &[DataPoint]) -> Option<i64> {
    let n = points.len();
    if n == 0 {
        return None;
    }

    let window = n.min(7);
    let mean = |slice: &[DataPoint]| {
        slice.iter().map(|p| f64::from(p.count)).sum::<f64>() / slice.len() as f64
    };

    let first_avg = mean(&points[..window]);
    let last_avg = mean(&points[n - window..]);
    if first_avg == 0.0 {
        return None;
    }

    Some((100.0 * (last_avg - first_avg) / first_avg).round() as i64)
}
