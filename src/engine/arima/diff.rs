//! Differencing, integration and differencing-order heuristics.

/// Apply `d` rounds of first differencing.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    seasonal_difference(series, d, 1)
}

/// Apply `d` rounds of lag-`period` differencing.
///
/// Each round shortens the series by `period`; a round that would empty the
/// series is skipped.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    if period == 0 {
        return result;
    }
    for _ in 0..d {
        if result.len() <= period {
            break;
        }
        result = (period..result.len())
            .map(|i| result[i] - result[i - period])
            .collect();
    }
    result
}

/// Undo `d` rounds of first differencing for values that follow `history`.
///
/// `forecast` is on the `d`-times differenced scale; the result continues
/// `history` on its original scale.
pub fn integrate(forecast: &[f64], history: &[f64], d: usize) -> Vec<f64> {
    seasonal_integrate(forecast, history, d, 1)
}

/// Undo `d` rounds of lag-`period` differencing for values that follow
/// `history`.
pub fn seasonal_integrate(forecast: &[f64], history: &[f64], d: usize, period: usize) -> Vec<f64> {
    if d == 0 || period == 0 || forecast.is_empty() {
        return forecast.to_vec();
    }

    let mut result = forecast.to_vec();
    for level in (0..d).rev() {
        let base = seasonal_difference(history, level, period);
        if base.len() < period {
            break;
        }
        let mut extended = base.clone();
        extended.reserve(result.len());
        for &step in &result {
            let anchor = extended[extended.len() - period];
            extended.push(anchor + step);
        }
        result = extended.split_off(base.len());
    }
    result
}

/// Suggest a first-differencing order (0, 1 or 2) by how much each round
/// shrinks the variance.
pub fn suggest_differencing(series: &[f64], max_d: usize) -> usize {
    let mut d = 0;
    let mut current = series.to_vec();
    let mut current_var = variance(&current);

    while d < max_d && current.len() > 3 {
        let next = difference(&current, 1);
        let next_var = variance(&next);
        if !(current_var > 0.0 && next_var / current_var < 0.9) {
            break;
        }
        d += 1;
        current = next;
        current_var = next_var;
    }
    d
}

/// Suggest a seasonal differencing order (0 or 1).
///
/// Needs at least two full cycles; picks 1 when lag-`period` differencing
/// removes at least 30% of the variance.
pub fn suggest_seasonal_differencing(series: &[f64], period: usize) -> usize {
    if period < 2 || series.len() < 2 * period {
        return 0;
    }
    let original = population_variance(series);
    let differenced = population_variance(&seasonal_difference(series, 1, period));
    if original > 0.0 && differenced < original * 0.7 {
        1
    } else {
        0
    }
}

/// Sample variance (n - 1 denominator); 0 for fewer than two values.
pub fn variance(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let sum_sq = squared_deviations(series);
    sum_sq / (series.len() - 1) as f64
}

fn population_variance(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    squared_deviations(series) / series.len() as f64
}

fn squared_deviations(series: &[f64]) -> f64 {
    let mean = series.iter().sum::<f64>() / series.len() as f64;
    series.iter().map(|x| (x - mean).powi(2)).sum()
}
