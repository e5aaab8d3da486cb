//! Seasonal ARIMA model estimated by conditional sum of squares.

use std::fmt;

use crate::engine::arima::diff::{difference, integrate, seasonal_difference, seasonal_integrate};
use crate::engine::optimize::{nelder_mead, NelderMeadConfig};
use crate::engine::Forecaster;
use crate::error::{EngineError, Result};

/// Coefficient bound keeping each polynomial term inside the unit interval.
const COEFFICIENT_BOUND: f64 = 0.99;

/// Model order (p, d, q)(P, D, Q)\[s\].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelOrder {
    /// Non-seasonal AR order.
    pub p: usize,
    /// Non-seasonal differencing order.
    pub d: usize,
    /// Non-seasonal MA order.
    pub q: usize,
    /// Seasonal AR order.
    pub cap_p: usize,
    /// Seasonal differencing order.
    pub cap_d: usize,
    /// Seasonal MA order.
    pub cap_q: usize,
    /// Seasonal period (0 when non-seasonal).
    pub s: usize,
}

impl ModelOrder {
    /// Non-seasonal ARIMA(p, d, q).
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::seasonal(p, d, q, 0, 0, 0, 0)
    }

    /// SARIMA(p, d, q)(P, D, Q)\[s\].
    pub fn seasonal(
        p: usize,
        d: usize,
        q: usize,
        cap_p: usize,
        cap_d: usize,
        cap_q: usize,
        s: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            cap_p,
            cap_d,
            cap_q,
            s,
        }
    }

    /// True when any seasonal term is active.
    pub fn is_seasonal(&self) -> bool {
        self.s > 1 && (self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0)
    }

    /// Highest AR lag after multiplying out the seasonal polynomial.
    pub fn ar_lags(&self) -> usize {
        self.p + self.cap_p * self.s
    }

    /// Highest MA lag after multiplying out the seasonal polynomial.
    pub fn ma_lags(&self) -> usize {
        self.q + self.cap_q * self.s
    }

    /// Number of AR and MA coefficients to estimate.
    pub fn num_coefficients(&self) -> usize {
        self.p + self.q + self.cap_p + self.cap_q
    }

    /// Observations lost to differencing.
    pub fn lost_to_differencing(&self) -> usize {
        self.d + self.cap_d * self.s
    }

    /// Whether the model estimates a mean term; only with little differencing.
    pub fn includes_mean(&self) -> bool {
        self.d + self.cap_d < 2
    }

    /// Shortest series this order can be estimated on.
    pub fn min_observations(&self) -> usize {
        self.lost_to_differencing()
            + self.ar_lags().max(self.ma_lags())
            + self.num_coefficients()
            + 3
    }
}

impl fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)?;
        if self.is_seasonal() {
            write!(
                f,
                "({},{},{})[{}]",
                self.cap_p, self.cap_d, self.cap_q, self.s
            )?;
        }
        Ok(())
    }
}

/// SARIMA forecasting model.
///
/// The seasonal and non-seasonal polynomials are multiplied out into sparse
/// AR/MA lag lists; coefficients are estimated by minimising the conditional
/// sum of squares with pre-sample deviations and errors fixed at zero, so every
/// differenced observation contributes a residual regardless of order.
#[derive(Debug, Clone)]
pub struct SeasonalArima {
    order: ModelOrder,
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
    mean: f64,
    /// Original series.
    history: Option<Vec<f64>>,
    /// Series after regular and seasonal differencing.
    differenced: Option<Vec<f64>>,
    /// One-step residuals on the differenced scale.
    residuals: Option<Vec<f64>>,
    /// In-sample one-step predictions on the original scale.
    fitted: Option<Vec<f64>>,
    sigma2: Option<f64>,
    aic: Option<f64>,
    bic: Option<f64>,
}

impl SeasonalArima {
    pub fn new(order: ModelOrder) -> Self {
        Self {
            order,
            ar: vec![],
            ma: vec![],
            seasonal_ar: vec![],
            seasonal_ma: vec![],
            mean: 0.0,
            history: None,
            differenced: None,
            residuals: None,
            fitted: None,
            sigma2: None,
            aic: None,
            bic: None,
        }
    }

    /// Non-seasonal ARIMA(p, d, q).
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self::new(ModelOrder::new(p, d, q))
    }

    pub fn order(&self) -> ModelOrder {
        self.order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.seasonal_ar
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.seasonal_ma
    }

    /// Mean of the differenced series (0 when no mean term is estimated).
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Residual variance.
    pub fn sigma2(&self) -> Option<f64> {
        self.sigma2
    }

    pub fn aic(&self) -> Option<f64> {
        self.aic
    }

    pub fn bic(&self) -> Option<f64> {
        self.bic
    }

    /// Split an optimiser parameter vector into (mean, ar, ma, sar, sma).
    fn unpack<'a>(&self, params: &'a [f64]) -> (f64, Lags<'a>) {
        let o = self.order;
        let (mean, rest) = if o.includes_mean() {
            (params[0], &params[1..])
        } else {
            (0.0, params)
        };
        let (ar, rest) = rest.split_at(o.p);
        let (ma, rest) = rest.split_at(o.q);
        let (sar, sma) = rest.split_at(o.cap_p);
        (mean, Lags { ar, ma, sar, sma })
    }

    fn estimate(&mut self, w: &[f64]) {
        let o = self.order;
        let sample_mean = w.iter().sum::<f64>() / w.len() as f64;

        let mut initial = Vec::with_capacity(o.num_coefficients() + 1);
        let mut bounds = Vec::with_capacity(o.num_coefficients() + 1);
        if o.includes_mean() {
            initial.push(sample_mean);
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        for count in [o.p, o.q, o.cap_p, o.cap_q] {
            for i in 0..count {
                initial.push(0.1 / (i + 1) as f64);
                bounds.push((-COEFFICIENT_BOUND, COEFFICIENT_BOUND));
            }
        }

        if initial.is_empty() {
            self.mean = 0.0;
            return;
        }

        let period = o.s;
        let config = NelderMeadConfig {
            max_iter: 400 + 100 * initial.len(),
            tolerance: 1e-9,
            ..Default::default()
        };
        let result = nelder_mead(
            |params| {
                let (mean, lags) = self.unpack(params);
                if !lags.is_admissible() {
                    return f64::INFINITY;
                }
                let (ar, ma) = lags.expand(period);
                css(w, &ar, &ma, mean)
            },
            &initial,
            Some(bounds.as_slice()),
            &config,
        );

        let (mean, lags) = self.unpack(&result.point);
        let (ar, ma, sar, sma) = (
            lags.ar.to_vec(),
            lags.ma.to_vec(),
            lags.sar.to_vec(),
            lags.sma.to_vec(),
        );
        self.mean = mean;
        self.ar = ar;
        self.ma = ma;
        self.seasonal_ar = sar;
        self.seasonal_ma = sma;
    }

    fn lags(&self) -> Lags<'_> {
        Lags {
            ar: &self.ar,
            ma: &self.ma,
            sar: &self.seasonal_ar,
            sma: &self.seasonal_ma,
        }
    }
}

impl Forecaster for SeasonalArima {
    fn fit(&mut self, series: &[f64]) -> Result<()> {
        if series.is_empty() {
            return Err(EngineError::EmptyData);
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::MissingValues);
        }
        let needed = self.order.min_observations();
        if series.len() < needed {
            return Err(EngineError::InsufficientData {
                needed,
                got: series.len(),
            });
        }

        let o = self.order;
        let w = seasonal_difference(&difference(series, o.d), o.cap_d, o.s);
        self.estimate(&w);

        let (ar, ma) = self.lags().expand(o.s);
        let residuals = one_step_residuals(&w, &ar, &ma, self.mean);
        let n = residuals.len() as f64;
        let css: f64 = residuals.iter().map(|e| e * e).sum();
        if !css.is_finite() {
            return Err(EngineError::ComputationError(format!(
                "{} produced non-finite residuals",
                o
            )));
        }

        // Floor keeps the likelihood finite for perfectly fitted series.
        let scale = w.iter().map(|x| x * x).sum::<f64>() / n;
        let sigma2 = (css / n).max(1e-12 * (1.0 + scale));
        let k = (o.num_coefficients() + usize::from(o.includes_mean()) + 1) as f64;
        let log_likelihood =
            -0.5 * n * (1.0 + (2.0 * std::f64::consts::PI).ln() + sigma2.ln());

        let offset = series.len() - w.len();
        let fitted = residuals
            .iter()
            .enumerate()
            .map(|(i, e)| series[offset + i] - e)
            .collect();

        self.sigma2 = Some(sigma2);
        self.aic = Some(-2.0 * log_likelihood + 2.0 * k);
        self.bic = Some(-2.0 * log_likelihood + k * n.ln());
        self.history = Some(series.to_vec());
        self.differenced = Some(w);
        self.residuals = Some(residuals);
        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let history = self.history.as_ref().ok_or(EngineError::FitRequired)?;
        let w = self.differenced.as_ref().ok_or(EngineError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(EngineError::FitRequired)?;

        if horizon == 0 {
            return Ok(vec![]);
        }

        let o = self.order;
        let (ar, ma) = self.lags().expand(o.s);

        let mut extended = w.clone();
        let mut errors = residuals.clone();
        extended.reserve(horizon);
        errors.reserve(horizon);
        for _ in 0..horizon {
            let t = extended.len();
            let pred = predict_at(&extended, &errors, t, &ar, &ma, self.mean);
            extended.push(pred);
            errors.push(0.0);
        }
        let future = &extended[w.len()..];

        let regular = difference(history, o.d);
        let seasonal_undone = seasonal_integrate(future, &regular, o.cap_d, o.s);
        let predictions = integrate(&seasonal_undone, history, o.d);

        if predictions.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::ComputationError(format!(
                "{} produced non-finite forecasts",
                o
            )));
        }
        Ok(predictions)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        if self.order.is_seasonal() {
            "SARIMA"
        } else {
            "ARIMA"
        }
    }
}

/// Borrowed coefficient blocks of a SARIMA model.
struct Lags<'a> {
    ar: &'a [f64],
    ma: &'a [f64],
    sar: &'a [f64],
    sma: &'a [f64],
}

impl Lags<'_> {
    /// Stationary AR parts and invertible MA parts.
    fn is_admissible(&self) -> bool {
        let negated = |c: &[f64]| c.iter().map(|x| -x).collect::<Vec<_>>();
        is_stationary(self.ar)
            && is_stationary(self.sar)
            && is_stationary(&negated(self.ma))
            && is_stationary(&negated(self.sma))
    }

    /// Multiply out the seasonal polynomials into sparse `(lag, coefficient)`
    /// lists for AR and MA.
    fn expand(&self, period: usize) -> (Vec<(usize, f64)>, Vec<(usize, f64)>) {
        (
            multiply_out(self.ar, self.sar, period, -1.0),
            multiply_out(self.ma, self.sma, period, 1.0),
        )
    }
}

/// Product of `(1 ± Σ a_i B^i)(1 ± Σ b_j B^(js))` as a lag list.
///
/// `cross_sign` is -1 for AR polynomials (written with minus signs) and +1 for
/// MA polynomials.
fn multiply_out(
    nonseasonal: &[f64],
    seasonal: &[f64],
    period: usize,
    cross_sign: f64,
) -> Vec<(usize, f64)> {
    let mut terms: Vec<(usize, f64)> = Vec::new();
    let mut add = |lag: usize, value: f64| match terms.iter_mut().find(|(l, _)| *l == lag) {
        Some(term) => term.1 += value,
        None => terms.push((lag, value)),
    };

    for (i, &a) in nonseasonal.iter().enumerate() {
        add(i + 1, a);
    }
    for (j, &b) in seasonal.iter().enumerate() {
        let seasonal_lag = (j + 1) * period;
        add(seasonal_lag, b);
        for (i, &a) in nonseasonal.iter().enumerate() {
            add(i + 1 + seasonal_lag, cross_sign * a * b);
        }
    }
    terms.sort_by_key(|&(lag, _)| lag);
    terms
}

/// Step-down (reverse Levinson) test: true when `1 - Σ c_i z^i` has all roots
/// outside the unit circle.
fn is_stationary(coefficients: &[f64]) -> bool {
    let mut current = coefficients.to_vec();
    while let Some(&last) = current.last() {
        if last.abs() >= 1.0 {
            return false;
        }
        let k = current.len() - 1;
        let denom = 1.0 - last * last;
        current = (0..k)
            .map(|j| (current[j] + last * current[k - 1 - j]) / denom)
            .collect();
    }
    true
}

fn predict_at(
    w: &[f64],
    errors: &[f64],
    t: usize,
    ar: &[(usize, f64)],
    ma: &[(usize, f64)],
    mean: f64,
) -> f64 {
    let mut pred = mean;
    for &(lag, c) in ar {
        if lag <= t {
            pred += c * (w[t - lag] - mean);
        }
    }
    for &(lag, c) in ma {
        if lag <= t {
            pred += c * errors[t - lag];
        }
    }
    pred
}

fn one_step_residuals(w: &[f64], ar: &[(usize, f64)], ma: &[(usize, f64)], mean: f64) -> Vec<f64> {
    let mut errors = Vec::with_capacity(w.len());
    for t in 0..w.len() {
        let pred = predict_at(w, &errors, t, ar, ma, mean);
        errors.push(w[t] - pred);
    }
    errors
}

fn css(w: &[f64], ar: &[(usize, f64)], ma: &[(usize, f64)], mean: f64) -> f64 {
    one_step_residuals(w, ar, ma, mean)
        .iter()
        .map(|e| e * e)
        .sum()
}
