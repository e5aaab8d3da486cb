//! Automatic ARIMA and SARIMA order selection.

use std::collections::BTreeSet;

use tracing::debug;

use crate::engine::arima::diff::{
    seasonal_difference, suggest_differencing, suggest_seasonal_differencing,
};
use crate::engine::arima::model::{ModelOrder, SeasonalArima};
use crate::engine::Forecaster;
use crate::error::{EngineError, Result};

/// Fewest observations AutoArima will look at.
const MIN_OBSERVATIONS: usize = 10;

/// Configuration for [`AutoArima`].
#[derive(Debug, Clone)]
pub struct AutoArimaConfig {
    /// Maximum non-seasonal AR order to consider.
    pub max_p: usize,
    /// Maximum non-seasonal MA order to consider.
    pub max_q: usize,
    /// Maximum non-seasonal differencing order.
    pub max_d: usize,
    /// Maximum seasonal AR order.
    pub max_cap_p: usize,
    /// Maximum seasonal MA order.
    pub max_cap_q: usize,
    /// Maximum seasonal differencing order.
    pub max_cap_d: usize,
    /// Cap on p + q + P + Q.
    pub max_order: usize,
    /// Seasonal period (0 for non-seasonal).
    pub seasonal_period: usize,
    /// Use stepwise search (faster) vs exhaustive.
    pub stepwise: bool,
    /// Upper bound on models fitted by the stepwise walk.
    pub max_fits: usize,
    /// Rank candidates by AIC (BIC otherwise).
    pub use_aic: bool,
}

impl Default for AutoArimaConfig {
    fn default() -> Self {
        Self {
            max_p: 3,
            max_q: 3,
            max_d: 2,
            max_cap_p: 2,
            max_cap_q: 2,
            max_cap_d: 1,
            max_order: 5,
            seasonal_period: 0,
            stepwise: true,
            max_fits: 60,
            use_aic: true,
        }
    }
}

impl AutoArimaConfig {
    /// Set maximum non-seasonal orders.
    pub fn with_max_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_d = max_d;
        self.max_q = max_q;
        self
    }

    /// Set maximum seasonal orders.
    pub fn with_seasonal_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_cap_p = max_p;
        self.max_cap_d = max_d;
        self.max_cap_q = max_q;
        self
    }

    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    /// Use exhaustive search instead of stepwise.
    pub fn exhaustive(mut self) -> Self {
        self.stepwise = false;
        self
    }
}

/// Automatic ARIMA/SARIMA model selection.
///
/// Differencing orders are chosen first (seasonal, then regular on the
/// seasonally differenced series). AR/MA orders are then searched either
/// stepwise, walking to the best ±1 neighbour until nothing improves, or
/// exhaustively up to the configured maxima. Seasonal AR/MA terms are only
/// considered when the series is long enough to estimate them.
#[derive(Debug, Clone)]
pub struct AutoArima {
    config: AutoArimaConfig,
    selected: Option<SeasonalArima>,
    model_scores: Vec<(ModelOrder, f64)>,
}

impl AutoArima {
    pub fn new() -> Self {
        Self::with_config(AutoArimaConfig::default())
    }

    pub fn with_config(config: AutoArimaConfig) -> Self {
        Self {
            config,
            selected: None,
            model_scores: Vec::new(),
        }
    }

    /// AutoArima searching seasonal orders with the given period.
    pub fn seasonal(period: usize) -> Self {
        Self::with_config(AutoArimaConfig::default().with_seasonal_period(period))
    }

    pub fn config(&self) -> &AutoArimaConfig {
        &self.config
    }

    /// Full order of the selected model.
    pub fn selected_order(&self) -> Option<ModelOrder> {
        self.selected.as_ref().map(SeasonalArima::order)
    }

    /// The selected, fitted model.
    pub fn selected_model(&self) -> Option<&SeasonalArima> {
        self.selected.as_ref()
    }

    /// Every successfully fitted candidate with its score, best first.
    pub fn model_scores(&self) -> &[(ModelOrder, f64)] {
        &self.model_scores
    }

    fn criterion(&self, model: &SeasonalArima) -> Option<f64> {
        if self.config.use_aic {
            model.aic()
        } else {
            model.bic()
        }
    }

    /// Fit one candidate; `None` if it cannot be estimated or scores badly.
    fn evaluate(&self, values: &[f64], order: ModelOrder) -> Option<(SeasonalArima, f64)> {
        if values.len() < order.min_observations() {
            return None;
        }
        let mut model = SeasonalArima::new(order);
        if let Err(err) = model.fit(values) {
            debug!(%order, error = %err, "candidate rejected");
            return None;
        }
        let score = self.criterion(&model)?;
        if !score.is_finite() {
            return None;
        }
        debug!(%order, score, "candidate fitted");
        Some((model, score))
    }

    /// Whether `order` lies within the configured search space.
    fn admissible(&self, order: &ModelOrder, seasonal_terms: bool) -> bool {
        let c = &self.config;
        order.p <= c.max_p
            && order.q <= c.max_q
            && (seasonal_terms || (order.cap_p == 0 && order.cap_q == 0))
            && order.cap_p <= c.max_cap_p
            && order.cap_q <= c.max_cap_q
            && order.num_coefficients() <= c.max_order
    }

    fn starting_orders(&self, base: ModelOrder, seasonal_terms: bool) -> Vec<ModelOrder> {
        let (sp, sq) = if seasonal_terms { (1, 1) } else { (0, 0) };
        let with = |p, q, cap_p, cap_q| ModelOrder {
            p,
            q,
            cap_p,
            cap_q,
            ..base
        };
        vec![
            with(2, 2, sp, sq),
            with(0, 0, 0, 0),
            with(1, 0, sp, 0),
            with(0, 1, 0, sq),
        ]
    }

    fn neighbours(order: ModelOrder) -> Vec<ModelOrder> {
        let step = |v: usize, delta: i32| -> Option<usize> {
            let next = v as i64 + i64::from(delta);
            usize::try_from(next).ok()
        };
        let mut out = Vec::new();
        for delta in [-1, 1] {
            let moves = [
                (step(order.p, delta), Some(order.q), Some(order.cap_p), Some(order.cap_q)),
                (Some(order.p), step(order.q, delta), Some(order.cap_p), Some(order.cap_q)),
                (step(order.p, delta), step(order.q, delta), Some(order.cap_p), Some(order.cap_q)),
                (Some(order.p), Some(order.q), step(order.cap_p, delta), Some(order.cap_q)),
                (Some(order.p), Some(order.q), Some(order.cap_p), step(order.cap_q, delta)),
                (Some(order.p), Some(order.q), step(order.cap_p, delta), step(order.cap_q, delta)),
            ];
            for m in moves {
                if let (Some(p), Some(q), Some(cap_p), Some(cap_q)) = m {
                    out.push(ModelOrder {
                        p,
                        q,
                        cap_p,
                        cap_q,
                        ..order
                    });
                }
            }
        }
        out
    }

    fn search_stepwise(
        &self,
        values: &[f64],
        base: ModelOrder,
        seasonal_terms: bool,
    ) -> (Option<(SeasonalArima, f64)>, Vec<(ModelOrder, f64)>) {
        let mut visited = BTreeSet::new();
        let mut scores = Vec::new();
        let mut best: Option<(SeasonalArima, f64)> = None;

        let consider = |order: ModelOrder,
                            visited: &mut BTreeSet<ModelOrder>,
                            scores: &mut Vec<(ModelOrder, f64)>|
         -> Option<(SeasonalArima, f64)> {
            if !visited.insert(order) || !self.admissible(&order, seasonal_terms) {
                return None;
            }
            let fitted = self.evaluate(values, order)?;
            scores.push((order, fitted.1));
            Some(fitted)
        };

        for order in self.starting_orders(base, seasonal_terms) {
            if let Some(candidate) = consider(order, &mut visited, &mut scores) {
                if best.as_ref().map_or(true, |(_, s)| candidate.1 < *s) {
                    best = Some(candidate);
                }
            }
        }

        loop {
            let Some(current) = best.as_ref().map(|(m, s)| (m.order(), *s)) else {
                break;
            };
            let mut improved: Option<(SeasonalArima, f64)> = None;
            for order in Self::neighbours(current.0) {
                if visited.len() >= self.config.max_fits {
                    break;
                }
                if let Some(candidate) = consider(order, &mut visited, &mut scores) {
                    let bar = improved.as_ref().map_or(current.1, |c| c.1);
                    if candidate.1 < bar {
                        improved = Some(candidate);
                    }
                }
            }
            match improved {
                Some(candidate) => best = Some(candidate),
                None => break,
            }
        }

        (best, scores)
    }

    fn search_exhaustive(
        &self,
        values: &[f64],
        base: ModelOrder,
        seasonal_terms: bool,
    ) -> (Option<(SeasonalArima, f64)>, Vec<(ModelOrder, f64)>) {
        let c = &self.config;
        let (max_cap_p, max_cap_q) = if seasonal_terms {
            (c.max_cap_p, c.max_cap_q)
        } else {
            (0, 0)
        };

        let mut best: Option<(SeasonalArima, f64)> = None;
        let mut scores = Vec::new();
        for p in 0..=c.max_p {
            for q in 0..=c.max_q {
                for cap_p in 0..=max_cap_p {
                    for cap_q in 0..=max_cap_q {
                        let order = ModelOrder {
                            p,
                            q,
                            cap_p,
                            cap_q,
                            ..base
                        };
                        if !self.admissible(&order, seasonal_terms) {
                            continue;
                        }
                        if let Some(candidate) = self.evaluate(values, order) {
                            scores.push((order, candidate.1));
                            if best.as_ref().map_or(true, |(_, s)| candidate.1 < *s) {
                                best = Some(candidate);
                            }
                        }
                    }
                }
            }
        }
        (best, scores)
    }
}

impl Default for AutoArima {
    fn default() -> Self {
        Self::new()
    }
}

impl Forecaster for AutoArima {
    fn fit(&mut self, series: &[f64]) -> Result<()> {
        if series.is_empty() {
            return Err(EngineError::EmptyData);
        }
        if series.len() < MIN_OBSERVATIONS {
            return Err(EngineError::InsufficientData {
                needed: MIN_OBSERVATIONS,
                got: series.len(),
            });
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::MissingValues);
        }

        let s = self.config.seasonal_period;
        let period = if s > 1 { s } else { 0 };
        let cap_d = if period > 0 {
            suggest_seasonal_differencing(series, period).min(self.config.max_cap_d)
        } else {
            0
        };
        let d = suggest_differencing(&seasonal_difference(series, cap_d, period), self.config.max_d);

        let base = ModelOrder::seasonal(0, d, 0, 0, cap_d, 0, period);
        // Seasonal AR/MA terms need two full cycles left after differencing.
        let seasonal_terms =
            period > 0 && series.len() >= base.lost_to_differencing() + 2 * period;
        debug!(d, cap_d, seasonal_terms, "differencing chosen");

        let (best, mut scores) = if self.config.stepwise {
            self.search_stepwise(series, base, seasonal_terms)
        } else {
            self.search_exhaustive(series, base, seasonal_terms)
        };

        scores.sort_by(|a, b| a.1.total_cmp(&b.1));
        self.model_scores = scores;

        let (model, _) = best.ok_or_else(|| {
            EngineError::ComputationError("no valid ARIMA model could be fitted".to_string())
        })?;
        self.selected = Some(model);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        self.selected
            .as_ref()
            .ok_or(EngineError::FitRequired)?
            .predict(horizon)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.selected.as_ref()?.fitted_values()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.selected.as_ref()?.residuals()
    }

    fn name(&self) -> &str {
        "AutoARIMA"
    }
}
