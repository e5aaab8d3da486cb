//! Bounded Nelder-Mead minimisation for coefficient estimation.

use std::cmp::Ordering;

/// Tuning for [`nelder_mead`].
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Stop once the spread of objective values across the simplex drops below this.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Edge length of the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 500,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.1,
        }
    }
}

/// Outcome of a minimisation run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Minimise `objective` starting from `initial`.
///
/// Every trial point is clamped into `bounds` (one `(min, max)` pair per
/// coordinate) before evaluation. Non-finite objective values are treated as
/// `+inf` so the simplex moves away from them.
///
/// ```
/// use spend_forecast::engine::optimize::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] + 1.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     &NelderMeadConfig::default(),
/// );
/// assert!((result.point[0] - 2.0).abs() < 1e-3);
/// assert!((result.point[1] + 1.0).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: &NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    if n == 0 {
        return NelderMeadResult {
            point: vec![],
            value: eval(&[] as &[f64]),
            iterations: 0,
            converged: true,
        };
    }

    let mut vertices: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    let start = clamp(initial.to_vec(), bounds);
    let start_value = eval(&start);
    vertices.push((start.clone(), start_value));
    for i in 0..n {
        let mut v = start.clone();
        let step = if v[i].abs() > 1e-8 {
            config.initial_step * v[i].abs()
        } else {
            config.initial_step
        };
        v[i] += step;
        let v = clamp(v, bounds);
        let f = eval(&v);
        vertices.push((v, f));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        vertices.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        let best = vertices[0].1;
        let worst = vertices[n].1;
        if (worst - best).abs() <= config.tolerance * (1.0 + best.abs()) {
            converged = true;
            break;
        }

        let centroid = centroid_without_last(&vertices);
        let worst_point = vertices[n].0.clone();

        let reflected = clamp(blend(&centroid, &worst_point, -config.alpha), bounds);
        let reflected_value = eval(&reflected);

        if reflected_value < best {
            let expanded = clamp(blend(&centroid, &reflected, config.gamma), bounds);
            let expanded_value = eval(&expanded);
            vertices[n] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
            continue;
        }

        if reflected_value < vertices[n - 1].1 {
            vertices[n] = (reflected, reflected_value);
            continue;
        }

        // Contract towards whichever of reflected/worst is better.
        let (toward, toward_value) = if reflected_value < worst {
            (reflected, reflected_value)
        } else {
            (worst_point, worst)
        };
        let contracted = clamp(blend(&centroid, &toward, config.rho), bounds);
        let contracted_value = eval(&contracted);
        if contracted_value < toward_value {
            vertices[n] = (contracted, contracted_value);
            continue;
        }

        let anchor = vertices[0].0.clone();
        for vertex in vertices.iter_mut().skip(1) {
            let shrunk = clamp(blend(&anchor, &vertex.0, config.sigma), bounds);
            let value = eval(&shrunk);
            *vertex = (shrunk, value);
        }
    }

    vertices.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    let (point, value) = vertices.swap_remove(0);
    NelderMeadResult {
        point,
        value,
        iterations,
        converged,
    }
}

/// `origin + t * (target - origin)`.
fn blend(origin: &[f64], target: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, p)| o + t * (p - o))
        .collect()
}

fn centroid_without_last(vertices: &[(Vec<f64>, f64)]) -> Vec<f64> {
    let keep = &vertices[..vertices.len() - 1];
    let dims = keep[0].0.len();
    let mut centroid = vec![0.0; dims];
    for (point, _) in keep {
        for (c, x) in centroid.iter_mut().zip(point) {
            *c += x;
        }
    }
    let count = keep.len() as f64;
    centroid.iter_mut().for_each(|c| *c /= count);
    centroid
}

fn clamp(mut point: Vec<f64>, bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    if let Some(bounds) = bounds {
        for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
            *x = x.clamp(lo, hi);
        }
    }
    point
}
