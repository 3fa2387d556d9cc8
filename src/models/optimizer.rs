//! Derivative-free minimizer used by the SARIMA likelihood fit

use crate::error::{ForecastError, Result};

/// Nelder-Mead settings
#[derive(Debug, Clone, Copy)]
pub(crate) struct NelderMeadOptions {
    /// Hard iteration budget; exceeding it is a convergence failure
    pub max_iterations: usize,
    /// Relative spread of simplex values below which the fit is accepted
    pub tolerance: f64,
    /// Perturbation applied per coordinate when building the initial simplex
    pub initial_step: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            tolerance: 1e-10,
            initial_step: 0.1,
        }
    }
}

/// Outcome of a successful minimization
#[derive(Debug, Clone)]
pub(crate) struct NelderMeadResult {
    pub parameters: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
}

/// Minimize `objective` starting from `start` with the Nelder-Mead simplex.
///
/// # Errors
///
/// [`ForecastError::Convergence`] when the iteration budget runs out before
/// the simplex collapses to within tolerance.
pub(crate) fn nelder_mead<F>(
    objective: F,
    start: &[f64],
    options: &NelderMeadOptions,
) -> Result<NelderMeadResult>
where
    F: Fn(&[f64]) -> f64,
{
    const REFLECTION: f64 = 1.0;
    const EXPANSION: f64 = 2.0;
    const CONTRACTION: f64 = 0.5;
    const SHRINK: f64 = 0.5;

    let dim = start.len();
    if dim == 0 {
        return Ok(NelderMeadResult {
            parameters: Vec::new(),
            value: objective(&[]),
            iterations: 0,
        });
    }

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
    simplex.push((start.to_vec(), objective(start)));
    for i in 0..dim {
        let mut vertex = start.to_vec();
        vertex[i] += options.initial_step;
        let value = objective(&vertex);
        simplex.push((vertex, value));
    }

    for iteration in 0..options.max_iterations {
        simplex.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let best = simplex[0].1;
        let worst = simplex[dim].1;
        if (worst - best).abs() <= options.tolerance * (1.0 + best.abs()) {
            let (parameters, value) = simplex.swap_remove(0);
            return Ok(NelderMeadResult {
                parameters,
                value,
                iterations: iteration,
            });
        }

        // Centroid of every vertex except the worst.
        let mut centroid = vec![0.0; dim];
        for (vertex, _) in simplex.iter().take(dim) {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x / dim as f64;
            }
        }

        let combine = |coefficient: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(&simplex[dim].0)
                .map(|(c, w)| c + coefficient * (c - w))
                .collect()
        };

        let reflected = combine(REFLECTION);
        let reflected_value = objective(&reflected);

        if reflected_value < simplex[0].1 {
            let expanded = combine(EXPANSION);
            let expanded_value = objective(&expanded);
            simplex[dim] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
            continue;
        }

        if reflected_value < simplex[dim - 1].1 {
            simplex[dim] = (reflected, reflected_value);
            continue;
        }

        let contracted = if reflected_value < simplex[dim].1 {
            combine(CONTRACTION)
        } else {
            combine(-CONTRACTION)
        };
        let contracted_value = objective(&contracted);
        if contracted_value < simplex[dim].1.min(reflected_value) {
            simplex[dim] = (contracted, contracted_value);
            continue;
        }

        // Shrink every vertex toward the best one.
        let best_vertex = simplex[0].0.clone();
        for (vertex, value) in simplex.iter_mut().skip(1) {
            for (x, b) in vertex.iter_mut().zip(&best_vertex) {
                *x = b + SHRINK * (*x - b);
            }
            *value = objective(vertex);
        }
    }

    Err(ForecastError::Convergence(format!(
        "simplex did not collapse within {} iterations",
        options.max_iterations
    )))
}
