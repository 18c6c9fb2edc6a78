use crate::*;
use std::collections::VecDeque;

/// Limited-memory BFGS over a flat parameter vector.
///
/// Directions come from the two-loop recursion over the last `memory`
/// correction pairs; steps are accepted by backtracking until the Armijo
/// sufficient-decrease condition holds. Curvature pairs with `s·y <= 0`
/// are skipped so the implicit Hessian stays positive definite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lbfgs {
    iterations: usize,
    searches: usize,
    memory: usize,
    tolerance: f32,
}

/// Outcome of a minimisation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub position: Vec<f32>,
    pub objective: f32,
    pub iterations: usize,
    pub converged: bool,
}

struct Pair {
    s: Vec<f32>,
    y: Vec<f32>,
    rho: f32,
}

impl Lbfgs {
    pub fn new(iterations: usize, searches: usize) -> Self {
        Self {
            iterations,
            searches,
            memory: LBFGS_MEMORY,
            tolerance: LBFGS_TOLERANCE,
        }
    }
    pub fn memory(self, memory: usize) -> Self {
        Self {
            memory: memory.max(1),
            ..self
        }
    }
    pub fn tolerance(self, tolerance: f32) -> Self {
        Self { tolerance, ..self }
    }

    /// Minimise `f`, which returns the objective and its gradient at a point.
    pub fn minimize<F>(&self, mut f: F, start: Vec<f32>) -> Minimum
    where
        F: FnMut(&[f32]) -> (f32, Vec<f32>),
    {
        let mut x = start;
        let (mut fx, mut g) = f(&x);
        let mut history = VecDeque::<Pair>::with_capacity(self.memory);
        let mut minimum = Minimum {
            position: Vec::new(),
            objective: fx,
            iterations: 0,
            converged: false,
        };
        if !fx.is_finite() || g.len() != x.len() {
            minimum.position = x;
            return minimum;
        }
        for k in 0..self.iterations {
            if norm(&g) <= self.tolerance {
                minimum.converged = true;
                break;
            }
            let mut d = Self::direction(&g, &history);
            let mut slope = dot(&g, &d);
            if !(slope < 0.) {
                history.clear();
                d = g.iter().map(|x| -x).collect();
                slope = -dot(&g, &g);
            }
            let mut step = match history.is_empty() {
                true => (1. / norm(&d)).min(1.),
                false => 1.,
            };
            let mut accepted = None;
            for _ in 0..self.searches.max(1) {
                let trial = x.iter().zip(&d).map(|(x, d)| x + step * d).collect::<Vec<f32>>();
                let (ft, gt) = f(&trial);
                if ft.is_finite() && gt.len() == trial.len() && ft <= fx + LBFGS_ARMIJO * step * slope {
                    accepted = Some((trial, ft, gt));
                    break;
                }
                step *= LBFGS_BACKTRACK;
            }
            let Some((next, fnext, gnext)) = accepted else {
                log::trace!("line search failed after {} iterations", k);
                break;
            };
            let s = next.iter().zip(&x).map(|(a, b)| a - b).collect::<Vec<f32>>();
            let y = gnext.iter().zip(&g).map(|(a, b)| a - b).collect::<Vec<f32>>();
            let sy = dot(&s, &y);
            if sy > f32::EPSILON {
                if history.len() == self.memory {
                    history.pop_front();
                }
                history.push_back(Pair { s, y, rho: 1. / sy });
            }
            let delta = (fx - fnext).abs();
            x = next;
            fx = fnext;
            g = gnext;
            minimum.iterations = k + 1;
            if delta <= self.tolerance * fx.abs().max(1.) {
                minimum.converged = true;
                break;
            }
        }
        minimum.position = x;
        minimum.objective = fx;
        minimum
    }

    /// Two-loop recursion: approximate `-H⁻¹ g` from the stored pairs.
    fn direction(g: &[f32], history: &VecDeque<Pair>) -> Vec<f32> {
        let mut q = g.to_vec();
        let mut alphas = Vec::with_capacity(history.len());
        for pair in history.iter().rev() {
            let alpha = pair.rho * dot(&pair.s, &q);
            q.iter_mut().zip(&pair.y).for_each(|(q, y)| *q -= alpha * y);
            alphas.push(alpha);
        }
        let gamma = history
            .back()
            .map(|p| dot(&p.s, &p.y) / dot(&p.y, &p.y))
            .filter(|x| x.is_finite() && *x > 0.)
            .unwrap_or(1.);
        let mut r = q.into_iter().map(|q| gamma * q).collect::<Vec<f32>>();
        for (pair, alpha) in history.iter().zip(alphas.iter().rev()) {
            let beta = pair.rho * dot(&pair.y, &r);
            r.iter_mut().zip(&pair.s).for_each(|(r, s)| *r += (alpha - beta) * s);
        }
        r.into_iter().map(|r| -r).collect()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(a, b)| a * b).sum()
}
fn norm(a: &[f32]) -> f32 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bowl(x: &[f32]) -> (f32, Vec<f32>) {
        let f = x[0] * x[0] + 10. * x[1] * x[1];
        (f, vec![2. * x[0], 20. * x[1]])
    }

    #[test]
    fn minimizes_quadratic_bowl() {
        let minimum = Lbfgs::new(100, 20).minimize(bowl, vec![3., -2.]);
        assert!(minimum.iterations < 100);
        assert!(minimum.objective < 1e-4);
        assert!(minimum.position[0].abs() < 1e-2);
        assert!(minimum.position[1].abs() < 1e-2);
    }

    #[test]
    fn respects_iteration_budget() {
        let minimum = Lbfgs::new(1, 20).minimize(bowl, vec![3., -2.]);
        assert!(minimum.iterations <= 1);
        assert!(minimum.objective < bowl(&[3., -2.]).0);
    }

    #[test]
    fn stays_put_on_undefined_objective() {
        let minimum = Lbfgs::new(10, 10).minimize(|_| (f32::NAN, vec![0.]), vec![1.]);
        assert_eq!(minimum.position, vec![1.]);
        assert_eq!(minimum.iterations, 0);
        assert!(!minimum.converged);
    }

    #[test]
    fn zero_budget_returns_start() {
        let minimum = Lbfgs::new(0, 0).minimize(bowl, vec![1., 1.]);
        assert_eq!(minimum.position, vec![1., 1.]);
        assert_eq!(minimum.objective, 11.);
    }
}
