//! The forward algorithm for `SequenceModel`s
//!
//! Computes the total probability of an observation sequence by summing over every hidden path,
//! one time step (trellis column) at a time.

use model::sequence::SequenceModel;
use util::Result;
use super::LikelihoodEngine;

use ndarray::prelude as nd;


/// Forward inference over a borrowed `SequenceModel`
pub struct ForwardEngine<'a> {

    model: &'a SequenceModel

}

impl<'a> ForwardEngine<'a> {

    pub fn new(model: &'a SequenceModel) -> Self {
        ForwardEngine { model }
    }

    /// The forward trellis: ```trellis[[s - 1, t]]``` is the probability of the first `t + 1`
    /// observations with hidden state `s` at time `t`. Only the hidden states have rows.
    pub fn trellis(&self, observations: &[usize]) -> Result<nd::Array2<f64>> {
        self.model.check_observations(observations)?;

        let model = self.model;
        let n = model.num_hidden_states();
        let mut alpha = nd::Array2::<f64>::zeros((n, observations.len()));

        for s in 1..=n {
            alpha[[s - 1, 0]] = model.transition(model.start(), s) * model.emission(s, observations[0]);
        }

        for (t, &o) in observations.iter().enumerate().skip(1) {
            for s in 1..=n {
                let incoming: f64 = (1..=n)
                    .map(|prev| alpha[[prev - 1, t - 1]] * model.transition(prev, s))
                    .sum();
                alpha[[s - 1, t]] = incoming * model.emission(s, o);
            }
        }

        Ok(alpha)
    }

    /// ```ln P(observations)```, evaluated entirely in log space.
    ///
    /// Returns negative infinity when the sequence is impossible.
    pub fn log_probability(&self, observations: &[usize]) -> Result<f64> {
        self.model.check_observations(observations)?;

        let model = self.model;
        let n = model.num_hidden_states();

        let mut alpha: Vec<f64> = (1..=n)
            .map(|s| ln(model.transition(model.start(), s)) + ln(model.emission(s, observations[0])))
            .collect();

        for &o in &observations[1..] {
            alpha = (1..=n)
                .map(|s| {
                    let terms: Vec<f64> = (1..=n)
                        .map(|prev| alpha[prev - 1] + ln(model.transition(prev, s)))
                        .collect();
                    log_sum_exp(&terms) + ln(model.emission(s, o))
                })
                .collect();
        }

        let terms: Vec<f64> = (1..=n)
            .map(|s| alpha[s - 1] + ln(model.transition(s, model.end())))
            .collect();

        Ok(log_sum_exp(&terms))
    }

}

impl<'a> LikelihoodEngine for ForwardEngine<'a> {

    fn probability(&self, observations: &[usize]) -> Result<f64> {
        let alpha = self.trellis(observations)?;
        let last = observations.len() - 1;
        let model = self.model;

        Ok((1..=model.num_hidden_states())
            .map(|s| alpha[[s - 1, last]] * model.transition(s, model.end()))
            .sum())
    }

}


/// Natural log, mapping zero to negative infinity
fn ln(p: f64) -> f64 {
    if p == 0.0 { f64::NEG_INFINITY } else { p.ln() }
}

/// ```ln(sum(exp(x)))``` without leaving log space
fn log_sum_exp(xs: &[f64]) -> f64 {
    let max = xs.iter().cloned().fold(f64::NEG_INFINITY, |a, b| a.max(b));
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }

    max + xs.iter().map(|&x| (x - max).exp()).sum::<f64>().ln()
}


#[cfg(test)]
mod tests {
    use super::*;

    /// A model that can never reach its end state
    fn absorbing() -> SequenceModel {
        SequenceModel::new(
            &["start", "stuck", "end"],
            array![[0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]],
            array![[0.0, 0.0], [0.5, 0.5], [0.0, 0.0]]
        ).unwrap()
    }

    #[test]
    fn lse() {
        assert_eq!(f64::NEG_INFINITY, log_sum_exp(&[]));
        assert_eq!(f64::NEG_INFINITY, log_sum_exp(&[f64::NEG_INFINITY, f64::NEG_INFINITY]));
        assert!((log_sum_exp(&[0.5f64.ln(), 0.25f64.ln()]) - 0.75f64.ln()).abs() < 1e-12);
        assert!((log_sum_exp(&[-1000.0, -1000.0]) - (-1000.0 + 2f64.ln())).abs() < 1e-9);
    }

    #[test]
    fn impossible_sequence() {
        let model = absorbing();
        let engine = ForwardEngine::new(&model);
        assert_eq!(0.0, engine.probability(&[0, 1]).unwrap());
        assert_eq!(f64::NEG_INFINITY, engine.log_probability(&[0, 1]).unwrap());
    }

    #[test]
    fn trellis_shape() {
        let model = absorbing();
        let alpha = ForwardEngine::new(&model).trellis(&[0, 1, 1]).unwrap();
        assert_eq!((1, 3), alpha.dim());
        assert!((alpha[[0, 2]] - 0.125).abs() < 1e-15);
    }
}
