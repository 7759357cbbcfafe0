//! Viterbi decoding for `SequenceModel`s

use model::sequence::SequenceModel;
use util::Result;
use super::{Decoding, MapInferenceEngine};

use ndarray::prelude as nd;


/// Finds the most probable hidden path through a borrowed `SequenceModel`.
///
/// Ties are broken in favour of the lowest state index: a candidate only replaces the current
/// best when it is strictly greater.
pub struct ViterbiEngine<'a> {

    model: &'a SequenceModel

}

impl<'a> ViterbiEngine<'a> {

    pub fn new(model: &'a SequenceModel) -> Self {
        ViterbiEngine { model }
    }

    /// The hidden state maximising `score`, and the maximum
    fn best_predecessor<F>(&self, score: F) -> (usize, f64)
        where F: Fn(usize) -> f64
    {
        let mut best = (1, score(1));
        for prev in 2..=self.model.num_hidden_states() {
            let p = score(prev);
            if p > best.1 {
                best = (prev, p);
            }
        }

        best
    }

}

impl<'a> MapInferenceEngine for ViterbiEngine<'a> {

    fn decode(&self, observations: &[usize]) -> Result<Decoding> {
        let model = self.model;
        model.check_observations(observations)?;

        let n = model.num_hidden_states();
        let steps = observations.len();

        // rows are hidden states 1..=N, shifted down by one
        let mut v = nd::Array2::<f64>::zeros((n, steps));
        let mut backpointer = nd::Array2::<usize>::zeros((n, steps));

        for s in 1..=n {
            v[[s - 1, 0]] = model.transition(model.start(), s) * model.emission(s, observations[0]);
            backpointer[[s - 1, 0]] = model.start();
        }

        for (t, &o) in observations.iter().enumerate().skip(1) {
            for s in 1..=n {
                let (prev, p) = self.best_predecessor(|prev| v[[prev - 1, t - 1]] * model.transition(prev, s));
                v[[s - 1, t]] = p * model.emission(s, o);
                backpointer[[s - 1, t]] = prev;
            }
        }

        let (last, probability) = self.best_predecessor(|s| v[[s - 1, steps - 1]] * model.transition(s, model.end()));
        trace!(probability = probability, last_state = %model.states()[last], "viterbi termination");

        let mut states = vec![last];
        for t in (1..steps).rev() {
            let current = states[states.len() - 1];
            states.push(backpointer[[current - 1, t]]);
        }
        states.reverse();

        let labels = states.iter().map(|&s| model.states()[s].clone()).collect();

        Ok(Decoding { states, labels, probability })
    }

}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_prefer_first_state() {
        // both hidden states are interchangeable
        let model = SequenceModel::new(
            &["start", "a", "b", "end"],
            array![[0.0, 0.5, 0.5, 0.0],
                   [0.0, 0.4, 0.4, 0.2],
                   [0.0, 0.4, 0.4, 0.2],
                   [0.0, 0.0, 0.0, 0.0]],
            array![[0.0, 0.0],
                   [0.5, 0.5],
                   [0.5, 0.5],
                   [0.0, 0.0]]
        ).unwrap();

        let decoding = ViterbiEngine::new(&model).decode(&[0, 1, 0]).unwrap();
        assert_eq!(vec![1, 1, 1], decoding.states);
        assert_eq!(vec!["a", "a", "a"], decoding.labels);
    }

    #[test]
    fn single_observation() {
        let model = SequenceModel::new(
            &["start", "a", "b", "end"],
            array![[0.0, 0.3, 0.7, 0.0],
                   [0.0, 0.5, 0.0, 0.5],
                   [0.0, 0.0, 0.5, 0.5],
                   [0.0, 0.0, 0.0, 0.0]],
            array![[0.0, 0.0],
                   [0.9, 0.1],
                   [0.2, 0.8],
                   [0.0, 0.0]]
        ).unwrap();

        let decoding = ViterbiEngine::new(&model).decode(&[0]).unwrap();
        assert_eq!(vec![1], decoding.states);
        assert!((decoding.probability - 0.3 * 0.9 * 0.5).abs() < 1e-15);

        let decoding = ViterbiEngine::new(&model).decode(&[1]).unwrap();
        assert_eq!(vec![2], decoding.states);
        assert!((decoding.probability - 0.7 * 0.8 * 0.5).abs() < 1e-15);
    }
}
