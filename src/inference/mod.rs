//! Defines the interface to inference engines over `SequenceModel`s

use super::Result;

mod forward;
mod viterbi;

pub use self::forward::ForwardEngine;
pub use self::viterbi::ViterbiEngine;


/// A `LikelihoodEngine` answers likelihood queries of the form:
///     ```P(O = o)```
/// for an observation sequence `o`, marginalising over every hidden path.
pub trait LikelihoodEngine {

    /// The total probability of `observations`
    fn probability(&self, observations: &[usize]) -> Result<f64>;

}


/// A `MapInferenceEngine` is capable of answering Maximum a posteriori queries:
///     ```MAP(S | O = o) = argmax_s P(S = s, O = o)```
pub trait MapInferenceEngine {

    /// Infer the most probable hidden path for `observations`
    fn decode(&self, observations: &[usize]) -> Result<Decoding>;

}


/// The result of a MAP query over a `SequenceModel`
#[derive(Clone, Debug, PartialEq)]
pub struct Decoding {

    /// Hidden state indices in chronological order, one per observation
    pub states: Vec<usize>,

    /// The labels of `states`
    pub labels: Vec<String>,

    /// The joint probability of the path and the observations
    pub probability: f64

}


#[cfg(test)]
/// Tests for the inference engines in this module. Tests are hoisted here to avoid duplication.
/// Any tests specific to an engine are held within that submodule's tests module.
///
/// The hot/cold example is Jason Eisner's ice cream HMM: the hidden weather emits the number of
/// ice creams eaten on a day (1, 2 or 3; symbol 0 is never emitted).
mod tests {
    use super::*;
    use model::sequence::SequenceModel;
    use util::AugurError;

    use itertools::Itertools;
    use ndarray::prelude as nd;
    use proptest::prelude::*;

    fn ice_cream() -> SequenceModel {
        SequenceModel::new(
            &["start", "hot", "cold", "end"],
            array![[0.0, 0.8, 0.2, 0.0],
                   [0.0, 0.6, 0.3, 0.1],
                   [0.0, 0.4, 0.5, 0.1],
                   [0.0, 0.0, 0.0, 0.0]],
            array![[0.0, 0.0, 0.0, 0.0],
                   [0.0, 0.2, 0.4, 0.4],
                   [0.0, 0.5, 0.4, 0.1],
                   [0.0, 0.0, 0.0, 0.0]]
        ).unwrap()
    }

    /// Every hidden path for `observations`, with its joint probability
    fn enumerate_paths(model: &SequenceModel, observations: &[usize]) -> Vec<(Vec<usize>, f64)> {
        (0..observations.len())
            .map(|_| 1..(model.num_hidden_states() + 1))
            .multi_cartesian_product()
            .map(|path| {
                let p = model.path_probability(&path, observations).unwrap();
                (path, p)
            })
            .collect()
    }

    /// A model with `n` hidden states and `m` symbols, every row normalised from `weights`
    fn random_model(n: usize, m: usize, weights: &[f64]) -> SequenceModel {
        let mut w = weights.iter().cloned();
        let mut transitions = nd::Array2::<f64>::zeros((n + 2, n + 2));
        let mut emissions = nd::Array2::<f64>::zeros((n + 2, m));

        let mut fill = |row: &mut [f64]| {
            for p in row.iter_mut() {
                *p = w.next().unwrap();
            }
            let z: f64 = row.iter().sum();
            for p in row.iter_mut() {
                *p /= z;
            }
        };

        let mut start = vec![0.0; n];
        fill(&mut start[..]);
        for s in 1..=n {
            transitions[[0, s]] = start[s - 1];
        }

        for from in 1..=n {
            let mut row = vec![0.0; n + 1];
            fill(&mut row[..]);
            for to in 1..=(n + 1) {
                transitions[[from, to]] = row[to - 1];
            }

            let mut row = vec![0.0; m];
            fill(&mut row[..]);
            for k in 0..m {
                emissions[[from, k]] = row[k];
            }
        }

        let labels: Vec<String> = (0..(n + 2)).map(|i| format!("s{}", i)).collect();
        let labels: Vec<&str> = labels.iter().map(|s| s.as_str()).collect();
        SequenceModel::new(&labels, transitions, emissions).unwrap()
    }

    #[test]
    fn ice_cream_forward() {
        let model = ice_cream();
        let observations = [3, 1, 3];

        let p = ForwardEngine::new(&model).probability(&observations).unwrap();
        let expected: f64 = enumerate_paths(&model, &observations).iter().map(|&(_, p)| p).sum();

        assert_eq!(8, enumerate_paths(&model, &observations).len());
        assert!((p - expected).abs() < 1e-15);
        assert!((p - 0.002193).abs() < 1e-12);
        assert!((model.forward(&observations).unwrap() - p).abs() < 1e-18);
    }

    #[test]
    fn ice_cream_trellis() {
        let model = ice_cream();
        let alpha = ForwardEngine::new(&model).trellis(&[3, 1, 3]).unwrap();

        assert_eq!((2, 3), alpha.dim());
        assert!((alpha[[0, 0]] - 0.32).abs() < 1e-15);
        assert!((alpha[[1, 0]] - 0.02).abs() < 1e-15);
        // (0.32 * 0.6 + 0.02 * 0.4) * 0.2
        assert!((alpha[[0, 1]] - 0.04).abs() < 1e-15);
    }

    #[test]
    fn ice_cream_log_forward() {
        let model = ice_cream();
        let lp = model.log_forward(&[3, 1, 3]).unwrap();
        assert!((lp - 0.002193f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn ice_cream_viterbi() {
        let model = ice_cream();
        let observations = [3, 1, 3];

        let decoding = ViterbiEngine::new(&model).decode(&observations).unwrap();
        assert_eq!(vec![1, 1, 1], decoding.states);
        assert_eq!(vec!["hot", "hot", "hot"], decoding.labels);
        assert!((decoding.probability - 0.0009216).abs() < 1e-12);

        let best = enumerate_paths(&model, &observations)
            .into_iter()
            .fold((vec![], 0.0), |best, candidate| if candidate.1 > best.1 { candidate } else { best });
        assert_eq!(best.0, decoding.states);
        assert_eq!(model.viterbi(&observations).unwrap(), decoding);
    }

    #[test]
    fn ice_cream_viterbi_cold() {
        // a run of single ice creams is best explained by cold weather
        let decoding = ice_cream().viterbi(&[1, 1, 1]).unwrap();
        assert_eq!(vec!["cold", "cold", "cold"], decoding.labels);
    }

    #[test]
    fn long_sequence_underflows_only_in_linear_space() {
        let model = ice_cream();
        let observations: Vec<usize> = (0..2000).map(|t| if t % 3 == 1 { 1 } else { 3 }).collect();

        assert_eq!(0.0, model.forward(&observations).unwrap());

        let lp = model.log_forward(&observations).unwrap();
        assert!(lp.is_finite());
        assert!(lp < -1000.0);
    }

    #[test]
    fn observation_errors() {
        let model = ice_cream();
        let forward = ForwardEngine::new(&model);
        let viterbi = ViterbiEngine::new(&model);

        assert_eq!(forward.probability(&[]), Err(AugurError::EmptyObservations));
        assert_eq!(forward.log_probability(&[]), Err(AugurError::EmptyObservations));
        assert_eq!(viterbi.decode(&[]), Err(AugurError::EmptyObservations));

        let unknown = AugurError::UnknownSymbol { position: 1, symbol: 7 };
        assert_eq!(forward.probability(&[1, 7]), Err(unknown.clone()));
        assert_eq!(forward.trellis(&[1, 7]), Err(unknown.clone()));
        assert_eq!(viterbi.decode(&[1, 7]), Err(unknown));
    }

    proptest! {
        #[test]
        fn forward_matches_enumeration(
            n in 1usize..4,
            m in 1usize..4,
            weights in prop::collection::vec(0.01f64..1.0, 32),
            raw in prop::collection::vec(0usize..8, 1..5)
        ) {
            let model = random_model(n, m, &weights);
            let observations: Vec<usize> = raw.iter().map(|o| o % m).collect();

            let expected: f64 = enumerate_paths(&model, &observations).iter().map(|&(_, p)| p).sum();
            let p = model.forward(&observations).unwrap();
            prop_assert!(expected > 0.0);
            prop_assert!(((p - expected) / expected).abs() < 1e-9);

            let lp = model.log_forward(&observations).unwrap();
            prop_assert!((lp - expected.ln()).abs() < 1e-9);
        }

        #[test]
        fn viterbi_dominates_every_path(
            n in 1usize..4,
            m in 1usize..4,
            weights in prop::collection::vec(0.01f64..1.0, 32),
            raw in prop::collection::vec(0usize..8, 1..5)
        ) {
            let model = random_model(n, m, &weights);
            let observations: Vec<usize> = raw.iter().map(|o| o % m).collect();

            let decoding = model.viterbi(&observations).unwrap();
            prop_assert_eq!(observations.len(), decoding.states.len());

            let own = model.path_probability(&decoding.states, &observations).unwrap();
            prop_assert!(((own - decoding.probability) / own).abs() < 1e-9);

            for (_, p) in enumerate_paths(&model, &observations) {
                prop_assert!(p <= decoding.probability * (1.0 + 1e-9));
            }
        }
    }
}
