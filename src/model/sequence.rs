//! Defines a `SequenceModel`, a discrete hidden Markov model.

use inference::{Decoding, ForwardEngine, LikelihoodEngine, MapInferenceEngine, ViterbiEngine};
use util::{check_distribution, AugurError, Result};

use ndarray::prelude as nd;

use std::collections::HashSet;


/// A hidden Markov model with a synthetic start and end state.
///
/// # Representation
/// The states are ```[start, s_1, ..., s_N, end]```: index `0` is the start state, indices
/// `1..=N` are the hidden states, and index `N + 1` is the end state. Observation symbols are the
/// columns of the emission matrix.
///
/// * ```transitions[[i, j]]``` is the probability of moving from state `i` to state `j`. The row
///   of the end state is unused.
/// * ```emissions[[i, k]]``` is the probability that state `i` emits symbol `k`. The rows of the
///   start and end states are unused.
#[derive(Clone, Debug)]
pub struct SequenceModel {

    /// Labels of all states, including start and end
    states: Vec<String>,

    transitions: nd::Array2<f64>,

    emissions: nd::Array2<f64>

}

impl SequenceModel {

    /// Construct a new `SequenceModel`
    ///
    /// # Args
    /// * `states`: the labels of all states, start first and end last
    /// * `transitions`: the state-to-state transition matrix
    /// * `emissions`: the state-to-symbol emission matrix
    ///
    /// # Errors
    /// * `AugurError::InvalidShape` if there are fewer than three states, duplicate labels, or
    ///   the matrices do not match the states
    /// * `AugurError::InvalidProbability` if the start row, a hidden state's transition row, or a
    ///   hidden state's emission row is not a distribution
    pub fn new(states: &[&str], transitions: nd::Array2<f64>, emissions: nd::Array2<f64>) -> Result<Self> {
        let n = states.len();
        if n < 3 {
            return Err(AugurError::InvalidShape(format!(
                "a start state, an end state and at least one hidden state are required, got {} states", n
            )));
        }

        let unique: HashSet<&str> = states.iter().cloned().collect();
        if unique.len() != n {
            return Err(AugurError::InvalidShape(String::from("state labels must be unique")));
        }

        if transitions.dim() != (n, n) {
            return Err(AugurError::InvalidShape(format!(
                "transitions are {:?}, expected ({}, {})", transitions.dim(), n, n
            )));
        }

        let (rows, symbols) = emissions.dim();
        if rows != n || symbols == 0 {
            return Err(AugurError::InvalidShape(format!(
                "emissions are {:?}, expected {} rows and at least one symbol", emissions.dim(), n
            )));
        }

        if let Some(p) = transitions.iter().chain(emissions.iter()).find(|&&p| !p.is_finite() || p < 0.0 || p > 1.0) {
            return Err(AugurError::InvalidProbability(format!("matrix entry {}", p)));
        }

        for i in 0..(n - 1) {
            check_distribution(&transitions.row(i).to_vec(), &format!("transitions from {}", states[i]))?;
        }

        for i in 1..(n - 1) {
            check_distribution(&emissions.row(i).to_vec(), &format!("emissions of {}", states[i]))?;
        }

        Ok(SequenceModel {
            states: states.iter().map(|s| s.to_string()).collect(),
            transitions,
            emissions
        })
    }

    /// All state labels, start and end included
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// The labels of the hidden states
    pub fn hidden_states(&self) -> &[String] {
        &self.states[1..self.states.len() - 1]
    }

    /// The number of hidden states, ```N```
    pub fn num_hidden_states(&self) -> usize {
        self.states.len() - 2
    }

    /// The number of observation symbols
    pub fn num_symbols(&self) -> usize {
        self.emissions.cols()
    }

    /// Index of the start state
    pub fn start(&self) -> usize {
        0
    }

    /// Index of the end state
    pub fn end(&self) -> usize {
        self.states.len() - 1
    }

    /// ```P(next = to | current = from)```
    pub fn transition(&self, from: usize, to: usize) -> f64 {
        self.transitions[[from, to]]
    }

    /// ```P(symbol | state)```
    pub fn emission(&self, state: usize, symbol: usize) -> f64 {
        self.emissions[[state, symbol]]
    }

    /// The total probability of the observations, summed over every hidden path
    pub fn forward(&self, observations: &[usize]) -> Result<f64> {
        ForwardEngine::new(self).probability(observations)
    }

    /// The natural log of `forward`, computed in log space
    pub fn log_forward(&self, observations: &[usize]) -> Result<f64> {
        ForwardEngine::new(self).log_probability(observations)
    }

    /// The most probable hidden path for the observations
    pub fn viterbi(&self, observations: &[usize]) -> Result<Decoding> {
        ViterbiEngine::new(self).decode(observations)
    }

    /// The joint probability of a hidden path and the observations, from the start state to the
    /// end state.
    ///
    /// # Args
    /// * `path`: hidden state indices (in ```1..=N```), one per observation
    /// * `observations`: the observed symbols
    pub fn path_probability(&self, path: &[usize], observations: &[usize]) -> Result<f64> {
        self.check_observations(observations)?;
        if path.len() != observations.len() {
            return Err(AugurError::InvalidShape(format!(
                "{} states for {} observations", path.len(), observations.len()
            )));
        }

        if let Some(&s) = path.iter().find(|&&s| s == self.start() || s >= self.end()) {
            return Err(AugurError::InvalidShape(format!("{} is not a hidden state", s)));
        }

        let mut p = 1.0;
        let mut previous = self.start();
        for (&s, &o) in path.iter().zip(observations.iter()) {
            p *= self.transition(previous, s) * self.emission(s, o);
            previous = s;
        }

        Ok(p * self.transition(previous, self.end()))
    }

    /// Reject empty sequences and symbols without an emission column
    pub(crate) fn check_observations(&self, observations: &[usize]) -> Result<()> {
        if observations.is_empty() {
            return Err(AugurError::EmptyObservations);
        }

        match observations.iter().position(|&o| o >= self.num_symbols()) {
            Some(position) => Err(AugurError::UnknownSymbol { position, symbol: observations[position] }),
            None => Ok(())
        }
    }

}
