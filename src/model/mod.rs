//! Defines the models: a `BayesianNetwork` over discrete random variables, and a
//! `SequenceModel`, a hidden Markov model with synthetic start and end states.

use util::Result;
use variable::{Assignment, RandomVariable, VarId};

/// The `Model` trait represents a Probabilistic Graphical Model over named variables.
pub trait Model {

    /// Lookup a `RandomVariable` in the `Model` based on the name
    fn lookup_variable(&self, name: &str) -> Option<&RandomVariable>;


    /// Lookup a `RandomVariable`'s name in the `Model`.
    fn lookup_name(&self, id: VarId) -> Option<&str>;


    /// Get the number of `RandomVariable`s in the `Model`
    fn num_variables(&self) -> usize;


    /// Determine the probability of a full `Assignment` to the variables in the `Model`.
    ///
    /// Specifically, this computes ```P(zeta)```, where ```zeta``` is a full assignment.
    ///
    /// # Args
    /// * `assignment`: a full `Assignment` to the `Model`
    ///
    /// # Returns
    /// the probability of the `Assignment` given the `Model`
    fn joint_probability(&self, assignment: &Assignment) -> Result<f64>;
}

pub mod directed;
pub mod sequence;
