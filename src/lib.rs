extern crate bidir_map;
extern crate indexmap;
#[cfg_attr(test, macro_use)]
extern crate itertools;
#[cfg_attr(test, macro_use)]
extern crate ndarray;
extern crate ndarray_rand;
extern crate rand;
#[macro_use]
extern crate tracing;

#[cfg(test)]
#[macro_use]
extern crate proptest;

pub mod util;
pub mod table;
pub mod variable;
pub mod init;
pub mod model;
pub mod inference;
pub mod samplers;

pub use util::{Result, AugurError, PROBABILITY_TOLERANCE};
pub use table::ProbabilityTable;
pub use variable::{Assignment, RandomVariable, VarId};
pub use init::Initialization;
pub use model::Model;
pub use model::directed::{BayesianNetwork, BayesianNetworkBuilder, CompileState};
pub use model::sequence::SequenceModel;
pub use inference::{Decoding, ForwardEngine, LikelihoodEngine, MapInferenceEngine, ViterbiEngine};
pub use samplers::{ForwardSampler, Sampler};
