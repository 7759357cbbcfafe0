//! Defines the `Sampler` trait - an object that can randomly sample from a `Model`.

use util::Result;
use variable::Assignment;

pub mod forward;

pub use self::forward::ForwardSampler;

pub trait Sampler {

    /// Sample a full assignment from the associated `Model`.
    fn sample(&mut self) -> Result<Assignment>;

}
