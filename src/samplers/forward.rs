//! Defines a simple forward sampler for `BayesianNetwork`s
//!
//! Implementation of Koller & Friedman Algorithm 12.1 (pp 489)

use model::directed::BayesianNetwork;
use util::{AugurError, Result};
use variable::Assignment;
use super::Sampler;

use rand::{self, Rng, ThreadRng};
use rand::distributions::{IndependentSample, Range};

/// A simple `Sampler` for Bayesian networks, driven by any random number generator
pub struct ForwardSampler<'a, R: Rng = ThreadRng> {

    /// The `BayesianNetwork` to sample
    network: &'a BayesianNetwork,

    rng: R,

    unit: Range<f64>
}


impl<'a> ForwardSampler<'a, ThreadRng> {

    /// Sample `network` using the thread local generator
    pub fn new(network: &'a BayesianNetwork) -> Self {
        ForwardSampler::with_rng(network, rand::thread_rng())
    }

}

impl<'a, R: Rng> ForwardSampler<'a, R> {

    pub fn with_rng(network: &'a BayesianNetwork, rng: R) -> Self {
        ForwardSampler { network, rng, unit: Range::new(0.0, 1.0) }
    }

    /// Draw an index from a distribution by inverting its cumulative sum
    fn draw(&mut self, distribution: &[f64]) -> usize {
        let u = self.unit.ind_sample(&mut self.rng);
        let mut cumulative = 0.0;

        for (i, &p) in distribution.iter().enumerate() {
            cumulative += p;
            if u < cumulative {
                return i;
            }
        }

        // rounding left the row just short of one, so take the last value that can occur
        distribution.iter()
                    .rposition(|&p| p > 0.0)
                    .unwrap_or(distribution.len() - 1)
    }

}

impl<'a, R: Rng> Sampler for ForwardSampler<'a, R> {

    /// # Errors
    /// * `AugurError::NotCompiled` if the network has not been compiled
    fn sample(&mut self) -> Result<Assignment> {
        let network = self.network;
        let mut a = Assignment::new();

        // every parent is assigned before its children
        for &id in network.topological_order()? {
            let var = &network.variables()[id.index()];
            let key = network.parent_values(var.name(), &a)?;

            let row = match var.table().row(&key[..]) {
                Some(row) => row,
                None => return Err(AugurError::MissingTableKey { variable: var.name().to_string(), key })
            };

            let i = self.draw(row);
            a.set(var.name(), var.domain()[i]);
        }

        Ok(a)
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use init::Initialization;
    use model::directed::BayesianNetworkBuilder;
    use table::ProbabilityTable;

    use rand::{SeedableRng, XorShiftRng};

    fn intelligence_sat() -> BayesianNetworkBuilder {
        let sat = ProbabilityTable::new()
            .with_row(&["low"], &[0.95, 0.05])
            .with_row(&["high"], &[0.2, 0.8]);

        BayesianNetworkBuilder::new()
            .with_variable("I", &["low", "high"], &[], Initialization::Multinomial(&[0.7, 0.3]))
            .with_variable("S", &["fail", "pass"], &["I"], Initialization::Table(sat))
    }

    #[test]
    fn sample() {
        let model = intelligence_sat().build_compiled().unwrap();
        let mut sampler = ForwardSampler::new(&model);

        for _ in 0..100 {
            let a = sampler.sample().unwrap();

            assert_eq!(2, a.len());
            assert!(["low", "high"].contains(&a.get("I").unwrap()));
            assert!(["fail", "pass"].contains(&a.get("S").unwrap()));
        }
    }

    /// Always yields the largest float below one
    struct Ceiling;

    impl Rng for Ceiling {
        fn next_u32(&mut self) -> u32 {
            ::std::u32::MAX
        }
    }

    #[test]
    fn short_row_skips_impossible_values() {
        let model = BayesianNetworkBuilder::new()
            .with_variable("A", &["x", "y", "z"], &[], Initialization::Multinomial(&[0.4, 0.5999995, 0.0]))
            .build_compiled()
            .unwrap();
        let mut sampler = ForwardSampler::with_rng(&model, Ceiling);

        for _ in 0..10 {
            assert_eq!(Some("y"), sampler.sample().unwrap().get("A"));
        }
        assert_eq!(1, sampler.draw(&[0.25, 0.7499995, 0.0, 0.0]));
    }

    #[test]
    fn root_frequency() {
        let model = intelligence_sat().build_compiled().unwrap();
        let mut sampler = ForwardSampler::with_rng(&model, XorShiftRng::from_seed([1, 2, 3, 4]));

        let n = 10000;
        let mut low = 0;
        for _ in 0..n {
            if sampler.sample().unwrap().get("I") == Some("low") {
                low += 1;
            }
        }

        let freq = low as f64 / n as f64;
        assert!((freq - 0.7).abs() < 0.03, "frequency {}", freq);
    }

    #[test]
    fn deterministic_rows() {
        let always = ProbabilityTable::new()
            .with_row(&["no"], &[0.0, 1.0])
            .with_row(&["yes"], &[1.0, 0.0]);

        let model = BayesianNetworkBuilder::new()
            .with_variable("Rain", &["no", "yes"], &[], Initialization::Multinomial(&[0.0, 1.0]))
            .with_variable("Dry", &["no", "yes"], &["Rain"], Initialization::Table(always))
            .build_compiled()
            .unwrap();

        let mut sampler = ForwardSampler::with_rng(&model, XorShiftRng::from_seed([5, 6, 7, 8]));
        for _ in 0..50 {
            let a = sampler.sample().unwrap();
            assert_eq!(Some("yes"), a.get("Rain"));
            assert_eq!(Some("no"), a.get("Dry"));
        }
    }

    #[test]
    fn requires_compile() {
        let model = intelligence_sat().build().unwrap();
        let mut sampler = ForwardSampler::new(&model);
        assert_eq!(Err(AugurError::NotCompiled), sampler.sample());
    }

}
