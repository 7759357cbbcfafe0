//! Jason Eisner's ice cream HMM: infer the weather from how many ice creams were eaten each day.
//!
//! Symbols are ice cream counts (1, 2 or 3); column 0 of the emission matrix is never used.

extern crate augur;
#[macro_use]
extern crate ndarray;
extern crate tracing;
extern crate tracing_subscriber;

use augur::{Result, SequenceModel};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let model = SequenceModel::new(
        &["start", "hot", "cold", "end"],
        array![[0.0, 0.8, 0.2, 0.0],
               [0.0, 0.6, 0.3, 0.1],
               [0.0, 0.4, 0.5, 0.1],
               [0.0, 0.0, 0.0, 0.0]],
        array![[0.0, 0.0, 0.0, 0.0],
               [0.0, 0.2, 0.4, 0.4],
               [0.0, 0.5, 0.4, 0.1],
               [0.0, 0.0, 0.0, 0.0]]
    )?;

    for observations in &[vec![3, 1, 3], vec![3, 3, 1, 1, 2, 2, 3, 1, 3], vec![3, 3, 1, 1, 2, 3, 3, 1, 2]] {
        println!("observations: {:?}", observations);
        println!("    forward probability: {:e}", model.forward(observations)?);
        println!("    log probability: {:.6}", model.log_forward(observations)?);

        let decoding = model.viterbi(observations)?;
        println!("    most likely weather: {}", decoding.labels.join(", "));
        println!("    path probability: {:e}", decoding.probability);
    }

    Ok(())
}
