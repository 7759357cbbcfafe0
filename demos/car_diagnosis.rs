//! Car diagnosis: three independent faults and the symptoms they cause.
//!
//! Run with ```RUST_LOG=augur=trace cargo run --example car_diagnosis``` to see the compiled
//! marginals as they are computed.

extern crate augur;
extern crate tracing;
extern crate tracing_subscriber;

use augur::{Assignment, BayesianNetwork, BayesianNetworkBuilder, ForwardSampler, Initialization, Model,
            ProbabilityTable, Result, Sampler};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const BOOL: [&str; 2] = ["false", "true"];

fn build() -> Result<BayesianNetwork> {
    let vibration = ProbabilityTable::new()
        .with_row(&["false"], &[0.9, 0.1])
        .with_row(&["true"], &[0.3, 0.7]);

    let slow = ProbabilityTable::new()
        .with_row(&["false", "false"], &[0.3, 0.7])
        .with_row(&["false", "true"], &[0.7, 0.3])
        .with_row(&["true", "false"], &[0.4, 0.6])
        .with_row(&["true", "true"], &[0.95, 0.05]);

    let consumption = ProbabilityTable::new()
        .with_row(&["false", "false", "false"], &[0.99, 0.01])
        .with_row(&["false", "false", "true"], &[0.9, 0.1])
        .with_row(&["false", "true", "false"], &[0.5, 0.5])
        .with_row(&["false", "true", "true"], &[0.4, 0.6])
        .with_row(&["true", "false", "false"], &[0.8, 0.2])
        .with_row(&["true", "false", "true"], &[0.7, 0.3])
        .with_row(&["true", "true", "false"], &[0.2, 0.8])
        .with_row(&["true", "true", "true"], &[0.1, 0.9]);

    BayesianNetworkBuilder::new()
        .with_variable("Damaged Tire", &BOOL, &[], Initialization::Multinomial(&[0.7, 0.3]))
        .with_variable("Electronics Malfunctioning", &BOOL, &[], Initialization::Multinomial(&[0.8, 0.2]))
        .with_variable("Fuel Tank Leaking", &BOOL, &[], Initialization::Multinomial(&[0.7, 0.3]))
        .with_variable("Vibration", &BOOL, &["Damaged Tire"], Initialization::Table(vibration))
        .with_variable(
            "Slow Max Speed", &BOOL, &["Damaged Tire", "Electronics Malfunctioning"],
            Initialization::Table(slow)
        )
        .with_variable(
            "High Consumption", &BOOL, &["Damaged Tire", "Fuel Tank Leaking", "Electronics Malfunctioning"],
            Initialization::Table(consumption)
        )
        .build_compiled()
}

fn show(assignment: &Assignment) {
    for (name, value) in assignment.iter() {
        println!("    {}: {}", name, value);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let network = build()?;

    println!("Marginal probabilities:");
    for var in network.variables() {
        println!("    {}", var.name());
        for value in var.domain() {
            println!("        {}: {:.6}", value, var.marginal_probability(value)?);
        }
    }

    let values = Assignment::new()
        .with("Damaged Tire", "false")
        .with("Electronics Malfunctioning", "false")
        .with("Fuel Tank Leaking", "false")
        .with("Vibration", "true")
        .with("Slow Max Speed", "true")
        .with("High Consumption", "false");

    println!("\nJoint probability of");
    show(&values);
    println!("is {:.6}", network.joint_probability(&values)?);

    let targets = Assignment::new().with("Vibration", "true");
    let evidence = Assignment::new().with("Slow Max Speed", "true");

    println!("\nGiven");
    show(&evidence);
    println!("conditional probability of");
    show(&targets);
    println!("is {:.6}", network.conditional_probability(&targets, &evidence)?);

    let targets = Assignment::new().with("Damaged Tire", "true");
    let evidence = Assignment::new().with("Vibration", "true");

    println!("\nGiven");
    show(&evidence);
    println!("conditional probability of");
    show(&targets);
    println!("is {:.6}", network.conditional_probability(&targets, &evidence)?);

    let sample = ForwardSampler::new(&network).sample()?;
    println!("\nJoint probability of a random sample");
    show(&sample);
    println!("is {:.6}", network.joint_probability(&sample)?);

    Ok(())
}
