//! Defines the `Error` type for the augur library

use std::error::Error;
use std::fmt;
use std::result;

pub type Result<T> = result::Result<T, AugurError>;

/// Tolerance used whenever a distribution is required to sum to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub enum AugurError {

    /// A conditional probability table does not agree with the shape of its variable: a row has
    /// the wrong number of entries, keys have mixed arity, or the key arity does not match the
    /// number of parents.
    InconsistentTable(String),

    /// A probability outside of `[0, 1]`, or a distribution that does not sum to one
    InvalidProbability(String),

    /// An exact table lookup with a parent assignment that is not a key of the table
    MissingTableKey { variable: String, key: Vec<String> },

    /// A query was issued against a model that has not been compiled since its last mutation
    NotCompiled,

    /// The conditional query does not have a shape the exact inference here can answer
    UnsupportedInferenceShape(String),

    /// No variable with the given name exists in the network
    UnknownVariable(String),

    /// The value is not in the domain of the variable
    UnknownValue { variable: String, value: String },

    /// Represents a variable that was present multiple times in a situation where it should only
    /// have been present once
    DuplicateVariable(String),

    /// Represents an error where there was a parent variable expected, but not found
    MissingParent(String),

    /// The parent graph has a cycle through the named variables
    CyclicNetwork(Vec<String>),

    /// Represents an incomplete assignment where a complete assignment was required.
    /// The value is the names of the variables that were missing from the assignment.
    IncompleteAssignment(Vec<String>),

    /// Represents an attempt to initialize a variable with an incompatible Initialization
    InvalidInitialization,

    /// A sequence model whose matrices do not agree with its states
    InvalidShape(String),

    /// An empty observation sequence
    EmptyObservations,

    /// An observation symbol that has no emission column
    UnknownSymbol { position: usize, symbol: usize },

    /// Exactly what it sounds like
    DivideByZero,

}

impl AugurError {

    fn summary(&self) -> &'static str {
        match self {
            &AugurError::InconsistentTable(_) => "Inconsistent conditional probability table",
            &AugurError::InvalidProbability(_) => "Invalid probability",
            &AugurError::MissingTableKey { .. } => "Missing key in conditional probability table",
            &AugurError::NotCompiled => "The model has not been compiled",
            &AugurError::UnsupportedInferenceShape(_) => "Unsupported inference query",
            &AugurError::UnknownVariable(_) => "Unknown variable",
            &AugurError::UnknownValue { .. } => "Value is not in the domain of the variable",
            &AugurError::DuplicateVariable(_) => "A variable was encountered twice",
            &AugurError::MissingParent(_) => "Missing a parent from the model",
            &AugurError::CyclicNetwork(_) => "The network contains a cycle",
            &AugurError::IncompleteAssignment(_) => "Missing assignments to the required Variables",
            &AugurError::InvalidInitialization => "An invalid initialization was provided",
            &AugurError::InvalidShape(_) => "Model dimensions do not match",
            &AugurError::EmptyObservations => "The observation sequence is empty",
            &AugurError::UnknownSymbol { .. } => "Unknown observation symbol",
            &AugurError::DivideByZero => "Encountered division by zero",
        }
    }

}

impl Error for AugurError {

    fn description(&self) -> &str {
        self.summary()
    }

    fn cause(&self) -> Option<&Error> {
        None
    }

}

impl fmt::Display for AugurError {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &AugurError::InconsistentTable(ref msg)
            | &AugurError::InvalidProbability(ref msg)
            | &AugurError::UnsupportedInferenceShape(ref msg)
            | &AugurError::InvalidShape(ref msg) => write!(f, "{}: {}", self.summary(), msg),
            &AugurError::UnknownVariable(ref name)
            | &AugurError::DuplicateVariable(ref name)
            | &AugurError::MissingParent(ref name) => write!(f, "{}: {}", self.summary(), name),
            &AugurError::MissingTableKey { ref variable, ref key } => {
                write!(f, "{}: {} has no row for {:?}", self.summary(), variable, key)
            },
            &AugurError::UnknownValue { ref variable, ref value } => {
                write!(f, "{}: {} = {}", self.summary(), variable, value)
            },
            &AugurError::CyclicNetwork(ref names)
            | &AugurError::IncompleteAssignment(ref names) => {
                write!(f, "{}: {:?}", self.summary(), names)
            },
            &AugurError::UnknownSymbol { position, symbol } => {
                write!(f, "{}: {} at position {}", self.summary(), symbol, position)
            },
            _ => write!(f, "{}", self.summary())
        }
    }

}

/// Check that `row` is a distribution: every entry finite and in `[0, 1]`, summing to one.
pub fn check_distribution(row: &[f64], what: &str) -> Result<()> {
    if let Some(p) = row.iter().find(|&&p| !p.is_finite() || p < 0.0 || p > 1.0) {
        return Err(AugurError::InvalidProbability(format!("{} contains {}", what, p)));
    }

    let sum: f64 = row.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(AugurError::InvalidProbability(format!("{} sums to {}", what, sum)));
    }

    Ok(())
}
