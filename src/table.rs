//! Definition of the table module
//!
//! A `ProbabilityTable` is the conditional probability table (CPT) of a discrete random variable:
//! for every combination of parent values it holds a distribution over the variable's domain.

use util::{AugurError, Result};

use indexmap::IndexMap;

/// A conditional probability table keyed by tuples of parent value labels.
///
/// Keys are ordered like the parents of the owning variable; the table of a root variable has a
/// single row under the empty key. Rows keep their insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilityTable {
    rows: IndexMap<Vec<String>, Vec<f64>>
}

impl ProbabilityTable {

    /// Construct an empty table
    pub fn new() -> Self {
        ProbabilityTable { rows: IndexMap::new() }
    }

    /// Construct the table of a variable without parents
    pub fn unconditional(distribution: &[f64]) -> Self {
        ProbabilityTable::new().with_row(&[], distribution)
    }

    /// Add (or replace) the row for the given parent values.
    pub fn with_row(mut self, parent_values: &[&str], distribution: &[f64]) -> Self {
        self.insert(parent_values.iter().map(|s| s.to_string()).collect(), distribution.to_vec());
        self
    }

    /// Insert a row, returning the row it replaced, if any.
    pub fn insert(&mut self, key: Vec<String>, distribution: Vec<f64>) -> Option<Vec<f64>> {
        self.rows.insert(key, distribution)
    }

    /// Look up the distribution for a tuple of parent values
    pub fn row<S: AsRef<str>>(&self, key: &[S]) -> Option<&[f64]> {
        let key: Vec<String> = key.iter().map(|s| s.as_ref().to_string()).collect();
        self.rows.get(&key).map(|row| row.as_slice())
    }

    /// Iterate over `(parent values, distribution)` pairs in insertion order
    pub fn rows<'a>(&'a self) -> Box<Iterator<Item = (&'a [String], &'a [f64])> + 'a> {
        Box::new(self.rows.iter().map(|(k, v)| (k.as_slice(), v.as_slice())))
    }

    /// The number of rows in the table
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The number of parent values in each key.
    ///
    /// # Errors
    /// * `AugurError::InconsistentTable` if the table is empty or keys have different lengths
    pub fn arity(&self) -> Result<usize> {
        let mut lengths = self.rows.keys().map(|k| k.len());
        let first = match lengths.next() {
            Some(n) => n,
            None => return Err(AugurError::InconsistentTable(String::from("the table has no rows")))
        };

        if lengths.any(|n| n != first) {
            return Err(AugurError::InconsistentTable(String::from("keys have different lengths")));
        }

        Ok(first)
    }

}
