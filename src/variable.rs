//! Definition of the variable module
//!
//! A `RandomVariable` is a named discrete random variable in a Bayesian network, holding its
//! conditional probability table and, once compiled, its marginal distribution.

use table::ProbabilityTable;
use util::{check_distribution, AugurError, Result};

use indexmap::IndexMap;

use std::collections::HashSet;
use std::fmt;


/// A handle to a `RandomVariable` inside the network that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {

    /// The position of the variable in its network's declaration order
    pub fn index(&self) -> usize {
        self.0
    }

}

impl fmt::Display for VarId {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }

}


/// An assignment of value labels to variables, by name.
///
/// The same type is used for full assignments, evidence and query targets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    values: IndexMap<String, String>
}

impl Assignment {

    pub fn new() -> Self {
        Assignment { values: IndexMap::new() }
    }

    /// Assign `value` to the variable `name`, replacing any earlier value
    pub fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    /// Builder-style `set`
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|v| v.as_str())
    }

    pub fn unset(&mut self, name: &str) -> Option<String> {
        self.values.swap_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in the order they were first set
    pub fn iter<'a>(&'a self) -> Box<Iterator<Item = (&'a str, &'a str)> + 'a> {
        Box::new(self.values.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

}

impl<'a> ::std::iter::FromIterator<(&'a str, &'a str)> for Assignment {

    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut a = Assignment::new();
        for (name, value) in iter {
            a.set(name, value);
        }
        a
    }

}


/// A discrete random variable.
///
/// # Representation
/// The domain is an ordered set of value labels; a label's position is the index used for every
/// table and marginal lookup. Parent and child links are `VarId` handles into the network that
/// owns the variable, so a variable on its own has no parents. The marginal distribution is
/// absent until the owning network compiles the variable.
#[derive(Clone, Debug)]
pub struct RandomVariable {

    /// The name of the `RandomVariable`, unique within a network
    name: String,

    /// The domain, mapping each value label to its index
    domain: IndexMap<String, usize>,

    /// The conditional probability table
    table: ProbabilityTable,

    /// Parents in declaration order. Table keys follow this order.
    parents: Vec<VarId>,

    children: Vec<VarId>,

    /// `Some` once compiled
    marginal: Option<Vec<f64>>

}

impl RandomVariable {

    /// Construct a new `RandomVariable`
    ///
    /// # Args
    /// * `name`: the name of the variable
    /// * `domain`: the ordered value labels the variable may take
    /// * `table`: the conditional probability table
    ///
    /// # Errors
    /// * `AugurError::InconsistentTable` if the domain is empty or has duplicate labels, a row's
    ///   length differs from the domain size, or the keys have mixed arity
    /// * `AugurError::InvalidProbability` if a row is not a distribution
    pub fn new(name: &str, domain: &[&str], table: ProbabilityTable) -> Result<Self> {
        if domain.is_empty() {
            return Err(AugurError::InconsistentTable(format!("{} has an empty domain", name)));
        }

        let mut values = IndexMap::new();
        for (i, &v) in domain.iter().enumerate() {
            if values.insert(v.to_string(), i).is_some() {
                return Err(AugurError::InconsistentTable(
                    format!("{} lists the value {} twice", name, v)
                ));
            }
        }

        table.arity()?;

        for (key, row) in table.rows() {
            if row.len() != domain.len() {
                return Err(AugurError::InconsistentTable(format!(
                    "row {:?} of {} has {} entries for a domain of {}",
                    key, name, row.len(), domain.len()
                )));
            }

            check_distribution(row, &format!("row {:?} of {}", key, name))?;
        }

        Ok(RandomVariable {
            name: name.to_string(),
            domain: values,
            table,
            parents: Vec::new(),
            children: Vec::new(),
            marginal: None
        })
    }

    /// Get the name of the `RandomVariable`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value labels, in domain order
    pub fn domain(&self) -> Vec<&str> {
        self.domain.keys().map(|k| k.as_str()).collect()
    }

    /// The number of values in the domain
    pub fn cardinality(&self) -> usize {
        self.domain.len()
    }

    /// The label of the value with the given index
    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.domain.get_index(index).map(|(k, _)| k.as_str())
    }

    /// The index of a value label
    ///
    /// # Errors
    /// * `AugurError::UnknownValue` if the label is not in the domain
    pub fn value_index(&self, value: &str) -> Result<usize> {
        self.domain.get(value).cloned().ok_or_else(|| AugurError::UnknownValue {
            variable: self.name.clone(),
            value: value.to_string()
        })
    }

    pub fn table(&self) -> &ProbabilityTable {
        &self.table
    }

    pub fn parents(&self) -> &[VarId] {
        &self.parents
    }

    pub fn children(&self) -> &[VarId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_compiled(&self) -> bool {
        self.marginal.is_some()
    }

    /// The compiled marginal distribution, in domain order
    pub fn marginal(&self) -> Result<&[f64]> {
        self.marginal.as_ref().map(|m| m.as_slice()).ok_or(AugurError::NotCompiled)
    }

    /// `true` iff `other` is one of this variable's parents. Only direct parents count.
    pub fn is_direct_child_of(&self, other: VarId) -> bool {
        self.parents.contains(&other)
    }

    /// Exact table lookup of ```P(self = value | parents = parent_values)```.
    ///
    /// # Errors
    /// * `AugurError::UnknownValue` if `value` is not in the domain
    /// * `AugurError::MissingTableKey` if the table has no row for `parent_values`
    pub fn probability<S: AsRef<str>>(&self, value: &str, parent_values: &[S]) -> Result<f64> {
        let idx = self.value_index(value)?;

        match self.table.row(parent_values) {
            Some(row) => Ok(row[idx]),
            None => Err(AugurError::MissingTableKey {
                variable: self.name.clone(),
                key: parent_values.iter().map(|s| s.as_ref().to_string()).collect()
            })
        }
    }

    /// Compute ```P(self = value | evidence)``` where the evidence constrains some of the parents.
    ///
    /// Parents named in `evidence` are fixed to the given value; every other parent is summed
    /// out using its marginal. Evidence on variables that are not parents is ignored. The
    /// result is exact when the parents are independent of one another a priori (for example
    /// when they are all roots) and an approximation otherwise.
    ///
    /// # Args
    /// * `value`: the value of this variable
    /// * `evidence`: a partial assignment
    /// * `parents`: the parent variables, in the same order as `self.parents()`
    ///
    /// # Errors
    /// * `AugurError::NotCompiled` if an unconstrained parent has no marginal
    /// * `AugurError::UnknownValue` if `value` or an evidence value is not in its domain
    pub fn conditional_probability(
        &self,
        value: &str,
        evidence: &Assignment,
        parents: &[&RandomVariable],
    ) -> Result<f64> {
        if parents.len() != self.parents.len() {
            return Err(AugurError::InconsistentTable(format!(
                "{} has {} parents but {} were supplied",
                self.name, self.parents.len(), parents.len()
            )));
        }

        self.check_arity()?;
        let idx = self.value_index(value)?;

        // split parents into those fixed by the evidence and those to marginalize out
        let mut given: Vec<(usize, &str)> = Vec::new();
        let mut free: Vec<(usize, &[f64], &RandomVariable)> = Vec::new();
        for (i, &parent) in parents.iter().enumerate() {
            if let Some(v) = evidence.get(parent.name()) {
                parent.value_index(v)?;
                given.push((i, v));
            } else {
                free.push((i, parent.marginal()?, parent));
            }
        }

        let mut total = 0.0;
        for (key, row) in self.table.rows() {
            if given.iter().any(|&(i, v)| key[i] != v) {
                continue;
            }

            let mut weight = 1.0;
            for &(i, marginal, parent) in free.iter() {
                weight *= marginal[parent.value_index(&key[i])?];
            }

            total += row[idx] * weight;
        }

        Ok(total)
    }

    /// The marginal probability ```P(self = value)```
    ///
    /// # Errors
    /// * `AugurError::NotCompiled` if the variable has not been compiled
    /// * `AugurError::UnknownValue` if `value` is not in the domain
    pub fn marginal_probability(&self, value: &str) -> Result<f64> {
        let marginal = self.marginal()?;
        Ok(marginal[self.value_index(value)?])
    }

    /// Compute and store the marginal distribution. Does nothing if already compiled.
    ///
    /// # Args
    /// * `parents`: the compiled parent variables, in the same order as `self.parents()`
    ///
    /// # Errors
    /// * `AugurError::NotCompiled` if a parent has not been compiled
    /// * `AugurError::UnknownValue` if a table key holds a label outside its parent's domain
    pub fn compile(&mut self, parents: &[&RandomVariable]) -> Result<()> {
        if self.marginal.is_some() {
            return Ok(());
        }

        let marginal = self.compute_marginal(parents)?;
        self.set_marginal(marginal);
        Ok(())
    }

    pub(crate) fn set_marginal(&mut self, marginal: Vec<f64>) {
        trace!(variable = %self.name, marginal = ?marginal, "compiled marginal");
        self.marginal = Some(marginal);
    }

    /// The marginal implied by the table and the parents' marginals, without storing it
    pub(crate) fn compute_marginal(&self, parents: &[&RandomVariable]) -> Result<Vec<f64>> {
        if parents.len() != self.parents.len() {
            return Err(AugurError::InconsistentTable(format!(
                "{} has {} parents but {} were supplied",
                self.name, self.parents.len(), parents.len()
            )));
        }

        self.check_arity()?;

        if parents.is_empty() {
            let empty: [&str; 0] = [];
            return self.table.row(&empty).map(|row| row.to_vec()).ok_or_else(|| {
                AugurError::MissingTableKey { variable: self.name.clone(), key: vec![] }
            });
        }

        let mut marginal = vec![0.0; self.cardinality()];
        for (key, row) in self.table.rows() {
            let mut weight = 1.0;
            for (parent, label) in parents.iter().zip(key.iter()) {
                weight *= parent.marginal_probability(label)?;
            }

            for (m, p) in marginal.iter_mut().zip(row.iter()) {
                *m += p * weight;
            }
        }

        Ok(marginal)
    }

    /// Table keys must have one label per parent
    fn check_arity(&self) -> Result<()> {
        let arity = self.table.arity()?;
        if arity != self.parents.len() {
            return Err(AugurError::InconsistentTable(format!(
                "{} has {} parents but its table is keyed by {} values",
                self.name, self.parents.len(), arity
            )));
        }

        Ok(())
    }

    pub(crate) fn push_parent(&mut self, parent: VarId) {
        self.parents.push(parent);
    }

    pub(crate) fn push_child(&mut self, child: VarId) {
        self.children.push(child);
    }

    pub(crate) fn clear_links(&mut self) {
        self.parents.clear();
        self.children.clear();
    }

    pub(crate) fn invalidate(&mut self) {
        self.marginal = None;
    }

    /// The distinct labels used at position `i` of the table keys
    pub(crate) fn key_labels(&self, i: usize) -> HashSet<&str> {
        self.table.rows().filter_map(|(k, _)| k.get(i).map(|s| s.as_str())).collect()
    }

}
