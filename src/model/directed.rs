//! Defines a `BayesianNetwork`, a directed graphical model over discrete `RandomVariable`s that
//! supports marginal, joint and (restricted) conditional probability queries.

use init::{parent_combinations, Initialization};
use table::ProbabilityTable;
use util::{AugurError, Result};
use variable::{Assignment, RandomVariable, VarId};
use super::Model;

use bidir_map::BidirMap;

use std::collections::VecDeque;


/// The compilation state of a `BayesianNetwork`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompileState {
    /// The structure changed since the last compile (or was never compiled); queries fail.
    Uninitialized,

    /// Every marginal is computed; queries are answered.
    Compiled
}


/// Represents a Bayesian Network - a Directed Probabilistic Graphical Model.
///
/// # Representation
/// The network owns its `RandomVariable`s in an arena, in declaration order. Parent and child
/// links are `VarId` handles into the arena. Declaration order does not need to be
/// topological; `compile` sorts the variables and rejects cycles.
///
/// # Lifecycle
/// A network is built up with `add_variable`, `add_parent` or `set_variables`, then compiled.
/// Every structural change returns the network to `CompileState::Uninitialized` and discards
/// the marginals; every query requires `CompileState::Compiled`.
#[derive(Clone, Debug)]
pub struct BayesianNetwork {

    /// The variables, indexed by `VarId`
    variables: Vec<RandomVariable>,

    /// Two way lookup ```(VarId -> name)``` and ```(name -> VarId)```
    index: BidirMap<VarId, String>,

    /// Topological order, valid once compiled
    order: Vec<VarId>,

    state: CompileState

}

impl BayesianNetwork {

    /// Construct an empty network
    pub fn new() -> Self {
        BayesianNetwork {
            variables: Vec::new(),
            index: BidirMap::new(),
            order: Vec::new(),
            state: CompileState::Uninitialized
        }
    }

    /// Add a `RandomVariable` to the network.
    ///
    /// # Args
    /// * `var`: the variable to add. Its table must be keyed by the values of `parents`, in order.
    /// * `parents`: the parents of `var`; they must already be in the network.
    ///
    /// # Returns
    /// the handle of the new variable
    ///
    /// # Errors
    /// * `AugurError::DuplicateVariable` if a variable with the same name exists
    /// * `AugurError::MissingParent` if a parent handle does not belong to this network
    pub fn add_variable(&mut self, mut var: RandomVariable, parents: &[VarId]) -> Result<VarId> {
        if self.variable_id(var.name()).is_some() {
            return Err(AugurError::DuplicateVariable(var.name().to_string()));
        }

        if let Some(p) = parents.iter().find(|p| p.0 >= self.variables.len()) {
            return Err(AugurError::MissingParent(p.to_string()));
        }

        let id = VarId(self.variables.len());
        var.clear_links();
        var.invalidate();
        for &p in parents {
            var.push_parent(p);
            self.variables[p.0].push_child(id);
        }

        self.index.insert(id, var.name().to_string());
        self.variables.push(var);
        self.invalidate();

        Ok(id)
    }

    /// Append `parent` to the parents of `child`.
    ///
    /// The table of `child` must be keyed accordingly by the time the network is compiled. The
    /// edge may close a cycle; `compile` reports it.
    ///
    /// # Errors
    /// * `AugurError::MissingParent` if either handle does not belong to this network
    /// * `AugurError::DuplicateVariable` if `parent` already is a parent of `child`
    pub fn add_parent(&mut self, child: VarId, parent: VarId) -> Result<()> {
        if child.0 >= self.variables.len() {
            return Err(AugurError::MissingParent(child.to_string()));
        } else if parent.0 >= self.variables.len() {
            return Err(AugurError::MissingParent(parent.to_string()));
        }

        if self.variables[child.0].is_direct_child_of(parent) {
            return Err(AugurError::DuplicateVariable(self.variables[parent.0].name().to_string()));
        }

        self.variables[child.0].push_parent(parent);
        self.variables[parent.0].push_child(child);
        self.invalidate();

        Ok(())
    }

    /// Replace the contents of the network.
    ///
    /// Each entry is a variable and the names of its parents. Parents are resolved against the
    /// whole list, so entries may appear in any order. On error the network is left empty.
    ///
    /// # Errors
    /// * `AugurError::DuplicateVariable` if two variables share a name
    /// * `AugurError::MissingParent` if a parent name is not in the list
    pub fn set_variables(&mut self, variables: Vec<(RandomVariable, Vec<String>)>) -> Result<()> {
        *self = BayesianNetwork::new();

        let mut parent_names = Vec::with_capacity(variables.len());
        for (mut var, parents) in variables {
            if self.variable_id(var.name()).is_some() {
                *self = BayesianNetwork::new();
                return Err(AugurError::DuplicateVariable(var.name().to_string()));
            }

            let id = VarId(self.variables.len());
            var.clear_links();
            var.invalidate();
            self.index.insert(id, var.name().to_string());
            self.variables.push(var);
            parent_names.push(parents);
        }

        for (i, parents) in parent_names.iter().enumerate() {
            for name in parents {
                match self.variable_id(name) {
                    Some(p) => {
                        self.variables[i].push_parent(p);
                        self.variables[p.0].push_child(VarId(i));
                    },
                    None => {
                        *self = BayesianNetwork::new();
                        return Err(AugurError::MissingParent(name.clone()));
                    }
                }
            }
        }

        Ok(())
    }

    /// Compute the marginal distribution of every variable.
    ///
    /// Validates every table against the domains of its parents, sorts the variables
    /// topologically and compiles them parents first. Does nothing if already compiled.
    ///
    /// # Errors
    /// * `AugurError::InconsistentTable` if a table is not keyed by one value per parent
    /// * `AugurError::UnknownValue` if a table key uses a label outside its parent's domain
    /// * `AugurError::MissingTableKey` if a combination of parent values has no row
    /// * `AugurError::CyclicNetwork` if the parent graph has a cycle
    pub fn compile(&mut self) -> Result<()> {
        if self.state == CompileState::Compiled {
            return Ok(());
        }

        for var in self.variables.iter() {
            self.check_table(var)?;
        }

        let order = self.sort()?;

        for &id in order.iter() {
            // parents precede id in the order, so they are already compiled
            let marginal = self.variables[id.0].compute_marginal(&self.parents_of(id))?;
            self.variables[id.0].set_marginal(marginal);
        }

        debug!(variables = self.variables.len(), "compiled bayesian network");
        self.order = order;
        self.state = CompileState::Compiled;
        Ok(())
    }

    /// The compilation state of the network
    pub fn state(&self) -> CompileState {
        self.state
    }

    pub fn is_compiled(&self) -> bool {
        self.state == CompileState::Compiled
    }

    /// Get the variable with the given handle
    pub fn get(&self, id: VarId) -> Option<&RandomVariable> {
        self.variables.get(id.0)
    }

    /// Look up a variable by name
    pub fn variable(&self, name: &str) -> Option<&RandomVariable> {
        self.variable_id(name).map(|id| &self.variables[id.0])
    }

    /// Look up the handle of a variable by name
    pub fn variable_id(&self, name: &str) -> Option<VarId> {
        self.index.get_by_second(&name.to_string()).cloned()
    }

    /// Look up a variable's name by handle
    pub fn name_of(&self, id: VarId) -> Option<&str> {
        self.index.get_by_first(&id).map(|s| s.as_str())
    }

    /// The variables in declaration order
    pub fn variables(&self) -> &[RandomVariable] {
        &self.variables
    }

    /// The parents of a variable, in the order its table is keyed
    pub fn parents_of(&self, id: VarId) -> Vec<&RandomVariable> {
        self.variables[id.0].parents().iter().map(|p| &self.variables[p.0]).collect()
    }

    /// A topological order of the network
    ///
    /// # Errors
    /// * `AugurError::NotCompiled` if the network has not been compiled
    pub fn topological_order(&self) -> Result<&[VarId]> {
        self.require_compiled()?;
        Ok(&self.order)
    }

    /// The marginal probability ```P(name = value)```
    pub fn marginal_probability(&self, name: &str, value: &str) -> Result<f64> {
        self.require_compiled()?;
        self.lookup(name)?.marginal_probability(value)
    }

    /// Project a full assignment onto the parents of one variable, producing its table key.
    ///
    /// # Errors
    /// * `AugurError::UnknownVariable` if there is no such variable
    /// * `AugurError::IncompleteAssignment` if a parent is not assigned
    pub fn parent_values(&self, name: &str, assignment: &Assignment) -> Result<Vec<String>> {
        let var = self.lookup(name)?;
        let mut key = Vec::with_capacity(var.parents().len());
        let mut missing = Vec::new();

        for parent in self.parents_of(self.id(name)?) {
            match assignment.get(parent.name()) {
                Some(v) => key.push(v.to_string()),
                None => missing.push(parent.name().to_string())
            }
        }

        if !missing.is_empty() {
            return Err(AugurError::IncompleteAssignment(missing));
        }

        Ok(key)
    }

    /// Compute ```P(targets | evidence)```.
    ///
    /// Only two query shapes are supported:
    ///
    /// * every target is a direct child of every evidence variable: the product over targets of
    ///   each target's conditional probability given the evidence;
    /// * otherwise, a single target with a two-valued domain, answered with Bayes' rule
    ///   ```(L * Pr) / (L * Pr + L' * (1 - Pr))``` where ```Pr``` is the target's marginal,
    ///   ```L``` the probability of the evidence given the target value and ```L'``` the same
    ///   given the other value.
    ///
    /// Both assume the target variables are independent of one another, as are the evidence
    /// variables given the targets.
    ///
    /// # Errors
    /// * `AugurError::NotCompiled` if the network has not been compiled
    /// * `AugurError::UnknownVariable` if a name is not in the network
    /// * `AugurError::UnsupportedInferenceShape` for an empty target set, or a Bayes' rule query
    ///   on more than one target or a non-binary target
    /// * `AugurError::DivideByZero` if the evidence has probability zero
    pub fn conditional_probability(&self, targets: &Assignment, evidence: &Assignment) -> Result<f64> {
        self.require_compiled()?;

        if targets.is_empty() {
            return Err(AugurError::UnsupportedInferenceShape(String::from("no target variables")));
        }

        let targets = self.resolve_assignment(targets)?;
        let observed = self.resolve_assignment(evidence)?;

        let children_given_parents = targets.iter().all(|&(t, _)| {
            observed.iter().all(|&(e, _)| self.variables[t.0].is_direct_child_of(e))
        });

        if children_given_parents {
            debug!("conditional query: children given parents");
            let mut p = 1.0;
            for &(id, value) in targets.iter() {
                p *= self.variable_conditional(id, value, evidence)?;
            }
            return Ok(p);
        }

        debug!("conditional query: parents given children");
        if targets.len() != 1 {
            return Err(AugurError::UnsupportedInferenceShape(format!(
                "bayes' rule needs exactly one target variable, got {}", targets.len()
            )));
        }

        let (id, value) = targets[0];
        let target = &self.variables[id.0];
        if target.cardinality() != 2 {
            return Err(AugurError::UnsupportedInferenceShape(format!(
                "bayes' rule needs a binary target, {} has {} values", target.name(), target.cardinality()
            )));
        }

        let idx = target.value_index(value)?;
        let given = Assignment::new().with(target.name(), value);
        let complementary = Assignment::new().with(target.name(), target.domain()[1 - idx]);

        let prior = target.marginal_probability(value)?;

        let mut likelihood = 1.0;
        let mut complementary_likelihood = 1.0;
        for &(id, value) in observed.iter() {
            likelihood *= self.variable_conditional(id, value, &given)?;
            complementary_likelihood *= self.variable_conditional(id, value, &complementary)?;
        }

        let numerator = likelihood * prior;
        let denominator = numerator + complementary_likelihood * (1.0 - prior);
        if denominator == 0.0 {
            return Err(AugurError::DivideByZero);
        }

        Ok(numerator / denominator)
    }

    /// ```P(id = value | evidence)``` with the evidence restricted to the variable's parents
    fn variable_conditional(&self, id: VarId, value: &str, evidence: &Assignment) -> Result<f64> {
        self.variables[id.0].conditional_probability(value, evidence, &self.parents_of(id))
    }

    /// Resolve the names of an assignment to handles
    fn resolve_assignment<'a>(&self, assignment: &'a Assignment) -> Result<Vec<(VarId, &'a str)>> {
        assignment.iter().map(|(name, value)| self.id(name).map(|id| (id, value))).collect()
    }

    fn id(&self, name: &str) -> Result<VarId> {
        self.variable_id(name).ok_or_else(|| AugurError::UnknownVariable(name.to_string()))
    }

    fn lookup(&self, name: &str) -> Result<&RandomVariable> {
        self.id(name).map(|id| &self.variables[id.0])
    }

    fn require_compiled(&self) -> Result<()> {
        match self.state {
            CompileState::Compiled => Ok(()),
            CompileState::Uninitialized => Err(AugurError::NotCompiled)
        }
    }

    fn invalidate(&mut self) {
        self.state = CompileState::Uninitialized;
        self.order.clear();
        for var in self.variables.iter_mut() {
            var.invalidate();
        }
    }

    /// Check that the table of `var` has exactly one row per combination of parent values
    fn check_table(&self, var: &RandomVariable) -> Result<()> {
        let parents = self.parents_of_var(var);
        let arity = var.table().arity()?;
        if arity != parents.len() {
            return Err(AugurError::InconsistentTable(format!(
                "{} has {} parents but its table is keyed by {} values",
                var.name(), parents.len(), arity
            )));
        }

        for (i, parent) in parents.iter().enumerate() {
            for label in var.key_labels(i) {
                parent.value_index(label)?;
            }
        }

        let domains: Vec<Vec<String>> = parents.iter()
                                               .map(|p| p.domain().iter().map(|s| s.to_string()).collect())
                                               .collect();
        for key in parent_combinations(&domains) {
            if var.table().row(&key[..]).is_none() {
                return Err(AugurError::MissingTableKey { variable: var.name().to_string(), key });
            }
        }

        Ok(())
    }

    fn parents_of_var(&self, var: &RandomVariable) -> Vec<&RandomVariable> {
        var.parents().iter().map(|p| &self.variables[p.0]).collect()
    }

    /// Kahn's algorithm. Ties are broken by declaration order.
    fn sort(&self) -> Result<Vec<VarId>> {
        let mut in_degree: Vec<usize> = self.variables.iter().map(|v| v.parents().len()).collect();
        let mut ready: VecDeque<VarId> = (0..self.variables.len()).filter(|&i| in_degree[i] == 0)
                                                                  .map(VarId)
                                                                  .collect();
        let mut order = Vec::with_capacity(self.variables.len());

        while let Some(id) = ready.pop_front() {
            order.push(id);
            for &child in self.variables[id.0].children() {
                in_degree[child.0] -= 1;
                if in_degree[child.0] == 0 {
                    ready.push_back(child);
                }
            }
        }

        if order.len() != self.variables.len() {
            let cyclic = (0..self.variables.len()).filter(|&i| in_degree[i] > 0)
                                                  .map(|i| self.variables[i].name().to_string())
                                                  .collect();
            return Err(AugurError::CyclicNetwork(cyclic));
        }

        Ok(order)
    }
}

impl Model for BayesianNetwork {

    fn lookup_variable(&self, name: &str) -> Option<&RandomVariable> {
        self.variable(name)
    }

    fn lookup_name(&self, id: VarId) -> Option<&str> {
        self.name_of(id)
    }

    fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// The joint probability of a full assignment, by the chain rule.
    fn joint_probability(&self, assignment: &Assignment) -> Result<f64> {
        self.require_compiled()?;

        for (name, _) in assignment.iter() {
            self.id(name)?;
        }

        let missing: Vec<String> = self.variables.iter()
                                                 .filter(|v| !assignment.contains(v.name()))
                                                 .map(|v| v.name().to_string())
                                                 .collect();
        if !missing.is_empty() {
            return Err(AugurError::IncompleteAssignment(missing));
        }

        // for every variable in the graph
        self.variables.iter()
            // get the probability of its value given its parents' values
            .map(|var| {
                let key = self.parent_values(var.name(), assignment)?;
                var.probability(assignment.get(var.name()).unwrap_or(""), &key[..])
            })
            // and multiply those probabilities by the chain rule
            .fold(Ok(1.0), |acc, val| acc.and_then(|p| val.map(|v| p * v)))
    }

}


/// An implementation of the [builder pattern] for creating a `BayesianNetwork`.
///
/// Variables are named by their parents, which must already have been added.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
pub struct BayesianNetworkBuilder {

    /// The network under construction
    network: BayesianNetwork,

    /// The error state of the builder
    err: Option<AugurError>

}


impl BayesianNetworkBuilder {

    /// Construct a new `BayesianNetworkBuilder` representing an empty `BayesianNetwork`
    pub fn new() -> Self {
        BayesianNetworkBuilder { network: BayesianNetwork::new(), err: None }
    }


    /// Add a variable whose table is built from an `Initialization`.
    ///
    /// # Args
    /// * `name`: the name of the variable
    /// * `domain`: the ordered value labels
    /// * `parents`: the names of the parents. The parents must already be in the model.
    /// * `init`: the initialization mechanism for the CPT
    pub fn with_variable(
        self,
        name: &str,
        domain: &[&str],
        parents: &[&str],
        init: Initialization,
    ) -> Self {
        if self.err.is_some() {
            return self;
        }

        let table = self.resolve(parents).and_then(|ids| {
            let domains: Vec<Vec<String>> = ids.iter()
                                               .map(|&p| self.network.variables[p.0].domain()
                                                                                    .iter()
                                                                                    .map(|s| s.to_string())
                                                                                    .collect())
                                               .collect();
            init.build_table(domain.len(), &domains)
        });

        match table.and_then(|t| RandomVariable::new(name, domain, t)) {
            Ok(var) => self.with_random_variable(var, parents),
            Err(e) => self.fail(e)
        }
    }


    /// Add an already constructed variable.
    ///
    /// # Args
    /// * `var`: the variable
    /// * `parents`: the names of the parents. The parents must already be in the model.
    pub fn with_random_variable(mut self, var: RandomVariable, parents: &[&str]) -> Self {
        if self.err.is_some() {
            return self;
        }

        let result = self.resolve(parents).and_then(|ids| self.network.add_variable(var, &ids));
        match result {
            Ok(_) => self,
            Err(e) => self.fail(e)
        }
    }


    /// Complete building the model.
    ///
    /// # Returns
    /// the uncompiled `BayesianNetwork`, or an error if one was generated during the building
    /// process
    pub fn build(self) -> Result<BayesianNetwork> {
        if let Some(e) = self.err {
            Err(e)
        } else {
            Ok(self.network)
        }
    }


    /// Complete building the model and compile it
    pub fn build_compiled(self) -> Result<BayesianNetwork> {
        let mut network = self.build()?;
        network.compile()?;
        Ok(network)
    }

    fn resolve(&self, parents: &[&str]) -> Result<Vec<VarId>> {
        parents.iter()
               .map(|&p| self.network.variable_id(p).ok_or_else(|| AugurError::MissingParent(p.to_string())))
               .collect()
    }

    fn fail(mut self, e: AugurError) -> Self {
        self.err = Some(e);
        self
    }
}
