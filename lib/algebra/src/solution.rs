use rdf_loom_model::Node;
use std::collections::BTreeMap;

/// One row of variable-to-node bindings produced during query evaluation.
///
/// Absent means unbound; there is no bound-to-null. The mapping is immutable
/// from the outside: evaluation extends solutions through [Solution::join]
/// and [Solution::bind].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Solution {
    bindings: BTreeMap<String, Node>,
}

impl Solution {
    /// The empty solution (no bindings).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style binding, for tests and table construction.
    pub fn bind(mut self, variable: impl Into<String>, node: Node) -> Self {
        self.bindings.insert(variable.into(), node);
        self
    }

    pub fn get(&self, variable: &str) -> Option<&Node> {
        self.bindings.get(variable)
    }

    pub fn is_bound(&self, variable: &str) -> bool {
        self.bindings.contains_key(variable)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Two solutions are joinable iff every variable bound in both carries
    /// the same value.
    pub fn is_compatible(&self, other: &Solution) -> bool {
        for (variable, node) in &self.bindings {
            if let Some(theirs) = other.bindings.get(variable) {
                if theirs != node {
                    return false;
                }
            }
        }
        true
    }

    /// True when the two solutions share at least one bound variable.
    pub fn shares_variable_with(&self, other: &Solution) -> bool {
        self.bindings
            .keys()
            .any(|variable| other.bindings.contains_key(variable))
    }

    /// The union of the bindings of two compatible solutions.
    pub fn join(&self, other: &Solution) -> Solution {
        let mut bindings = self.bindings.clone();
        for (variable, node) in &other.bindings {
            bindings
                .entry(variable.clone())
                .or_insert_with(|| node.clone());
        }
        Solution { bindings }
    }

    /// Restricts the visible variables to `variables`.
    pub fn project(&self, variables: &[String]) -> Solution {
        let bindings = self
            .bindings
            .iter()
            .filter(|(variable, _)| variables.contains(variable))
            .map(|(variable, node)| (variable.clone(), node.clone()))
            .collect();
        Solution { bindings }
    }
}

/// A materialized table of solutions with a declared variable list, as
/// produced by inline `VALUES` data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularData {
    pub variables: Vec<String>,
    pub rows: Vec<Solution>,
}

impl TabularData {
    pub fn new(variables: Vec<String>, rows: Vec<Solution>) -> Self {
        Self { variables, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}
