use rdf_loom_algebra::Solution;
use rdf_loom_model::Node;

/// The result of a query: a boolean for ASK, a table for SELECT.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Boolean(bool),
    Tabular(TabularResults),
}

impl QueryResult {
    pub fn is_boolean(&self) -> bool {
        matches!(self, QueryResult::Boolean(_))
    }

    pub fn is_tabular(&self) -> bool {
        matches!(self, QueryResult::Tabular(_))
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            QueryResult::Boolean(value) => Some(*value),
            QueryResult::Tabular(_) => None,
        }
    }

    pub fn as_tabular(&self) -> Option<&TabularResults> {
        match self {
            QueryResult::Tabular(results) => Some(results),
            QueryResult::Boolean(_) => None,
        }
    }
}

/// Materialized SELECT results: the declared projection (a fixed variable
/// set) plus the result rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularResults {
    variables: Vec<String>,
    rows: Vec<Solution>,
}

impl TabularResults {
    pub fn new(variables: Vec<String>, rows: Vec<Solution>) -> Self {
        Self { variables, rows }
    }

    /// The declared projection. Every row is scoped to exactly these
    /// variables, bound or not.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<ResultRow<'_>> {
        self.rows.get(index).map(|solution| ResultRow {
            variables: &self.variables,
            solution,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = ResultRow<'_>> {
        self.rows.iter().map(|solution| ResultRow {
            variables: &self.variables,
            solution,
        })
    }
}

/// One result row, seen through the declared variable list.
#[derive(Debug, Clone, Copy)]
pub struct ResultRow<'a> {
    variables: &'a [String],
    solution: &'a Solution,
}

impl ResultRow<'_> {
    /// True when the variable is in scope for this result set, bound or not.
    pub fn has_value(&self, variable: &str) -> bool {
        self.variables.iter().any(|v| v == variable)
    }

    /// True when the variable is actually bound in this row.
    pub fn has_bound_value(&self, variable: &str) -> bool {
        self.solution.is_bound(variable)
    }

    pub fn get(&self, variable: &str) -> Option<&Node> {
        self.solution.get(variable)
    }

    pub fn is_empty(&self) -> bool {
        self.solution.is_empty()
    }

    pub fn solution(&self) -> &Solution {
        self.solution
    }
}
