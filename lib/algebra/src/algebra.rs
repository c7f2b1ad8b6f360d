use crate::expression::{Aggregate, Expression, SortCondition};
use crate::path::TriplePath;
use crate::solution::TabularData;
use rdf_loom_model::{Triple, UriNode};

/// A constant table of solutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Table {
    /// One empty solution: the join identity.
    Unit,
    /// No solutions: signals that no results are possible.
    Empty,
    /// Materialized rows.
    Data(TabularData),
}

impl Table {
    pub fn is_unit(&self) -> bool {
        matches!(self, Table::Unit)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Table::Empty)
    }
}

/// The composable operator tree a query compiles into. Immutable once built;
/// constructed bottom-up by the compiler and consumed top-down by the
/// execution engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Algebra {
    Table(Table),
    /// A basic graph pattern: triple patterns matched conjunctively, kept in
    /// declaration order.
    Bgp(Vec<Triple>),
    Join {
        lhs: Box<Algebra>,
        rhs: Box<Algebra>,
    },
    LeftJoin {
        lhs: Box<Algebra>,
        rhs: Box<Algebra>,
    },
    Union {
        lhs: Box<Algebra>,
        rhs: Box<Algebra>,
    },
    Minus {
        lhs: Box<Algebra>,
        rhs: Box<Algebra>,
    },
    Filter {
        expressions: Vec<Expression>,
        inner: Box<Algebra>,
    },
    Extend {
        assignments: Vec<(String, Expression)>,
        inner: Box<Algebra>,
    },
    GroupBy {
        group_expressions: Vec<(Expression, Option<String>)>,
        /// Deduplicated aggregates, each bound to a reserved slot variable.
        aggregators: Vec<(Aggregate, String)>,
        inner: Box<Algebra>,
    },
    Distinct {
        inner: Box<Algebra>,
    },
    Reduced {
        inner: Box<Algebra>,
    },
    Slice {
        /// −1 means unbounded.
        limit: i64,
        offset: i64,
        inner: Box<Algebra>,
    },
    Project {
        variables: Vec<String>,
        inner: Box<Algebra>,
    },
    OrderBy {
        conditions: Vec<SortCondition>,
        inner: Box<Algebra>,
    },
    PropertyPath {
        path: TriplePath,
        inner: Box<Algebra>,
    },
    Service {
        endpoint: UriNode,
        silent: bool,
        inner: Box<Algebra>,
    },
}

impl Algebra {
    pub fn unit_table() -> Self {
        Algebra::Table(Table::Unit)
    }

    pub fn empty_table() -> Self {
        Algebra::Table(Table::Empty)
    }

    pub fn is_unit_table(&self) -> bool {
        matches!(self, Algebra::Table(Table::Unit))
    }

    pub fn join(lhs: Algebra, rhs: Algebra) -> Self {
        Algebra::Join {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// The variable names visible in the solutions this operator produces,
    /// in first-appearance order.
    pub fn in_scope_variables(&self) -> Vec<String> {
        let mut variables = Vec::new();
        self.collect_variables(&mut variables);
        variables
    }

    fn collect_variables(&self, out: &mut Vec<String>) {
        fn push(out: &mut Vec<String>, name: &str) {
            if !out.iter().any(|existing| existing == name) {
                out.push(name.to_owned());
            }
        }
        match self {
            Algebra::Table(Table::Data(data)) => {
                for variable in &data.variables {
                    push(out, variable);
                }
            }
            Algebra::Table(_) => {}
            Algebra::Bgp(patterns) => {
                for pattern in patterns {
                    for name in pattern.variables() {
                        push(out, name);
                    }
                }
            }
            Algebra::Join { lhs, rhs }
            | Algebra::LeftJoin { lhs, rhs }
            | Algebra::Union { lhs, rhs } => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
            // MINUS does not bind anything from its right-hand side
            Algebra::Minus { lhs, .. } => lhs.collect_variables(out),
            Algebra::Filter { inner, .. }
            | Algebra::Distinct { inner }
            | Algebra::Reduced { inner }
            | Algebra::Slice { inner, .. }
            | Algebra::OrderBy { inner, .. }
            | Algebra::Service { inner, .. } => inner.collect_variables(out),
            Algebra::Extend { assignments, inner } => {
                inner.collect_variables(out);
                for (name, _) in assignments {
                    push(out, name);
                }
            }
            Algebra::GroupBy {
                group_expressions,
                aggregators,
                ..
            } => {
                for (expression, name) in group_expressions {
                    if let Some(name) = name {
                        push(out, name);
                    } else if let Expression::Variable(name) = expression {
                        push(out, name);
                    }
                }
                for (_, slot) in aggregators {
                    push(out, slot);
                }
            }
            Algebra::Project { variables, .. } => {
                for variable in variables {
                    push(out, variable);
                }
            }
            Algebra::PropertyPath { path, inner } => {
                for name in path.variables() {
                    push(out, name);
                }
                inner.collect_variables(out);
            }
        }
    }
}
