use rdf_loom_model::Node;

/// A scalar expression over a solution's bindings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Constant(Node),
    Variable(String),

    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),

    Add(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    UnaryMinus(Box<Expression>),

    Equals(Box<Expression>, Box<Expression>),
    NotEquals(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    LessThan(Box<Expression>, Box<Expression>),
    LessThanOrEqual(Box<Expression>, Box<Expression>),

    Bound(String),
    SameTerm(Box<Expression>, Box<Expression>),
    If(Box<Expression>, Box<Expression>, Box<Expression>),
    Coalesce(Vec<Expression>),

    Str(Box<Expression>),
    Lang(Box<Expression>),
    Datatype(Box<Expression>),
    IsUri(Box<Expression>),
    IsBlank(Box<Expression>),
    IsLiteral(Box<Expression>),
    IsNumeric(Box<Expression>),

    StrLen(Box<Expression>),
    UCase(Box<Expression>),
    LCase(Box<Expression>),
    Concat(Vec<Expression>),
    Contains(Box<Expression>, Box<Expression>),
    StrStarts(Box<Expression>, Box<Expression>),
    StrEnds(Box<Expression>, Box<Expression>),
    Regex {
        text: Box<Expression>,
        pattern: Box<Expression>,
        flags: Option<String>,
    },
    Hash {
        kind: HashKind,
        inner: Box<Expression>,
    },

    /// An aggregate in expression position (projections, HAVING). The
    /// compiler rewrites these into references to group-by slot variables.
    Aggregate(Box<Aggregate>),
}

/// The SPARQL hash functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKind {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

/// An aggregate expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Aggregate {
    Count {
        expression: Box<Expression>,
        distinct: bool,
    },
    CountAll {
        distinct: bool,
    },
    Sum {
        expression: Box<Expression>,
        distinct: bool,
    },
    Avg {
        expression: Box<Expression>,
        distinct: bool,
    },
    Min {
        expression: Box<Expression>,
    },
    Max {
        expression: Box<Expression>,
    },
    Sample {
        expression: Box<Expression>,
    },
    GroupConcat {
        expression: Box<Expression>,
        separator: Option<String>,
        distinct: bool,
    },
}

/// One ORDER BY condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortCondition {
    pub expression: Expression,
    pub ascending: bool,
}

impl SortCondition {
    pub fn ascending(expression: Expression) -> Self {
        Self {
            expression,
            ascending: true,
        }
    }

    pub fn descending(expression: Expression) -> Self {
        Self {
            expression,
            ascending: false,
        }
    }
}

impl Expression {
    pub fn constant(node: Node) -> Self {
        Expression::Constant(node)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    /// True when the expression contains an aggregate anywhere.
    pub fn has_aggregate(&self) -> bool {
        match self {
            Expression::Aggregate(_) => true,
            Expression::Constant(_) | Expression::Variable(_) | Expression::Bound(_) => {
                false
            }
            Expression::Not(a)
            | Expression::UnaryMinus(a)
            | Expression::Str(a)
            | Expression::Lang(a)
            | Expression::Datatype(a)
            | Expression::IsUri(a)
            | Expression::IsBlank(a)
            | Expression::IsLiteral(a)
            | Expression::IsNumeric(a)
            | Expression::StrLen(a)
            | Expression::UCase(a)
            | Expression::LCase(a)
            | Expression::Hash { inner: a, .. } => a.has_aggregate(),
            Expression::And(a, b)
            | Expression::Or(a, b)
            | Expression::Add(a, b)
            | Expression::Subtract(a, b)
            | Expression::Multiply(a, b)
            | Expression::Divide(a, b)
            | Expression::Equals(a, b)
            | Expression::NotEquals(a, b)
            | Expression::GreaterThan(a, b)
            | Expression::GreaterThanOrEqual(a, b)
            | Expression::LessThan(a, b)
            | Expression::LessThanOrEqual(a, b)
            | Expression::SameTerm(a, b)
            | Expression::Contains(a, b)
            | Expression::StrStarts(a, b)
            | Expression::StrEnds(a, b) => a.has_aggregate() || b.has_aggregate(),
            Expression::If(a, b, c) => {
                a.has_aggregate() || b.has_aggregate() || c.has_aggregate()
            }
            Expression::Coalesce(items) | Expression::Concat(items) => {
                items.iter().any(Expression::has_aggregate)
            }
            Expression::Regex { text, pattern, .. } => {
                text.has_aggregate() || pattern.has_aggregate()
            }
        }
    }

    /// Rebuilds the expression with every aggregate sub-expression replaced
    /// through `replace`. Used by the compiler to substitute group-by slot
    /// variables.
    pub fn map_aggregates(
        &self,
        replace: &mut impl FnMut(&Aggregate) -> Expression,
    ) -> Expression {
        fn map(
            e: &Expression,
            replace: &mut impl FnMut(&Aggregate) -> Expression,
        ) -> Box<Expression> {
            Box::new(e.map_aggregates(replace))
        }
        match self {
            Expression::Aggregate(aggregate) => replace(aggregate),
            Expression::Constant(_) | Expression::Variable(_) | Expression::Bound(_) => {
                self.clone()
            }
            Expression::Not(a) => Expression::Not(map(a, replace)),
            Expression::UnaryMinus(a) => Expression::UnaryMinus(map(a, replace)),
            Expression::Str(a) => Expression::Str(map(a, replace)),
            Expression::Lang(a) => Expression::Lang(map(a, replace)),
            Expression::Datatype(a) => Expression::Datatype(map(a, replace)),
            Expression::IsUri(a) => Expression::IsUri(map(a, replace)),
            Expression::IsBlank(a) => Expression::IsBlank(map(a, replace)),
            Expression::IsLiteral(a) => Expression::IsLiteral(map(a, replace)),
            Expression::IsNumeric(a) => Expression::IsNumeric(map(a, replace)),
            Expression::StrLen(a) => Expression::StrLen(map(a, replace)),
            Expression::UCase(a) => Expression::UCase(map(a, replace)),
            Expression::LCase(a) => Expression::LCase(map(a, replace)),
            Expression::Hash { kind, inner } => Expression::Hash {
                kind: *kind,
                inner: map(inner, replace),
            },
            Expression::And(a, b) => Expression::And(map(a, replace), map(b, replace)),
            Expression::Or(a, b) => Expression::Or(map(a, replace), map(b, replace)),
            Expression::Add(a, b) => Expression::Add(map(a, replace), map(b, replace)),
            Expression::Subtract(a, b) => {
                Expression::Subtract(map(a, replace), map(b, replace))
            }
            Expression::Multiply(a, b) => {
                Expression::Multiply(map(a, replace), map(b, replace))
            }
            Expression::Divide(a, b) => {
                Expression::Divide(map(a, replace), map(b, replace))
            }
            Expression::Equals(a, b) => {
                Expression::Equals(map(a, replace), map(b, replace))
            }
            Expression::NotEquals(a, b) => {
                Expression::NotEquals(map(a, replace), map(b, replace))
            }
            Expression::GreaterThan(a, b) => {
                Expression::GreaterThan(map(a, replace), map(b, replace))
            }
            Expression::GreaterThanOrEqual(a, b) => {
                Expression::GreaterThanOrEqual(map(a, replace), map(b, replace))
            }
            Expression::LessThan(a, b) => {
                Expression::LessThan(map(a, replace), map(b, replace))
            }
            Expression::LessThanOrEqual(a, b) => {
                Expression::LessThanOrEqual(map(a, replace), map(b, replace))
            }
            Expression::SameTerm(a, b) => {
                Expression::SameTerm(map(a, replace), map(b, replace))
            }
            Expression::Contains(a, b) => {
                Expression::Contains(map(a, replace), map(b, replace))
            }
            Expression::StrStarts(a, b) => {
                Expression::StrStarts(map(a, replace), map(b, replace))
            }
            Expression::StrEnds(a, b) => {
                Expression::StrEnds(map(a, replace), map(b, replace))
            }
            Expression::If(a, b, c) => Expression::If(
                map(a, replace),
                map(b, replace),
                map(c, replace),
            ),
            Expression::Coalesce(items) => Expression::Coalesce(
                items.iter().map(|e| e.map_aggregates(replace)).collect(),
            ),
            Expression::Concat(items) => Expression::Concat(
                items.iter().map(|e| e.map_aggregates(replace)).collect(),
            ),
            Expression::Regex {
                text,
                pattern,
                flags,
            } => Expression::Regex {
                text: map(text, replace),
                pattern: map(pattern, replace),
                flags: flags.clone(),
            },
        }
    }
}
