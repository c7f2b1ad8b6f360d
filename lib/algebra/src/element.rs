use crate::expression::{Expression, SortCondition};
use crate::path::TriplePath;
use crate::solution::TabularData;
use rdf_loom_model::{Triple, UriNode};

/// The parsed-query element tree handed to the compiler by the (external)
/// SPARQL parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A block of plain triple patterns.
    TripleBlock(Vec<Triple>),
    /// A block of triple paths, possibly mixing plain patterns and real
    /// property paths.
    PathBlock(Vec<TriplePath>),
    /// Sequential elements joined in declaration order.
    Group(Vec<Element>),
    Union(Vec<Element>),
    Optional(Box<Element>),
    Minus(Box<Element>),
    Filter(Vec<Expression>),
    Bind(Vec<(String, Expression)>),
    /// Inline `VALUES` data.
    Data(TabularData),
    SubQuery(Box<Query>),
    Service {
        inner: Box<Element>,
        endpoint: UriNode,
        silent: bool,
    },
}

/// The kind of query being compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryType {
    Select,
    #[default]
    SelectAll,
    SelectDistinct,
    SelectAllDistinct,
    SelectReduced,
    SelectAllReduced,
    Ask,
}

/// A parsed query: the WHERE element tree plus the query-level modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub query_type: QueryType,
    pub where_clause: Option<Element>,
    /// Projections in declaration order: a plain variable or a named
    /// expression (possibly an aggregate).
    pub projections: Vec<(String, Option<Expression>)>,
    pub group_expressions: Vec<(Expression, Option<String>)>,
    pub having_conditions: Vec<Expression>,
    pub sort_conditions: Vec<SortCondition>,
    /// −1 means no limit.
    pub limit: i64,
    /// Only values > 0 mean an offset.
    pub offset: i64,
    /// The query-level `VALUES` clause.
    pub values_clause: Option<TabularData>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_limit(&self) -> bool {
        self.limit >= 0
    }

    pub fn has_offset(&self) -> bool {
        self.offset > 0
    }

    pub fn add_project_variable(&mut self, name: impl Into<String>) {
        self.projections.push((name.into(), None));
    }

    pub fn add_project_expression(
        &mut self,
        name: impl Into<String>,
        expression: Expression,
    ) {
        self.projections.push((name.into(), Some(expression)));
    }
}

impl Default for Query {
    fn default() -> Self {
        Self {
            query_type: QueryType::default(),
            where_clause: None,
            projections: Vec::new(),
            group_expressions: Vec::new(),
            having_conditions: Vec::new(),
            sort_conditions: Vec::new(),
            limit: -1,
            offset: 0,
            values_clause: None,
        }
    }
}
