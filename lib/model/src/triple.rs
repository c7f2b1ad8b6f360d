use crate::node::Node;
use std::fmt;

/// An immutable RDF statement.
///
/// A triple knows nothing about the graph it lives in. Triples double as
/// patterns: any position may hold a variable, and only ground triples
/// (see [Triple::is_ground]) may be asserted into a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: Node,
    pub predicate: Node,
    pub object: Node,
}

impl Triple {
    pub fn new(subject: Node, predicate: Node, object: Node) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// True when no position holds a variable.
    pub fn is_ground(&self) -> bool {
        !self.subject.is_variable()
            && !self.predicate.is_variable()
            && !self.object.is_variable()
    }

    /// The names of all variables mentioned by this triple, in
    /// subject/predicate/object order, without duplicates.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for node in [&self.subject, &self.predicate, &self.object] {
            if let Some(name) = node.as_variable_name() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// The graph component of a [Quad]: a named graph or the default graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GraphName {
    #[default]
    DefaultGraph,
    Named(Node),
}

impl GraphName {
    pub fn is_default(&self) -> bool {
        matches!(self, GraphName::DefaultGraph)
    }
}

impl fmt::Display for GraphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphName::DefaultGraph => f.write_str("(default)"),
            GraphName::Named(node) => node.fmt(f),
        }
    }
}

/// A [Triple] decorated with the graph it was observed in. Quads are produced
/// on demand and never stored independently of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quad {
    pub triple: Triple,
    pub graph: GraphName,
}

impl Quad {
    pub fn new(triple: Triple, graph: GraphName) -> Self {
        Self { triple, graph }
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.triple, self.graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{LiteralNode, UriNode, VariableNode};

    fn uri(iri: &str) -> Node {
        Node::Uri(UriNode::new(iri).unwrap())
    }

    #[test]
    fn test_structural_equality() {
        let a = Triple::new(
            uri("http://test/s"),
            uri("http://test/p"),
            Node::Literal(LiteralNode::new("o")),
        );
        let b = Triple::new(
            uri("http://test/s"),
            uri("http://test/p"),
            Node::Literal(LiteralNode::new("o")),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_is_ground() {
        let ground = Triple::new(uri("http://test/s"), uri("http://test/p"), uri("http://test/o"));
        assert!(ground.is_ground());
        let pattern = Triple::new(
            Node::Variable(VariableNode::new("s")),
            uri("http://test/p"),
            uri("http://test/o"),
        );
        assert!(!pattern.is_ground());
        assert_eq!(pattern.variables(), vec!["s"]);
    }

    #[test]
    fn test_quad_wraps_triple() {
        let t = Triple::new(uri("http://test/s"), uri("http://test/p"), uri("http://test/o"));
        let quad = Quad::new(t.clone(), GraphName::DefaultGraph);
        assert!(quad.graph.is_default());
        assert_eq!(quad.triple, t);
    }
}
