use crate::node::{
    BlankNode, GraphLiteralNode, LiteralNode, Node, UriNode, VariableNode,
};
use crate::triple::Triple;
use crate::vocab::{rdf, xsd};
use oxiri::IriParseError;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

/// Construction-time configuration of a node factory. There are no global
/// mode switches: equality and typing behavior is a pure function of the
/// node's stored fields plus these options.
#[derive(Debug, Clone)]
pub struct FactoryOptions {
    /// RDF 1.1 mode: untyped literals implicitly carry `xsd:string` and
    /// language-tagged literals implicitly carry `rdf:langString`.
    pub creates_implicitly_typed_literals: bool,
}

impl Default for FactoryOptions {
    fn default() -> Self {
        Self {
            creates_implicitly_typed_literals: true,
        }
    }
}

/// Mints [Node] values. Implementations must uphold the contract covered by
/// the shared contract suite in this module's tests:
///
/// - distinct anonymous blank nodes never compare equal, not even from the
///   same factory;
/// - blank nodes created from the same explicit identifier always compare
///   equal, across factory instances;
/// - URI and literal nodes compare by value, so equal inputs yield equal
///   nodes across factories;
/// - [FactoryOptions::creates_implicitly_typed_literals] governs implicit
///   `xsd:string` / `rdf:langString` typing.
pub trait NodeFactory {
    fn options(&self) -> &FactoryOptions;

    /// Fails fast on malformed URIs.
    fn create_uri_node(&self, uri: &str) -> Result<Node, IriParseError>;

    fn create_blank_node(&self) -> Node;

    fn create_blank_node_with_id(&self, id: Uuid) -> Node;

    fn create_literal_node(&self, value: &str) -> Node;

    fn create_literal_node_with_language(&self, value: &str, language: &str) -> Node;

    fn create_literal_node_with_datatype(&self, value: &str, datatype: UriNode) -> Node;

    fn create_variable_node(&self, name: &str) -> Node;

    fn create_graph_literal_node(&self, triples: Vec<Triple>) -> Node;
}

/// The default [NodeFactory].
#[derive(Debug)]
pub struct SimpleNodeFactory {
    scope: u64,
    options: FactoryOptions,
}

impl SimpleNodeFactory {
    pub fn new() -> Self {
        Self::with_options(FactoryOptions::default())
    }

    pub fn with_options(options: FactoryOptions) -> Self {
        Self {
            scope: NEXT_SCOPE.fetch_add(1, Ordering::Relaxed),
            options,
        }
    }

    fn string_datatype() -> UriNode {
        UriNode::new(xsd::STRING).unwrap_or_else(|_| unreachable!("valid vocabulary IRI"))
    }

    fn lang_string_datatype() -> UriNode {
        UriNode::new(rdf::LANG_STRING)
            .unwrap_or_else(|_| unreachable!("valid vocabulary IRI"))
    }
}

impl Default for SimpleNodeFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeFactory for SimpleNodeFactory {
    fn options(&self) -> &FactoryOptions {
        &self.options
    }

    fn create_uri_node(&self, uri: &str) -> Result<Node, IriParseError> {
        Ok(Node::Uri(UriNode::new(uri)?))
    }

    fn create_blank_node(&self) -> Node {
        Node::Blank(BlankNode::anonymous(self.scope))
    }

    fn create_blank_node_with_id(&self, id: Uuid) -> Node {
        Node::Blank(BlankNode::from_id(id))
    }

    fn create_literal_node(&self, value: &str) -> Node {
        if self.options.creates_implicitly_typed_literals {
            Node::Literal(LiteralNode::with_datatype(value, Self::string_datatype()))
        } else {
            Node::Literal(LiteralNode::new(value))
        }
    }

    fn create_literal_node_with_language(&self, value: &str, language: &str) -> Node {
        if self.options.creates_implicitly_typed_literals {
            Node::Literal(LiteralNode::with_language_and_datatype(
                value,
                language,
                Self::lang_string_datatype(),
            ))
        } else {
            Node::Literal(LiteralNode::with_language(value, language))
        }
    }

    fn create_literal_node_with_datatype(&self, value: &str, datatype: UriNode) -> Node {
        Node::Literal(LiteralNode::with_datatype(value, datatype))
    }

    fn create_variable_node(&self, name: &str) -> Node {
        Node::Variable(VariableNode::new(name))
    }

    fn create_graph_literal_node(&self, triples: Vec<Triple>) -> Node {
        Node::GraphLiteral(GraphLiteralNode::anonymous(self.scope, triples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Contract suite: these functions are generic so that any conforming
    // factory can be run through them.

    fn check_blank_node_contract<F: NodeFactory>(make: impl Fn() -> F) {
        let factory1 = make();
        let factory2 = make();

        let b = factory1.create_blank_node();
        let c = factory1.create_blank_node();
        let d = factory2.create_blank_node();
        assert_ne!(b, c);
        assert_ne!(b, d);
        assert_ne!(c, d);
        assert_eq!(b, b.clone());

        let id = Uuid::new_v4();
        let one = factory1.create_blank_node_with_id(id);
        let two = factory2.create_blank_node_with_id(id);
        assert_eq!(one, two);
    }

    fn check_uri_node_contract<F: NodeFactory>(factory: &F) {
        let a = factory.create_uri_node("http://example.org/a").unwrap();
        let b = factory.create_uri_node("http://EXAMPLE.org/a").unwrap();
        assert_eq!(a, b);
        assert!(factory.create_uri_node("no scheme here").is_err());
    }

    fn check_literal_node_contract<F: NodeFactory>(factory: &F) {
        let plain1 = factory.create_literal_node("plain literal");
        let plain2 = factory.create_literal_node("plain literal");
        let other = factory.create_literal_node("Plain Literal");
        assert_eq!(plain1, plain2);
        assert_ne!(plain1, other);

        let en = factory.create_literal_node_with_language("hello", "en");
        let en_again = factory.create_literal_node_with_language("hello", "EN");
        let en_us = factory.create_literal_node_with_language("hello", "en-US");
        assert_eq!(en, en_again);
        assert_ne!(en, en_us);
        assert_ne!(en, factory.create_literal_node("hello"));
    }

    #[test]
    fn test_simple_factory_contract() {
        check_blank_node_contract(SimpleNodeFactory::new);
        let factory = SimpleNodeFactory::new();
        check_uri_node_contract(&factory);
        check_literal_node_contract(&factory);
    }

    #[test]
    fn test_implicit_typing_flag() {
        let rdf11 = SimpleNodeFactory::new();
        let node = rdf11.create_literal_node("value");
        let literal = node.as_literal().unwrap();
        assert_eq!(literal.datatype().unwrap().as_str(), xsd::STRING);

        let tagged = rdf11.create_literal_node_with_language("value", "EN");
        let literal = tagged.as_literal().unwrap();
        assert_eq!(literal.language(), Some("en"));
        assert_eq!(literal.datatype().unwrap().as_str(), rdf::LANG_STRING);

        let classic = SimpleNodeFactory::with_options(FactoryOptions {
            creates_implicitly_typed_literals: false,
        });
        let node = classic.create_literal_node("value");
        assert!(!node.as_literal().unwrap().has_datatype());

        // nodes from the two modes differ structurally
        assert_ne!(rdf11.create_literal_node("v"), classic.create_literal_node("v"));
    }

    #[test]
    fn test_graph_literals_are_scoped() {
        let factory1 = SimpleNodeFactory::new();
        let factory2 = SimpleNodeFactory::new();
        let a = factory1.create_graph_literal_node(Vec::new());
        let b = factory2.create_graph_literal_node(Vec::new());
        assert_ne!(a, b);
    }
}
