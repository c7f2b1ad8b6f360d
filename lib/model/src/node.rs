use crate::triple::Triple;
use crate::value::LiteralValue;
use oxiri::{Iri, IriParseError};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Controls how two literal nodes are compared for equality.
///
/// [EqualityMode::Strict] requires identical language tags, identical
/// datatypes and identical lexical values. [EqualityMode::Loose] additionally
/// treats two literals of the same recognized datatype as equal when their
/// lexical forms denote the same value (e.g. `"1"` and `"01"` as
/// `xsd:integer`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EqualityMode {
    #[default]
    Strict,
    Loose,
}

/// An absolute IRI, stored in normalized form.
///
/// Normalization lower-cases the scheme and authority, removes dot segments
/// from the path and gives authority-carrying IRIs with an empty path the
/// root path. Equality and ordering operate on the normalized string, so
/// `http://example.ORG` and `http://example.org/` compare equal while paths
/// stay case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UriNode {
    iri: String,
}

impl UriNode {
    /// Parses and normalizes an absolute IRI, failing fast on malformed input.
    pub fn new(iri: &str) -> Result<Self, IriParseError> {
        let parsed = Iri::parse(iri)?;
        Ok(Self {
            iri: normalize_iri(parsed.as_str()),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.iri
    }
}

impl fmt::Display for UriNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iri)
    }
}

// Component split of an already-validated absolute IRI (RFC 3986 section 3).
fn normalize_iri(iri: &str) -> String {
    let Some(colon) = iri.find(':') else {
        return iri.to_owned();
    };
    let scheme = &iri[..colon];
    let rest = &iri[colon + 1..];

    let (authority, rest) = match rest.strip_prefix("//") {
        Some(after) => {
            let end = after
                .find(['/', '?', '#'])
                .unwrap_or(after.len());
            (Some(&after[..end]), &after[end..])
        }
        None => (None, rest),
    };
    let path_end = rest.find(['?', '#']).unwrap_or(rest.len());
    let path = &rest[..path_end];
    let rest = &rest[path_end..];
    let (query, fragment) = match rest.split_once('#') {
        Some((before, fragment)) => (before.strip_prefix('?'), Some(fragment)),
        None => (rest.strip_prefix('?'), None),
    };

    let mut out = String::with_capacity(iri.len() + 1);
    out.push_str(&scheme.to_ascii_lowercase());
    out.push(':');
    if let Some(authority) = authority {
        out.push_str("//");
        match authority.split_once('@') {
            Some((userinfo, host_port)) => {
                out.push_str(userinfo);
                out.push('@');
                out.push_str(&host_port.to_ascii_lowercase());
            }
            None => out.push_str(&authority.to_ascii_lowercase()),
        }
    }
    let path = remove_dot_segments(path);
    if authority.is_some() && path.is_empty() {
        out.push('/');
    } else {
        out.push_str(&path);
    }
    if let Some(query) = query {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

// RFC 3986 section 5.2.4
fn remove_dot_segments(path: &str) -> String {
    let mut input = path;
    let mut output = String::with_capacity(path.len());
    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            // keep the leading slash for the next round
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") {
            input = &input[3..];
            pop_last_segment(&mut output);
        } else if input == "/.." {
            input = "/";
            pop_last_segment(&mut output);
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let start = usize::from(input.starts_with('/'));
            let end = input[start..]
                .find('/')
                .map_or(input.len(), |i| i + start);
            output.push_str(&input[..end]);
            input = &input[end..];
        }
    }
    output
}

fn pop_last_segment(output: &mut String) {
    match output.rfind('/') {
        Some(i) => output.truncate(i),
        None => output.clear(),
    }
}

/// An anonymous RDF resource.
///
/// Anonymous blank nodes carry the scope (node factory) they were minted in:
/// two anonymous blank nodes are equal only when both identifier and scope
/// match. Blank nodes constructed from a caller-supplied identifier carry no
/// scope and compare equal across factories.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlankNode {
    id: Uuid,
    scope: Option<u64>,
}

impl BlankNode {
    /// Mints a fresh anonymous blank node scoped to `scope`.
    pub fn anonymous(scope: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope: Some(scope),
        }
    }

    /// Creates a blank node with an explicit identifier, unscoped.
    pub fn from_id(id: Uuid) -> Self {
        Self { id, scope: None }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_anonymous(&self) -> bool {
        self.scope.is_some()
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.id.simple())
    }
}

/// An RDF literal: a lexical value with an optional language tag or datatype.
///
/// A literal carries a language tag XOR an explicit datatype XOR neither;
/// the node factory may additionally fill in the implicit RDF 1.1 datatypes
/// (`xsd:string` / `rdf:langString`), in which case a language tag and a
/// datatype coexist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LiteralNode {
    value: String,
    language: Option<String>,
    datatype: Option<UriNode>,
}

impl LiteralNode {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    /// Creates a language-tagged literal. Language tags are lower-cased.
    pub fn with_language(value: impl Into<String>, language: &str) -> Self {
        Self {
            value: value.into(),
            language: Some(language.to_lowercase()),
            datatype: None,
        }
    }

    pub fn with_datatype(value: impl Into<String>, datatype: UriNode) -> Self {
        Self {
            value: value.into(),
            language: None,
            datatype: Some(datatype),
        }
    }

    /// Creates a literal carrying both a language tag and a datatype, as
    /// produced by RDF 1.1 implicit typing.
    pub fn with_language_and_datatype(
        value: impl Into<String>,
        language: &str,
        datatype: UriNode,
    ) -> Self {
        Self {
            value: value.into(),
            language: Some(language.to_lowercase()),
            datatype: Some(datatype),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn datatype(&self) -> Option<&UriNode> {
        self.datatype.as_ref()
    }

    pub fn has_language(&self) -> bool {
        self.language.is_some()
    }

    pub fn has_datatype(&self) -> bool {
        self.datatype.is_some()
    }

    /// Parses the lexical form according to the (recognized) datatype.
    pub fn typed_value(&self) -> Option<LiteralValue> {
        if self.language.is_some() {
            return None;
        }
        let datatype = self.datatype.as_ref()?;
        LiteralValue::parse(&self.value, datatype.as_str())
    }

    // Ordering classification: plain < language-tagged < typed.
    fn class_rank(&self) -> u8 {
        if self.language.is_some() {
            1
        } else if self.datatype.is_some() {
            2
        } else {
            0
        }
    }
}

impl fmt::Display for LiteralNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)?;
        if let Some(language) = &self.language {
            write!(f, "@{language}")?;
        } else if let Some(datatype) = &self.datatype {
            write!(f, "^^{datatype}")?;
        }
        Ok(())
    }
}

/// A query variable. Variables occur in patterns and solutions, never in
/// stored triples.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableNode {
    name: String,
}

impl VariableNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for VariableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}

/// A quoted set of triples, scoped to its creating factory like an anonymous
/// blank node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphLiteralNode {
    id: Uuid,
    scope: Option<u64>,
    triples: Vec<Triple>,
}

impl GraphLiteralNode {
    pub fn anonymous(scope: u64, triples: Vec<Triple>) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope: Some(scope),
            triples,
        }
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl fmt::Display for GraphLiteralNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} triples}}", self.triples.len())
    }
}

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Uri(UriNode),
    Blank(BlankNode),
    Literal(LiteralNode),
    Variable(VariableNode),
    GraphLiteral(GraphLiteralNode),
}

impl Node {
    pub fn is_uri(&self) -> bool {
        matches!(self, Node::Uri(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Node::Blank(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Node::Literal(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Node::Variable(_))
    }

    pub fn as_uri(&self) -> Option<&UriNode> {
        match self {
            Node::Uri(uri) => Some(uri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&LiteralNode> {
        match self {
            Node::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn as_variable_name(&self) -> Option<&str> {
        match self {
            Node::Variable(variable) => Some(variable.name()),
            _ => None,
        }
    }

    /// Node equality under an explicit literal equality mode.
    ///
    /// [EqualityMode::Strict] is identical to `==`.
    pub fn equals_with(&self, other: &Node, mode: EqualityMode) -> bool {
        if self == other {
            return true;
        }
        if mode == EqualityMode::Strict {
            return false;
        }
        match (self, other) {
            (Node::Literal(a), Node::Literal(b)) => {
                if a.language.is_some() || b.language.is_some() {
                    return false;
                }
                match (&a.datatype, &b.datatype) {
                    (Some(da), Some(db)) if da == db => {
                        match (a.typed_value(), b.typed_value()) {
                            (Some(va), Some(vb)) => va == vb,
                            _ => false,
                        }
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Total ordering over all node kinds, used for deterministic sorting:
    /// `Variable < Blank < Uri < Literal < GraphLiteral`, with literals
    /// ordered by classification (plain, language-tagged, typed), then by
    /// datatype IRI and value.
    ///
    /// Unlike `==`, this treats value-equal typed literals with distinct
    /// lexical forms (`"1"` vs `"01"` as `xsd:integer`) as equal, which is
    /// why it is not an [Ord] implementation.
    pub fn compare(&self, other: &Node) -> Ordering {
        let rank = |n: &Node| match n {
            Node::Variable(_) => 0u8,
            Node::Blank(_) => 1,
            Node::Uri(_) => 2,
            Node::Literal(_) => 3,
            Node::GraphLiteral(_) => 4,
        };
        match (self, other) {
            (Node::Variable(a), Node::Variable(b)) => a.name.cmp(&b.name),
            (Node::Blank(a), Node::Blank(b)) => a
                .id
                .cmp(&b.id)
                .then_with(|| a.scope.cmp(&b.scope)),
            (Node::Uri(a), Node::Uri(b)) => a.iri.cmp(&b.iri),
            (Node::Literal(a), Node::Literal(b)) => compare_literals(a, b),
            (Node::GraphLiteral(a), Node::GraphLiteral(b)) => a
                .triples
                .len()
                .cmp(&b.triples.len())
                .then_with(|| a.id().cmp(&b.id())),
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }
}

fn compare_literals(a: &LiteralNode, b: &LiteralNode) -> Ordering {
    let by_class = a.class_rank().cmp(&b.class_rank());
    if by_class != Ordering::Equal {
        return by_class;
    }
    match a.class_rank() {
        // plain literals compare on the lexical value alone
        0 => a.value.cmp(&b.value),
        1 => a
            .value
            .cmp(&b.value)
            .then_with(|| a.language.cmp(&b.language)),
        _ => {
            let da = a.datatype.as_ref().map(UriNode::as_str).unwrap_or_default();
            let db = b.datatype.as_ref().map(UriNode::as_str).unwrap_or_default();
            let by_datatype = da.cmp(db);
            if by_datatype != Ordering::Equal {
                return by_datatype;
            }
            // Same datatype: compare by value when the datatype is
            // recognized, falling back to the lexical form otherwise.
            match (a.typed_value(), b.typed_value()) {
                (Some(va), Some(vb)) => va
                    .partial_cmp(&vb)
                    .unwrap_or_else(|| a.value.cmp(&b.value)),
                _ => a.value.cmp(&b.value),
            }
        }
    }
}

/// Ordering over optional nodes: an unbound value sorts before any node.
pub fn node_opt_cmp(a: Option<&Node>, b: Option<&Node>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(b),
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Uri(inner) => inner.fmt(f),
            Node::Blank(inner) => inner.fmt(f),
            Node::Literal(inner) => inner.fmt(f),
            Node::Variable(inner) => inner.fmt(f),
            Node::GraphLiteral(inner) => inner.fmt(f),
        }
    }
}

impl From<UriNode> for Node {
    fn from(node: UriNode) -> Self {
        Node::Uri(node)
    }
}

impl From<BlankNode> for Node {
    fn from(node: BlankNode) -> Self {
        Node::Blank(node)
    }
}

impl From<LiteralNode> for Node {
    fn from(node: LiteralNode) -> Self {
        Node::Literal(node)
    }
}

impl From<VariableNode> for Node {
    fn from(node: VariableNode) -> Self {
        Node::Variable(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::xsd;

    fn uri(iri: &str) -> Node {
        Node::Uri(UriNode::new(iri).unwrap())
    }

    fn typed(value: &str, datatype: &str) -> Node {
        Node::Literal(LiteralNode::with_datatype(
            value,
            UriNode::new(datatype).unwrap(),
        ))
    }

    #[test]
    fn test_uri_scheme_and_host_case_insensitive() {
        assert_eq!(uri("http://www.google.com"), uri("http://www.GOOGLE.com/"));
        assert_ne!(
            uri("http://www.google.com/#Test"),
            uri("http://www.GOOGLE.com/#test")
        );
        assert_ne!(
            uri("http://www.google.com/path/test/case"),
            uri("http://www.google.com/path/Test/case")
        );
    }

    #[test]
    fn test_uri_relative_path_normalization() {
        let j = uri("http://www.google.com/relative/test/../example.html");
        let k = uri("http://www.google.com/relative/test/monkey/../../example.html");
        let l = uri("http://www.google.com/relative/./example.html");
        assert_eq!(j, k);
        assert_eq!(k, l);
    }

    #[test]
    fn test_uri_malformed_fails_fast() {
        assert!(UriNode::new("not a uri").is_err());
        assert!(UriNode::new("relative/path").is_err());
    }

    #[test]
    fn test_blank_node_scoping() {
        let b = Node::Blank(BlankNode::anonymous(1));
        let c = Node::Blank(BlankNode::anonymous(1));
        let d = Node::Blank(BlankNode::anonymous(2));
        assert_ne!(b, c);
        assert_ne!(b, d);
        assert_eq!(b, b.clone());

        let id = Uuid::new_v4();
        let one = Node::Blank(BlankNode::from_id(id));
        let two = Node::Blank(BlankNode::from_id(id));
        assert_eq!(one, two);
    }

    #[test]
    fn test_literal_strict_equality() {
        let hello = Node::Literal(LiteralNode::new("hello"));
        let hello_en = Node::Literal(LiteralNode::with_language("hello", "en"));
        let hello_en_us = Node::Literal(LiteralNode::with_language("hello", "en-US"));
        assert_ne!(hello, hello_en);
        assert_ne!(hello_en, hello_en_us);
        assert_eq!(hello, Node::Literal(LiteralNode::new("hello")));
        assert_eq!(
            hello_en_us,
            Node::Literal(LiteralNode::with_language("hello", "EN-us"))
        );
    }

    #[test]
    fn test_typed_literal_equality_matrix() {
        let one = Node::Literal(LiteralNode::new("1"));
        let one_int = typed("1", xsd::INTEGER);
        let padded_int = typed("0001", xsd::INTEGER);

        // strict: lexical forms must match
        assert_ne!(one, one_int);
        assert_ne!(one_int, padded_int);
        assert_eq!(one_int, typed("1", xsd::INTEGER));

        // the sort comparator treats value-equal forms as equal
        assert_eq!(one_int.compare(&padded_int), Ordering::Equal);
        assert_ne!(one.compare(&one_int), Ordering::Equal);

        // loose equality parses the value space
        assert!(one_int.equals_with(&padded_int, EqualityMode::Loose));
        assert!(!one_int.equals_with(&padded_int, EqualityMode::Strict));

        // "1" is not in the recognized boolean lexical space
        let bool_true = typed("true", xsd::BOOLEAN);
        let bool_one = typed("1", xsd::BOOLEAN);
        assert!(!bool_true.equals_with(&bool_one, EqualityMode::Loose));
    }

    #[test]
    fn test_node_sort_order() {
        let blank = Node::Blank(BlankNode::anonymous(7));
        let variable = Node::Variable(VariableNode::new("x"));
        let uri_a = uri("http://test/a");
        let uri_b = uri("http://test/b");
        let plain = Node::Literal(LiteralNode::new("value"));
        let lang_en = Node::Literal(LiteralNode::with_language("value", "en"));
        let lang_es = Node::Literal(LiteralNode::with_language("value", "es"));
        let int = typed("1", xsd::INTEGER);
        let long = typed("1", xsd::LONG);

        for greater in [&uri_a, &uri_b, &plain, &lang_en, &int] {
            assert_eq!(blank.compare(greater), Ordering::Less);
            assert_eq!(greater.compare(&blank), Ordering::Greater);
        }
        assert_eq!(variable.compare(&blank), Ordering::Less);
        assert_eq!(uri_a.compare(&uri_b), Ordering::Less);
        for greater in [&plain, &lang_en, &lang_es, &int, &long] {
            assert_eq!(uri_b.compare(greater), Ordering::Less);
        }
        assert_eq!(plain.compare(&lang_en), Ordering::Less);
        assert_eq!(lang_en.compare(&lang_es), Ordering::Less);
        assert_eq!(lang_es.compare(&int), Ordering::Less);
        assert_eq!(int.compare(&long), Ordering::Less);
    }

    #[test]
    fn test_unbound_sorts_first() {
        let n = uri("http://test/a");
        assert_eq!(node_opt_cmp(None, Some(&n)), Ordering::Less);
        assert_eq!(node_opt_cmp(Some(&n), None), Ordering::Greater);
        assert_eq!(node_opt_cmp(None, None), Ordering::Equal);
    }
}
