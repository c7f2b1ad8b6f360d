use rdf_loom_model::UriNode;
use rustc_hash::FxHashMap;

/// The prefix-to-namespace map attached to a graph.
///
/// Prefix resolution and QName expansion belong to the parsing layer; the
/// graph only stores the mapping.
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    namespaces: FxHashMap<String, UriNode>,
}

impl NamespaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a prefix mapping. The empty string is a valid prefix.
    pub fn add_namespace(&mut self, prefix: impl Into<String>, uri: UriNode) {
        self.namespaces.insert(prefix.into(), uri);
    }

    pub fn remove_namespace(&mut self, prefix: &str) -> bool {
        self.namespaces.remove(prefix).is_some()
    }

    pub fn has_namespace(&self, prefix: &str) -> bool {
        self.namespaces.contains_key(prefix)
    }

    pub fn get_namespace_uri(&self, prefix: &str) -> Option<&UriNode> {
        self.namespaces.get(prefix)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
