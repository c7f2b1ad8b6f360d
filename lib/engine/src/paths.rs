use crate::context::TripleSource;
use rdf_loom_algebra::{PathExpr, Solution, TriplePath};
use rdf_loom_model::Node;
use rustc_hash::FxHashSet;

// An endpoint constraint: a concrete node or a wildcard.
type Endpoint<'a> = Option<&'a Node>;

/// Evaluates a triple path against the store as a reachability computation,
/// producing one solution per distinct endpoint pair.
pub fn evaluate_path_pattern(
    source: &dyn TripleSource,
    path: &TriplePath,
) -> Vec<Solution> {
    let start = match &path.subject {
        Node::Variable(_) => None,
        node => Some(node),
    };
    let end = match &path.object {
        Node::Variable(_) => None,
        node => Some(node),
    };
    let pairs = path_pairs(source, &path.path, start, end);

    let mut solutions = Vec::new();
    for (subject, object) in pairs {
        let mut solution = Solution::new();
        if let Some(name) = path.subject.as_variable_name() {
            solution = solution.bind(name, subject.clone());
        }
        if let Some(name) = path.object.as_variable_name() {
            // `?x path ?x` requires both endpoints to coincide
            if let Some(existing) = solution.get(name) {
                if existing != &object {
                    continue;
                }
            } else {
                solution = solution.bind(name, object.clone());
            }
        }
        if !solutions.contains(&solution) {
            solutions.push(solution);
        }
    }
    solutions
}

// The set of (start, end) node pairs connected by `path`, restricted by the
// bound endpoints.
fn path_pairs(
    source: &dyn TripleSource,
    path: &PathExpr,
    start: Endpoint<'_>,
    end: Endpoint<'_>,
) -> Vec<(Node, Node)> {
    match path {
        PathExpr::Predicate(predicate) => {
            let predicate = match predicate {
                Node::Variable(_) => None,
                node => Some(node),
            };
            source
                .find_triples(start, predicate, end)
                .map(|triple| (triple.subject.clone(), triple.object.clone()))
                .collect()
        }
        PathExpr::Inverse(inner) => path_pairs(source, inner, end, start)
            .into_iter()
            .map(|(a, b)| (b, a))
            .collect(),
        PathExpr::Sequence(first, second) => {
            let mut out = Vec::new();
            let mut seen = FxHashSet::default();
            for (a, mid) in path_pairs(source, first, start, None) {
                for (_, b) in path_pairs(source, second, Some(&mid), end) {
                    if seen.insert((a.clone(), b.clone())) {
                        out.push((a.clone(), b));
                    }
                }
            }
            out
        }
        PathExpr::Alternative(first, second) => {
            let mut out = path_pairs(source, first, start, end);
            let mut seen: FxHashSet<(Node, Node)> = out.iter().cloned().collect();
            for pair in path_pairs(source, second, start, end) {
                if seen.insert(pair.clone()) {
                    out.push(pair);
                }
            }
            out
        }
        PathExpr::ZeroOrOne(inner) => {
            let mut out = zero_length_pairs(source, start, end);
            let mut seen: FxHashSet<(Node, Node)> = out.iter().cloned().collect();
            for pair in path_pairs(source, inner, start, end) {
                if seen.insert(pair.clone()) {
                    out.push(pair);
                }
            }
            out
        }
        PathExpr::ZeroOrMore(inner) => closure_pairs(source, inner, start, end, true),
        PathExpr::OneOrMore(inner) => closure_pairs(source, inner, start, end, false),
        PathExpr::NegatedPropertySet(excluded) => source
            .find_triples(start, None, end)
            .filter(|triple| !excluded.contains(&triple.predicate))
            .map(|triple| (triple.subject.clone(), triple.object.clone()))
            .collect(),
    }
}

// Pairs connecting a node to itself, for the zero-length part of `?` / `*`.
fn zero_length_pairs(
    source: &dyn TripleSource,
    start: Endpoint<'_>,
    end: Endpoint<'_>,
) -> Vec<(Node, Node)> {
    match (start, end) {
        (Some(s), Some(e)) => {
            if s == e {
                vec![(s.clone(), e.clone())]
            } else {
                Vec::new()
            }
        }
        (Some(s), None) => vec![(s.clone(), s.clone())],
        (None, Some(e)) => vec![(e.clone(), e.clone())],
        (None, None) => source
            .terms()
            .into_iter()
            .map(|term| (term.clone(), term))
            .collect(),
    }
}

// Transitive closure by breadth-first expansion of single path steps.
fn closure_pairs(
    source: &dyn TripleSource,
    inner: &PathExpr,
    start: Endpoint<'_>,
    end: Endpoint<'_>,
    include_zero: bool,
) -> Vec<(Node, Node)> {
    let origins: Vec<Node> = match start {
        Some(node) => vec![node.clone()],
        None => {
            if let Some(end) = end {
                // anchor on the bound object by walking the inverse path
                let inverse = PathExpr::Inverse(Box::new(inner.clone()));
                return closure_pairs(source, &inverse, Some(end), None, include_zero)
                    .into_iter()
                    .map(|(a, b)| (b, a))
                    .collect();
            }
            source.terms()
        }
    };

    let mut out = Vec::new();
    let mut seen = FxHashSet::default();
    for origin in origins {
        let mut reached: FxHashSet<Node> = FxHashSet::default();
        let mut frontier = vec![origin.clone()];
        if include_zero {
            reached.insert(origin.clone());
        }
        while let Some(node) = frontier.pop() {
            for (_, next) in path_pairs(source, inner, Some(&node), None) {
                if reached.insert(next.clone()) {
                    frontier.push(next);
                }
            }
        }
        for target in reached {
            if let Some(end) = end {
                if &target != end {
                    continue;
                }
            }
            if seen.insert((origin.clone(), target.clone())) {
                out.push((origin.clone(), target));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_loom_model::{Triple, UriNode, VariableNode};
    use rdf_loom_storage::TripleIndexSet;

    fn uri(iri: &str) -> Node {
        Node::Uri(UriNode::new(iri).unwrap())
    }

    fn var(name: &str) -> Node {
        Node::Variable(VariableNode::new(name))
    }

    fn knows() -> Node {
        uri("http://test/knows")
    }

    // a -> b -> c, plus d -> d (self loop)
    fn chain() -> TripleIndexSet {
        TripleIndexSet::from_triples([
            Triple::new(uri("http://test/a"), knows(), uri("http://test/b")),
            Triple::new(uri("http://test/b"), knows(), uri("http://test/c")),
            Triple::new(uri("http://test/d"), knows(), uri("http://test/d")),
        ])
    }

    #[test]
    fn test_predicate_path() {
        let source = chain();
        let path = TriplePath::new(var("s"), PathExpr::Predicate(knows()), var("o"));
        let solutions = evaluate_path_pattern(&source, &path);
        assert_eq!(solutions.len(), 3);
    }

    #[test]
    fn test_inverse_path() {
        let source = chain();
        let path = TriplePath::new(
            uri("http://test/b"),
            PathExpr::Inverse(Box::new(PathExpr::Predicate(knows()))),
            var("o"),
        );
        let solutions = evaluate_path_pattern(&source, &path);
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].get("o"), Some(&uri("http://test/a")));
    }

    #[test]
    fn test_sequence_path() {
        let source = chain();
        let path = TriplePath::new(
            var("s"),
            PathExpr::Sequence(
                Box::new(PathExpr::Predicate(knows())),
                Box::new(PathExpr::Predicate(knows())),
            ),
            var("o"),
        );
        let solutions = evaluate_path_pattern(&source, &path);
        // a -knows/knows-> c and d -knows/knows-> d
        assert_eq!(solutions.len(), 2);
        assert!(solutions.iter().any(|s| {
            s.get("s") == Some(&uri("http://test/a"))
                && s.get("o") == Some(&uri("http://test/c"))
        }));
    }

    #[test]
    fn test_one_or_more_from_bound_subject() {
        let source = chain();
        let path = TriplePath::new(
            uri("http://test/a"),
            PathExpr::OneOrMore(Box::new(PathExpr::Predicate(knows()))),
            var("o"),
        );
        let mut reached: Vec<Node> = evaluate_path_pattern(&source, &path)
            .into_iter()
            .filter_map(|s| s.get("o").cloned())
            .collect();
        reached.sort_by(|a, b| a.compare(b));
        assert_eq!(reached, vec![uri("http://test/b"), uri("http://test/c")]);
    }

    #[test]
    fn test_zero_or_more_includes_origin() {
        let source = chain();
        let path = TriplePath::new(
            uri("http://test/a"),
            PathExpr::ZeroOrMore(Box::new(PathExpr::Predicate(knows()))),
            var("o"),
        );
        let reached: Vec<Solution> = evaluate_path_pattern(&source, &path);
        assert_eq!(reached.len(), 3);
        assert!(reached
            .iter()
            .any(|s| s.get("o") == Some(&uri("http://test/a"))));
    }

    #[test]
    fn test_zero_or_more_with_bound_object() {
        let source = chain();
        let path = TriplePath::new(
            var("s"),
            PathExpr::ZeroOrMore(Box::new(PathExpr::Predicate(knows()))),
            uri("http://test/c"),
        );
        let solutions = evaluate_path_pattern(&source, &path);
        let mut subjects: Vec<Node> = solutions
            .into_iter()
            .filter_map(|s| s.get("s").cloned())
            .collect();
        subjects.sort_by(|a, b| a.compare(b));
        assert_eq!(
            subjects,
            vec![
                uri("http://test/a"),
                uri("http://test/b"),
                uri("http://test/c")
            ]
        );
    }

    #[test]
    fn test_zero_or_one() {
        let source = chain();
        let path = TriplePath::new(
            uri("http://test/a"),
            PathExpr::ZeroOrOne(Box::new(PathExpr::Predicate(knows()))),
            var("o"),
        );
        let solutions = evaluate_path_pattern(&source, &path);
        // a itself plus the single step to b
        assert_eq!(solutions.len(), 2);
    }

    #[test]
    fn test_negated_property_set() {
        let mut source = chain();
        source.add(Triple::new(
            uri("http://test/a"),
            uri("http://test/likes"),
            uri("http://test/c"),
        ));
        let path = TriplePath::new(
            uri("http://test/a"),
            PathExpr::NegatedPropertySet(vec![knows()]),
            var("o"),
        );
        let solutions = evaluate_path_pattern(&source, &path);
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].get("o"), Some(&uri("http://test/c")));
    }

    #[test]
    fn test_alternative_path() {
        let mut source = chain();
        source.add(Triple::new(
            uri("http://test/a"),
            uri("http://test/likes"),
            uri("http://test/c"),
        ));
        let path = TriplePath::new(
            uri("http://test/a"),
            PathExpr::Alternative(
                Box::new(PathExpr::Predicate(knows())),
                Box::new(PathExpr::Predicate(uri("http://test/likes"))),
            ),
            var("o"),
        );
        let solutions = evaluate_path_pattern(&source, &path);
        assert_eq!(solutions.len(), 2);
    }

    #[test]
    fn test_fully_bound_path_yields_empty_solution_row() {
        let source = chain();
        let path = TriplePath::new(
            uri("http://test/a"),
            PathExpr::OneOrMore(Box::new(PathExpr::Predicate(knows()))),
            uri("http://test/c"),
        );
        let solutions = evaluate_path_pattern(&source, &path);
        assert_eq!(solutions.len(), 1);
        assert!(solutions[0].is_empty());
    }
}
