use rdf_loom_algebra::Solution;
use rdf_loom_model::Node;
use rustc_hash::FxHashMap;

/// A lazy sequence of solutions.
pub type SolutionIter<'a> = Box<dyn Iterator<Item = Solution> + 'a>;

/// A pluggable join policy: given two solution sequences and the variables
/// they share, produce the joined sequence.
pub trait JoinStrategy {
    fn execute<'a>(
        &self,
        lhs: SolutionIter<'a>,
        rhs: SolutionIter<'a>,
        shared_variables: &[String],
    ) -> SolutionIter<'a>;
}

/// Emits the full cross product. Correct for any input, required when the
/// two sides share no variables.
#[derive(Debug, Default)]
pub struct CrossProductStrategy;

impl JoinStrategy for CrossProductStrategy {
    fn execute<'a>(
        &self,
        lhs: SolutionIter<'a>,
        rhs: SolutionIter<'a>,
        _shared_variables: &[String],
    ) -> SolutionIter<'a> {
        let right: Vec<Solution> = rhs.collect();
        Box::new(lhs.flat_map(move |left| {
            right
                .iter()
                .map(|r| left.join(r))
                .collect::<Vec<_>>()
                .into_iter()
        }))
    }
}

/// Builds a hash table over the right-hand side keyed on the shared
/// variables and probes it with the streamed left-hand side.
///
/// Rows whose shared variables are not all bound cannot be keyed; they land
/// in an overflow list and are checked by compatibility scan, preserving
/// SPARQL's unbound-joins-with-anything rule.
#[derive(Debug, Default)]
pub struct HashJoinStrategy;

fn join_key(solution: &Solution, shared: &[String]) -> Option<Vec<Node>> {
    shared
        .iter()
        .map(|variable| solution.get(variable).cloned())
        .collect()
}

impl JoinStrategy for HashJoinStrategy {
    fn execute<'a>(
        &self,
        lhs: SolutionIter<'a>,
        rhs: SolutionIter<'a>,
        shared_variables: &[String],
    ) -> SolutionIter<'a> {
        let shared: Vec<String> = shared_variables.to_vec();
        let mut keyed: FxHashMap<Vec<Node>, Vec<Solution>> = FxHashMap::default();
        let mut overflow: Vec<Solution> = Vec::new();
        for solution in rhs {
            match join_key(&solution, &shared) {
                Some(key) => keyed.entry(key).or_default().push(solution),
                None => overflow.push(solution),
            }
        }
        Box::new(lhs.flat_map(move |left| {
            let mut out: Vec<Solution> = Vec::new();
            match join_key(&left, &shared) {
                Some(key) => {
                    if let Some(bucket) = keyed.get(&key) {
                        out.extend(bucket.iter().map(|right| left.join(right)));
                    }
                    out.extend(
                        overflow
                            .iter()
                            .filter(|right| left.is_compatible(right))
                            .map(|right| left.join(right)),
                    );
                }
                None => {
                    // the probe side itself has unbound shared variables
                    out.extend(
                        keyed
                            .values()
                            .flatten()
                            .chain(overflow.iter())
                            .filter(|right| left.is_compatible(right))
                            .map(|right| left.join(right)),
                    );
                }
            }
            out.into_iter()
        }))
    }
}

/// Picks the strategy for a join: hash join when the sides share variables,
/// cross product otherwise.
pub fn select_strategy(shared_variables: &[String]) -> Box<dyn JoinStrategy> {
    if shared_variables.is_empty() {
        Box::new(CrossProductStrategy)
    } else {
        Box::new(HashJoinStrategy)
    }
}

/// The variables two algebra scopes have in common, in lhs order.
pub fn shared_variables(lhs: &[String], rhs: &[String]) -> Vec<String> {
    lhs.iter()
        .filter(|variable| rhs.contains(variable))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_loom_model::LiteralNode;

    fn literal(value: &str) -> Node {
        Node::Literal(LiteralNode::new(value))
    }

    fn solutions(values: &[(&str, &str)]) -> Vec<Solution> {
        values
            .iter()
            .map(|(variable, value)| Solution::new().bind(*variable, literal(value)))
            .collect()
    }

    fn run(
        strategy: &dyn JoinStrategy,
        lhs: Vec<Solution>,
        rhs: Vec<Solution>,
        shared: &[String],
    ) -> Vec<Solution> {
        strategy
            .execute(
                Box::new(lhs.into_iter()),
                Box::new(rhs.into_iter()),
                shared,
            )
            .collect()
    }

    #[test]
    fn test_cross_product() {
        let lhs = solutions(&[("x", "1"), ("x", "2")]);
        let rhs = solutions(&[("y", "a"), ("y", "b")]);
        let result = run(&CrossProductStrategy, lhs.clone(), rhs.clone(), &[]);
        assert_eq!(result.len(), 4);
        // reference semantics: every pairwise join, in order
        let mut expected = Vec::new();
        for left in &lhs {
            for right in &rhs {
                expected.push(left.join(right));
            }
        }
        assert_eq!(result, expected);
    }

    #[test]
    fn test_hash_join_matches_on_shared_variable() {
        let lhs = solutions(&[("x", "1"), ("x", "2"), ("x", "3")]);
        let rhs = vec![
            Solution::new().bind("x", literal("1")).bind("y", literal("a")),
            Solution::new().bind("x", literal("2")).bind("y", literal("b")),
            Solution::new().bind("x", literal("9")).bind("y", literal("c")),
        ];
        let shared = vec!["x".to_owned()];
        let result = run(&HashJoinStrategy, lhs, rhs, &shared);
        assert_eq!(result.len(), 2);
        for solution in &result {
            assert!(solution.is_bound("x"));
            assert!(solution.is_bound("y"));
        }
        assert!(result
            .iter()
            .any(|s| s.get("x") == Some(&literal("1")) && s.get("y") == Some(&literal("a"))));
        assert!(result
            .iter()
            .any(|s| s.get("x") == Some(&literal("2")) && s.get("y") == Some(&literal("b"))));
    }

    #[test]
    fn test_hash_join_unbound_shared_variable_joins_with_anything() {
        // the rhs row leaves ?x unbound, so it is compatible with every lhs row
        let lhs = solutions(&[("x", "1"), ("x", "2")]);
        let rhs = vec![Solution::new().bind("y", literal("a"))];
        let shared = vec!["x".to_owned()];
        let result = run(&HashJoinStrategy, lhs, rhs, &shared);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|s| s.is_bound("x") && s.is_bound("y")));
    }

    #[test]
    fn test_strategy_selection() {
        assert!(shared_variables(
            &["x".to_owned(), "y".to_owned()],
            &["y".to_owned(), "z".to_owned()]
        )
        .contains(&"y".to_owned()));
        assert!(shared_variables(&["x".to_owned()], &["z".to_owned()]).is_empty());
    }
}
