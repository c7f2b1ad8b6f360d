use crate::aggregates::run_aggregate;
use crate::context::ExecutionContext;
use crate::error::QueryEvaluationError;
use crate::expr::{effective_boolean_value, evaluate_expression};
use crate::joins::{select_strategy, shared_variables, SolutionIter};
use crate::paths::evaluate_path_pattern;
use rdf_loom_algebra::{Algebra, Expression, Solution, Table};
use rdf_loom_common::{BoundedList, OverflowPolicy};
use rdf_loom_model::{node_opt_cmp, Node, Triple};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;

// How many solutions REDUCED remembers for best-effort deduplication.
const REDUCED_WINDOW: usize = 128;

/// Evaluates an algebra tree against an execution context, producing a lazy
/// solution sequence.
///
/// Errors returned here abort the query (currently only `SERVICE` failures);
/// all expression-level failures stay row-scoped inside the iterators.
pub fn evaluate<'a>(
    algebra: &'a Algebra,
    ctx: ExecutionContext<'a>,
) -> Result<SolutionIter<'a>, QueryEvaluationError> {
    match algebra {
        Algebra::Table(Table::Unit) => Ok(Box::new(std::iter::once(Solution::new()))),
        Algebra::Table(Table::Empty) => Ok(Box::new(std::iter::empty())),
        Algebra::Table(Table::Data(data)) => {
            Ok(Box::new(data.rows.clone().into_iter()))
        }

        Algebra::Bgp(patterns) => {
            let mut iter: SolutionIter<'a> =
                Box::new(std::iter::once(Solution::new()));
            for pattern in patterns {
                let source = ctx.source;
                iter = Box::new(iter.flat_map(move |solution| {
                    let subject = resolve(&pattern.subject, &solution);
                    let predicate = resolve(&pattern.predicate, &solution);
                    let object = resolve(&pattern.object, &solution);
                    let matches: Vec<Triple> = source
                        .find_triples(
                            subject.as_ref(),
                            predicate.as_ref(),
                            object.as_ref(),
                        )
                        .cloned()
                        .collect();
                    matches.into_iter().filter_map(move |triple| {
                        extend_with_triple(pattern, &solution, &triple)
                    })
                }));
            }
            Ok(iter)
        }

        Algebra::Join { lhs, rhs } => {
            let left = evaluate(lhs, ctx)?;
            let right = evaluate(rhs, ctx)?;
            let shared =
                shared_variables(&lhs.in_scope_variables(), &rhs.in_scope_variables());
            Ok(select_strategy(&shared).execute(left, right, &shared))
        }

        Algebra::LeftJoin { lhs, rhs } => {
            let right: Vec<Solution> = evaluate(rhs, ctx)?.collect();
            let left = evaluate(lhs, ctx)?;
            Ok(Box::new(left.flat_map(move |l| {
                let joined: Vec<Solution> = right
                    .iter()
                    .filter(|r| l.is_compatible(r))
                    .map(|r| l.join(r))
                    .collect();
                if joined.is_empty() {
                    vec![l].into_iter()
                } else {
                    joined.into_iter()
                }
            })))
        }

        Algebra::Union { lhs, rhs } => {
            let left = evaluate(lhs, ctx)?;
            let right = evaluate(rhs, ctx)?;
            Ok(Box::new(left.chain(right)))
        }

        Algebra::Minus { lhs, rhs } => {
            let right: Vec<Solution> = evaluate(rhs, ctx)?.collect();
            let left = evaluate(lhs, ctx)?;
            // a right row only removes when it shares at least one bound
            // variable with the left row and agrees on all of them
            Ok(Box::new(left.filter(move |l| {
                !right
                    .iter()
                    .any(|r| l.is_compatible(r) && l.shares_variable_with(r))
            })))
        }

        Algebra::Filter { expressions, inner } => {
            let inner = evaluate(inner, ctx)?;
            Ok(Box::new(inner.filter(move |solution| {
                expressions.iter().all(|expression| {
                    evaluate_expression(expression, solution)
                        .and_then(|value| effective_boolean_value(&value))
                        .unwrap_or(false)
                })
            })))
        }

        Algebra::Extend { assignments, inner } => {
            let inner = evaluate(inner, ctx)?;
            Ok(Box::new(inner.filter_map(move |solution| {
                let mut result = solution;
                for (name, expression) in assignments {
                    match evaluate_expression(expression, &result) {
                        Ok(value) => match result.get(name) {
                            Some(existing) if existing != &value => return None,
                            Some(_) => {}
                            None => result = result.bind(name.clone(), value),
                        },
                        Err(_) => return None,
                    }
                }
                Some(result)
            })))
        }

        Algebra::GroupBy {
            group_expressions,
            aggregators,
            inner,
        } => {
            let rows: Vec<Solution> = evaluate(inner, ctx)?.collect();
            let mut order: Vec<Vec<Option<Node>>> = Vec::new();
            let mut groups: FxHashMap<Vec<Option<Node>>, Vec<Solution>> =
                FxHashMap::default();
            for row in rows {
                let key: Vec<Option<Node>> = group_expressions
                    .iter()
                    .map(|(expression, _)| evaluate_expression(expression, &row).ok())
                    .collect();
                if !groups.contains_key(&key) {
                    order.push(key.clone());
                }
                groups.entry(key).or_default().push(row);
            }
            // no group expressions: a single implicit group, present even
            // over zero input rows
            if order.is_empty() && group_expressions.is_empty() {
                order.push(Vec::new());
                groups.insert(Vec::new(), Vec::new());
            }

            let mut out = Vec::new();
            for key in order {
                let members = &groups[&key];
                let mut solution = Solution::new();
                for ((expression, name), value) in
                    group_expressions.iter().zip(key.iter())
                {
                    if let Some(value) = value {
                        let target = name.clone().or_else(|| match expression {
                            Expression::Variable(variable) => Some(variable.clone()),
                            _ => None,
                        });
                        if let Some(target) = target {
                            solution = solution.bind(target, value.clone());
                        }
                    }
                }
                for (aggregate, slot) in aggregators {
                    if let Some(value) = run_aggregate(aggregate, members) {
                        solution = solution.bind(slot.clone(), value);
                    }
                }
                out.push(solution);
            }
            Ok(Box::new(out.into_iter()))
        }

        Algebra::Distinct { inner } => {
            let inner = evaluate(inner, ctx)?;
            let mut seen: FxHashSet<Solution> = FxHashSet::default();
            Ok(Box::new(
                inner.filter(move |solution| seen.insert(solution.clone())),
            ))
        }

        Algebra::Reduced { inner } => {
            let inner = evaluate(inner, ctx)?;
            let mut window = BoundedList::new(REDUCED_WINDOW, OverflowPolicy::Discard);
            Ok(Box::new(inner.filter(move |solution| {
                if window.contains(solution) {
                    return false;
                }
                let _ = window.push(solution.clone());
                true
            })))
        }

        Algebra::Slice {
            limit,
            offset,
            inner,
        } => {
            let inner = evaluate(inner, ctx)?
                .skip(usize::try_from(*offset).unwrap_or(0));
            if *limit >= 0 {
                Ok(Box::new(inner.take(usize::try_from(*limit).unwrap_or(0))))
            } else {
                Ok(Box::new(inner))
            }
        }

        Algebra::Project { variables, inner } => {
            let inner = evaluate(inner, ctx)?;
            Ok(Box::new(
                inner.map(move |solution| solution.project(variables)),
            ))
        }

        Algebra::OrderBy { conditions, inner } => {
            let mut rows: Vec<Solution> = evaluate(inner, ctx)?.collect();
            rows.sort_by(|a, b| {
                for condition in conditions {
                    let va = evaluate_expression(&condition.expression, a).ok();
                    let vb = evaluate_expression(&condition.expression, b).ok();
                    let mut ordering = node_opt_cmp(va.as_ref(), vb.as_ref());
                    if !condition.ascending {
                        ordering = ordering.reverse();
                    }
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
            Ok(Box::new(rows.into_iter()))
        }

        Algebra::PropertyPath { path, inner } => {
            let path_solutions = evaluate_path_pattern(ctx.source, path);
            let inner_iter = evaluate(inner, ctx)?;
            let path_variables: Vec<String> = path
                .variables()
                .into_iter()
                .map(str::to_owned)
                .collect();
            let shared =
                shared_variables(&inner.in_scope_variables(), &path_variables);
            Ok(select_strategy(&shared).execute(
                inner_iter,
                Box::new(path_solutions.into_iter()),
                &shared,
            ))
        }

        Algebra::Service {
            endpoint,
            silent,
            inner,
        } => match ctx.service_executor {
            Some(executor) => match executor.execute(endpoint, inner) {
                Ok(solutions) => Ok(Box::new(solutions.into_iter())),
                Err(_) if *silent => Ok(Box::new(std::iter::empty())),
                Err(error) => Err(error),
            },
            None if *silent => Ok(Box::new(std::iter::empty())),
            None => Err(QueryEvaluationError::ServiceUnavailable(endpoint.clone())),
        },
    }
}

fn resolve(node: &Node, solution: &Solution) -> Option<Node> {
    match node {
        Node::Variable(variable) => solution.get(variable.name()).cloned(),
        other => Some(other.clone()),
    }
}

// Merges a matched triple into the solution, binding the pattern's variables
// and rejecting conflicting repeated variables.
fn extend_with_triple(
    pattern: &Triple,
    solution: &Solution,
    triple: &Triple,
) -> Option<Solution> {
    let mut result = solution.clone();
    for (pattern_node, value) in [
        (&pattern.subject, &triple.subject),
        (&pattern.predicate, &triple.predicate),
        (&pattern.object, &triple.object),
    ] {
        if let Some(name) = pattern_node.as_variable_name() {
            match result.get(name) {
                Some(existing) if existing != value => return None,
                Some(_) => {}
                None => result = result.bind(name, value.clone()),
            }
        } else if pattern_node != value {
            return None;
        }
    }
    Some(result)
}
