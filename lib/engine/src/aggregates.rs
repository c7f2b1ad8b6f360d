use crate::expr::evaluate_expression;
use itertools::Itertools;
use rdf_loom_algebra::{Aggregate, Expression, Solution};
use rdf_loom_model::vocab::xsd;
use rdf_loom_model::{LiteralNode, Node, NumericValue, UriNode};

fn integer_node(value: i64) -> Node {
    let datatype = UriNode::new(xsd::INTEGER)
        .unwrap_or_else(|_| unreachable!("vocabulary IRIs are well-formed"));
    Node::Literal(LiteralNode::with_datatype(value.to_string(), datatype))
}

// Evaluates the aggregate's expression over every row, keeping only
// successful evaluations; `distinct` drops repeated values.
fn evaluate_values(
    expression: &Expression,
    rows: &[Solution],
    distinct: bool,
) -> Vec<Node> {
    let values = rows
        .iter()
        .filter_map(|row| evaluate_expression(expression, row).ok());
    if distinct {
        values.unique().collect()
    } else {
        values.collect()
    }
}

/// Computes an aggregate over the rows of one group.
///
/// Zero-row behavior: the counting aggregates yield `0`, every other
/// aggregate yields [None], leaving its slot variable unbound.
pub fn run_aggregate(aggregate: &Aggregate, rows: &[Solution]) -> Option<Node> {
    match aggregate {
        Aggregate::CountAll { distinct } => {
            let count = if *distinct {
                rows.iter().unique().count()
            } else {
                rows.len()
            };
            Some(integer_node(count as i64))
        }
        Aggregate::Count {
            expression,
            distinct,
        } => {
            let values = evaluate_values(expression, rows, *distinct);
            Some(integer_node(values.len() as i64))
        }
        Aggregate::Sum {
            expression,
            distinct,
        } => {
            let values = evaluate_values(expression, rows, *distinct);
            sum(&values).map(NumericValue::into_node)
        }
        Aggregate::Avg {
            expression,
            distinct,
        } => {
            let values = evaluate_values(expression, rows, *distinct);
            let total = sum(&values)?;
            let count = NumericValue::Integer((values.len() as i64).into());
            total.checked_div(count).ok().map(NumericValue::into_node)
        }
        Aggregate::Min { expression } => {
            let values = evaluate_values(expression, rows, false);
            values
                .into_iter()
                .reduce(|a, b| if b.compare(&a).is_lt() { b } else { a })
        }
        Aggregate::Max { expression } => {
            let values = evaluate_values(expression, rows, false);
            values
                .into_iter()
                .reduce(|a, b| if b.compare(&a).is_gt() { b } else { a })
        }
        Aggregate::Sample { expression } => {
            evaluate_values(expression, rows, false).into_iter().next()
        }
        Aggregate::GroupConcat {
            expression,
            separator,
            distinct,
        } => {
            let values = evaluate_values(expression, rows, *distinct);
            if values.is_empty() {
                return None;
            }
            let separator = separator.as_deref().unwrap_or(" ");
            let concatenated = values
                .iter()
                .filter_map(|node| match node {
                    Node::Literal(literal) => Some(literal.value().to_owned()),
                    Node::Uri(uri) => Some(uri.as_str().to_owned()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(separator);
            Some(Node::Literal(LiteralNode::new(concatenated)))
        }
    }
}

// The numeric sum of the values; [None] when empty or any value is
// non-numeric.
fn sum(values: &[Node]) -> Option<NumericValue> {
    let mut iter = values.iter();
    let mut total = NumericValue::from_node(iter.next()?)?;
    for value in iter {
        let value = NumericValue::from_node(value)?;
        total = total.checked_add(value).ok()?;
    }
    Some(total)
}
