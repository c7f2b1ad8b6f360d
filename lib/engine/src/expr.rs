use md5::{Digest, Md5};
use rdf_loom_algebra::{Expression, HashKind, Solution};
use rdf_loom_model::vocab::{rdf, xsd};
use rdf_loom_model::{
    LiteralNode, Node, NumericValue, ThinError, ThinOptionExt, ThinResult, UriNode,
};
use regex::Regex;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use std::cmp::Ordering;

fn datatype(iri: &str) -> UriNode {
    UriNode::new(iri).unwrap_or_else(|_| unreachable!("vocabulary IRIs are well-formed"))
}

fn boolean_node(value: bool) -> Node {
    Node::Literal(LiteralNode::with_datatype(
        if value { "true" } else { "false" },
        datatype(xsd::BOOLEAN),
    ))
}

fn integer_node(value: i64) -> Node {
    Node::Literal(LiteralNode::with_datatype(
        value.to_string(),
        datatype(xsd::INTEGER),
    ))
}

fn simple_literal(value: impl Into<String>) -> Node {
    Node::Literal(LiteralNode::new(value))
}

/// SPARQL effective boolean value.
pub fn effective_boolean_value(node: &Node) -> ThinResult<bool> {
    let literal = node.as_literal().ok_or(ThinError::default())?;
    if let Some(dt) = literal.datatype() {
        if dt.as_str() == xsd::BOOLEAN {
            return match literal.value() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => ThinError::expected(),
            };
        }
    }
    if let Some(numeric) = NumericValue::from_node(node) {
        let value = numeric.as_f64();
        return Ok(value != 0.0 && !value.is_nan());
    }
    let plain = !literal.has_datatype() && !literal.has_language();
    let stringish = literal
        .datatype()
        .is_some_and(|dt| dt.as_str() == xsd::STRING)
        || literal.has_language();
    if plain || stringish {
        return Ok(!literal.value().is_empty());
    }
    ThinError::expected()
}

// STR semantics: the lexical form of a literal or the text of a URI.
fn string_value(node: &Node) -> ThinResult<String> {
    match node {
        Node::Literal(literal) => Ok(literal.value().to_owned()),
        Node::Uri(uri) => Ok(uri.as_str().to_owned()),
        _ => ThinError::expected(),
    }
}

// A literal usable by the string functions, with the tag information needed
// to rebuild a result literal of the same kind.
fn string_literal(node: &Node) -> ThinResult<(String, Option<String>, bool)> {
    let literal = node.as_literal().ok_or(ThinError::default())?;
    let string_typed = literal
        .datatype()
        .is_some_and(|dt| dt.as_str() == xsd::STRING);
    if literal.has_language() || string_typed || !literal.has_datatype() {
        Ok((
            literal.value().to_owned(),
            literal.language().map(str::to_owned),
            string_typed,
        ))
    } else {
        ThinError::expected()
    }
}

fn rebuild_string_literal(value: String, language: Option<&str>, string_typed: bool) -> Node {
    match language {
        Some(language) => Node::Literal(LiteralNode::with_language_and_datatype(
            value,
            language,
            datatype(rdf::LANG_STRING),
        )),
        None if string_typed => {
            Node::Literal(LiteralNode::with_datatype(value, datatype(xsd::STRING)))
        }
        None => simple_literal(value),
    }
}

fn numeric(node: &Node) -> ThinResult<NumericValue> {
    NumericValue::from_node(node).ok_or_thin()
}

/// SPARQL `=`: numeric comparison when both sides are numeric, value
/// comparison for recognized typed literals, term equality otherwise.
pub fn node_equals(a: &Node, b: &Node) -> ThinResult<bool> {
    if let (Some(x), Some(y)) = (NumericValue::from_node(a), NumericValue::from_node(b)) {
        return Ok(x.is_equal(&y));
    }
    if a == b {
        return Ok(true);
    }
    if let (Some(la), Some(lb)) = (a.as_literal(), b.as_literal()) {
        if la.language() == lb.language() {
            if let (Some(va), Some(vb)) = (la.typed_value(), lb.typed_value()) {
                return Ok(va == vb);
            }
        }
    }
    Ok(false)
}

/// Value comparison for the ordering operators.
pub fn value_compare(a: &Node, b: &Node) -> ThinResult<Ordering> {
    if let (Some(x), Some(y)) = (NumericValue::from_node(a), NumericValue::from_node(b)) {
        return x.compare(&y).ok_or_thin();
    }
    let (Some(la), Some(lb)) = (a.as_literal(), b.as_literal()) else {
        return ThinError::expected();
    };
    let stringish = |l: &LiteralNode| {
        !l.has_language()
            && (!l.has_datatype()
                || l.datatype().is_some_and(|dt| dt.as_str() == xsd::STRING))
    };
    if stringish(la) && stringish(lb) {
        return Ok(la.value().cmp(lb.value()));
    }
    match (la.typed_value(), lb.typed_value()) {
        (Some(va), Some(vb)) => va.partial_cmp(&vb).ok_or_thin(),
        _ => ThinError::expected(),
    }
}

fn hash_hex(kind: HashKind, input: &str) -> String {
    let bytes = input.as_bytes();
    match kind {
        HashKind::Md5 => hex::encode(Md5::digest(bytes)),
        HashKind::Sha1 => hex::encode(Sha1::digest(bytes)),
        HashKind::Sha256 => hex::encode(Sha256::digest(bytes)),
        HashKind::Sha512 => hex::encode(Sha512::digest(bytes)),
    }
}

/// Evaluates a scalar expression against a solution's bindings.
///
/// Every failure is a [ThinError]; the caller decides what exclusion means
/// (dropping the row in FILTER/BIND contexts).
pub fn evaluate_expression(
    expression: &Expression,
    solution: &Solution,
) -> ThinResult<Node> {
    match expression {
        Expression::Constant(node) => Ok(node.clone()),
        Expression::Variable(name) => solution.get(name).cloned().ok_or_thin(),
        Expression::Bound(name) => Ok(boolean_node(solution.is_bound(name))),

        Expression::And(a, b) => {
            let a = evaluate_expression(a, solution).and_then(|n| effective_boolean_value(&n));
            let b = evaluate_expression(b, solution).and_then(|n| effective_boolean_value(&n));
            match (a, b) {
                (Ok(false), _) | (_, Ok(false)) => Ok(boolean_node(false)),
                (Ok(true), Ok(true)) => Ok(boolean_node(true)),
                _ => ThinError::expected(),
            }
        }
        Expression::Or(a, b) => {
            let a = evaluate_expression(a, solution).and_then(|n| effective_boolean_value(&n));
            let b = evaluate_expression(b, solution).and_then(|n| effective_boolean_value(&n));
            match (a, b) {
                (Ok(true), _) | (_, Ok(true)) => Ok(boolean_node(true)),
                (Ok(false), Ok(false)) => Ok(boolean_node(false)),
                _ => ThinError::expected(),
            }
        }
        Expression::Not(inner) => {
            let value = effective_boolean_value(&evaluate_expression(inner, solution)?)?;
            Ok(boolean_node(!value))
        }

        Expression::Add(a, b) => arithmetic(a, b, solution, NumericValue::checked_add),
        Expression::Subtract(a, b) => arithmetic(a, b, solution, NumericValue::checked_sub),
        Expression::Multiply(a, b) => arithmetic(a, b, solution, NumericValue::checked_mul),
        Expression::Divide(a, b) => arithmetic(a, b, solution, NumericValue::checked_div),
        Expression::UnaryMinus(inner) => {
            let value = numeric(&evaluate_expression(inner, solution)?)?;
            let zero = NumericValue::Integer(0i64.into());
            Ok(zero.checked_sub(value)?.into_node())
        }

        Expression::Equals(a, b) => {
            let a = evaluate_expression(a, solution)?;
            let b = evaluate_expression(b, solution)?;
            Ok(boolean_node(node_equals(&a, &b)?))
        }
        Expression::NotEquals(a, b) => {
            let a = evaluate_expression(a, solution)?;
            let b = evaluate_expression(b, solution)?;
            Ok(boolean_node(!node_equals(&a, &b)?))
        }
        Expression::GreaterThan(a, b) => comparison(a, b, solution, Ordering::is_gt),
        Expression::GreaterThanOrEqual(a, b) => comparison(a, b, solution, Ordering::is_ge),
        Expression::LessThan(a, b) => comparison(a, b, solution, Ordering::is_lt),
        Expression::LessThanOrEqual(a, b) => comparison(a, b, solution, Ordering::is_le),

        Expression::SameTerm(a, b) => {
            let a = evaluate_expression(a, solution)?;
            let b = evaluate_expression(b, solution)?;
            Ok(boolean_node(a == b))
        }
        Expression::If(condition, then_branch, else_branch) => {
            let condition =
                effective_boolean_value(&evaluate_expression(condition, solution)?)?;
            if condition {
                evaluate_expression(then_branch, solution)
            } else {
                evaluate_expression(else_branch, solution)
            }
        }
        Expression::Coalesce(items) => {
            for item in items {
                if let Ok(value) = evaluate_expression(item, solution) {
                    return Ok(value);
                }
            }
            ThinError::expected()
        }

        Expression::Str(inner) => {
            let value = string_value(&evaluate_expression(inner, solution)?)?;
            Ok(simple_literal(value))
        }
        Expression::Lang(inner) => {
            let node = evaluate_expression(inner, solution)?;
            let literal = node.as_literal().ok_or(ThinError::default())?;
            Ok(simple_literal(literal.language().unwrap_or_default()))
        }
        Expression::Datatype(inner) => {
            let node = evaluate_expression(inner, solution)?;
            let literal = node.as_literal().ok_or(ThinError::default())?;
            if let Some(dt) = literal.datatype() {
                Ok(Node::Uri(dt.clone()))
            } else if literal.has_language() {
                Ok(Node::Uri(datatype(rdf::LANG_STRING)))
            } else {
                Ok(Node::Uri(datatype(xsd::STRING)))
            }
        }
        Expression::IsUri(inner) => {
            Ok(boolean_node(evaluate_expression(inner, solution)?.is_uri()))
        }
        Expression::IsBlank(inner) => Ok(boolean_node(
            evaluate_expression(inner, solution)?.is_blank(),
        )),
        Expression::IsLiteral(inner) => Ok(boolean_node(
            evaluate_expression(inner, solution)?.is_literal(),
        )),
        Expression::IsNumeric(inner) => Ok(boolean_node(
            NumericValue::from_node(&evaluate_expression(inner, solution)?).is_some(),
        )),

        Expression::StrLen(inner) => {
            let (value, _, _) = string_literal(&evaluate_expression(inner, solution)?)?;
            Ok(integer_node(value.chars().count() as i64))
        }
        Expression::UCase(inner) => {
            let (value, language, string_typed) =
                string_literal(&evaluate_expression(inner, solution)?)?;
            Ok(rebuild_string_literal(
                value.to_uppercase(),
                language.as_deref(),
                string_typed,
            ))
        }
        Expression::LCase(inner) => {
            let (value, language, string_typed) =
                string_literal(&evaluate_expression(inner, solution)?)?;
            Ok(rebuild_string_literal(
                value.to_lowercase(),
                language.as_deref(),
                string_typed,
            ))
        }
        Expression::Concat(items) => {
            let mut out = String::new();
            for item in items {
                let (value, _, _) = string_literal(&evaluate_expression(item, solution)?)?;
                out.push_str(&value);
            }
            Ok(simple_literal(out))
        }
        Expression::Contains(a, b) => string_predicate(a, b, solution, |x, y| x.contains(y)),
        Expression::StrStarts(a, b) => {
            string_predicate(a, b, solution, |x, y| x.starts_with(y))
        }
        Expression::StrEnds(a, b) => {
            string_predicate(a, b, solution, |x, y| x.ends_with(y))
        }
        Expression::Regex {
            text,
            pattern,
            flags,
        } => {
            let (value, _, _) = string_literal(&evaluate_expression(text, solution)?)?;
            let (pattern, _, _) =
                string_literal(&evaluate_expression(pattern, solution)?)?;
            let pattern = match flags {
                Some(flags) if !flags.is_empty() => format!("(?{flags}){pattern}"),
                _ => pattern,
            };
            let regex = Regex::new(&pattern).map_err(|_| ThinError::default())?;
            Ok(boolean_node(regex.is_match(&value)))
        }
        Expression::Hash { kind, inner } => {
            let value = string_value(&evaluate_expression(inner, solution)?)?;
            Ok(simple_literal(hash_hex(*kind, &value)))
        }

        // Aggregates are compiled into group-by slots; a bare aggregate in
        // scalar position cannot be evaluated against a single row.
        Expression::Aggregate(_) => ThinError::expected(),
    }
}

fn arithmetic(
    a: &Expression,
    b: &Expression,
    solution: &Solution,
    op: impl Fn(NumericValue, NumericValue) -> ThinResult<NumericValue>,
) -> ThinResult<Node> {
    let a = numeric(&evaluate_expression(a, solution)?)?;
    let b = numeric(&evaluate_expression(b, solution)?)?;
    Ok(op(a, b)?.into_node())
}

fn comparison(
    a: &Expression,
    b: &Expression,
    solution: &Solution,
    check: impl Fn(Ordering) -> bool,
) -> ThinResult<Node> {
    let a = evaluate_expression(a, solution)?;
    let b = evaluate_expression(b, solution)?;
    Ok(boolean_node(check(value_compare(&a, &b)?)))
}

fn string_predicate(
    a: &Expression,
    b: &Expression,
    solution: &Solution,
    check: impl Fn(&str, &str) -> bool,
) -> ThinResult<Node> {
    let (a, _, _) = string_literal(&evaluate_expression(a, solution)?)?;
    let (b, _, _) = string_literal(&evaluate_expression(b, solution)?)?;
    Ok(boolean_node(check(&a, &b)))
}
