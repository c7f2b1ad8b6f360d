use crate::vocab::xsd;
use oxsdatatypes::{DateTime, Decimal, Double, Float, Integer};
use std::cmp::Ordering;

/// The parsed value of a typed literal, for the recognized subset of XSD
/// datatypes.
///
/// Only values of the same kind compare; everything else is incomparable,
/// which makes the callers fall back to lexical comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Integer(Integer),
    Decimal(Decimal),
    Float(Float),
    Double(Double),
    Boolean(bool),
    DateTime(DateTime),
    String(String),
    Uri(String),
}

impl LiteralValue {
    /// Parses a lexical form according to `datatype`, returning [None] for
    /// unrecognized datatypes or forms outside the lexical space.
    ///
    /// The boolean lexical space is deliberately restricted to `true` and
    /// `false`: `"1"^^xsd:boolean` requires a cast and therefore never
    /// compares value-equal to `"true"^^xsd:boolean`.
    pub fn parse(value: &str, datatype: &str) -> Option<Self> {
        if xsd::INTEGER_FAMILY.contains(&datatype) {
            return value.parse::<Integer>().ok().map(LiteralValue::Integer);
        }
        match datatype {
            xsd::DECIMAL => value.parse::<Decimal>().ok().map(LiteralValue::Decimal),
            xsd::FLOAT => value.parse::<Float>().ok().map(LiteralValue::Float),
            xsd::DOUBLE => value.parse::<Double>().ok().map(LiteralValue::Double),
            xsd::BOOLEAN => match value {
                "true" => Some(LiteralValue::Boolean(true)),
                "false" => Some(LiteralValue::Boolean(false)),
                _ => None,
            },
            xsd::DATE_TIME => value
                .parse::<DateTime>()
                .ok()
                .map(LiteralValue::DateTime),
            xsd::STRING => Some(LiteralValue::String(value.to_owned())),
            xsd::ANY_URI => Some(LiteralValue::Uri(value.to_owned())),
            _ => None,
        }
    }

    pub fn partial_cmp(&self, other: &LiteralValue) -> Option<Ordering> {
        match (self, other) {
            (LiteralValue::Integer(a), LiteralValue::Integer(b)) => Some(a.cmp(b)),
            (LiteralValue::Decimal(a), LiteralValue::Decimal(b)) => Some(a.cmp(b)),
            (LiteralValue::Float(a), LiteralValue::Float(b)) => {
                f32::from(*a).partial_cmp(&f32::from(*b))
            }
            (LiteralValue::Double(a), LiteralValue::Double(b)) => {
                f64::from(*a).partial_cmp(&f64::from(*b))
            }
            (LiteralValue::Boolean(a), LiteralValue::Boolean(b)) => Some(a.cmp(b)),
            (LiteralValue::DateTime(a), LiteralValue::DateTime(b)) => a.partial_cmp(b),
            (LiteralValue::String(a), LiteralValue::String(b)) => Some(a.cmp(b)),
            (LiteralValue::Uri(a), LiteralValue::Uri(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}
