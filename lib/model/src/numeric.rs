use crate::error::{ThinError, ThinResult};
use crate::node::{LiteralNode, Node, UriNode};
use crate::vocab::xsd;
use oxsdatatypes::{Decimal, Double, Float, Integer};
use std::cmp::Ordering;

/// SPARQL's promotion ranking among the effective numeric types.
///
/// When an operation combines operands of different effective types, both are
/// promoted to the higher-ranked type and the operation runs at that rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EffectiveNumericType {
    Integer,
    Decimal,
    Float,
    Double,
}

/// The numeric view of a literal node, computed on demand.
#[derive(Debug, Clone, Copy)]
pub enum NumericValue {
    Integer(Integer),
    Decimal(Decimal),
    Float(Float),
    Double(Double),
}

impl NumericValue {
    pub fn effective_type(&self) -> EffectiveNumericType {
        match self {
            NumericValue::Integer(_) => EffectiveNumericType::Integer,
            NumericValue::Decimal(_) => EffectiveNumericType::Decimal,
            NumericValue::Float(_) => EffectiveNumericType::Float,
            NumericValue::Double(_) => EffectiveNumericType::Double,
        }
    }

    /// Extracts the numeric view of a node, if it is a literal of a numeric
    /// datatype with a well-formed lexical value.
    pub fn from_node(node: &Node) -> Option<Self> {
        let literal = node.as_literal()?;
        if literal.has_language() {
            return None;
        }
        let datatype = literal.datatype()?.as_str();
        if xsd::INTEGER_FAMILY.contains(&datatype) {
            return literal
                .value()
                .parse::<Integer>()
                .ok()
                .map(NumericValue::Integer);
        }
        match datatype {
            xsd::DECIMAL => literal
                .value()
                .parse::<Decimal>()
                .ok()
                .map(NumericValue::Decimal),
            xsd::FLOAT => literal
                .value()
                .parse::<Float>()
                .ok()
                .map(NumericValue::Float),
            xsd::DOUBLE => literal
                .value()
                .parse::<Double>()
                .ok()
                .map(NumericValue::Double),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> ThinResult<Integer> {
        match self {
            NumericValue::Integer(value) => Ok(*value),
            _ => ThinError::expected(),
        }
    }

    pub fn as_decimal(&self) -> ThinResult<Decimal> {
        match self {
            NumericValue::Integer(value) => Ok(Decimal::from(i64::from(*value))),
            NumericValue::Decimal(value) => Ok(*value),
            _ => ThinError::expected(),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            NumericValue::Integer(value) => i64::from(*value) as f64,
            NumericValue::Decimal(value) => decimal_to_f64(*value),
            NumericValue::Float(value) => f64::from(f32::from(*value)),
            NumericValue::Double(value) => f64::from(*value),
        }
    }

    pub fn as_f32(&self) -> f32 {
        match self {
            NumericValue::Integer(value) => i64::from(*value) as f32,
            NumericValue::Decimal(value) => decimal_to_f64(*value) as f32,
            NumericValue::Float(value) => f32::from(*value),
            NumericValue::Double(value) => f64::from(*value) as f32,
        }
    }

    pub fn checked_add(self, rhs: NumericValue) -> ThinResult<NumericValue> {
        self.apply(
            rhs,
            |a, b| a.checked_add(b),
            |a, b| a.checked_add(b),
            |a, b| a + b,
            |a, b| a + b,
        )
    }

    pub fn checked_sub(self, rhs: NumericValue) -> ThinResult<NumericValue> {
        self.apply(
            rhs,
            |a, b| a.checked_sub(b),
            |a, b| a.checked_sub(b),
            |a, b| a - b,
            |a, b| a - b,
        )
    }

    pub fn checked_mul(self, rhs: NumericValue) -> ThinResult<NumericValue> {
        self.apply(
            rhs,
            |a, b| a.checked_mul(b),
            |a, b| a.checked_mul(b),
            |a, b| a * b,
            |a, b| a * b,
        )
    }

    /// Division. Integer operands promote to decimal, so `1 / 2` is `0.5`;
    /// integer and decimal division by zero is an error while float and
    /// double division follows IEEE 754.
    pub fn checked_div(self, rhs: NumericValue) -> ThinResult<NumericValue> {
        let (lhs, rhs) = match (self, rhs) {
            (NumericValue::Integer(a), NumericValue::Integer(b)) => (
                NumericValue::Decimal(Decimal::from(i64::from(a))),
                NumericValue::Decimal(Decimal::from(i64::from(b))),
            ),
            other => other,
        };
        lhs.apply(
            rhs,
            |a, b| a.checked_div(b),
            |a, b| a.checked_div(b),
            |a, b| a / b,
            |a, b| a / b,
        )
    }

    fn apply(
        self,
        rhs: NumericValue,
        int_op: impl Fn(Integer, Integer) -> Option<Integer>,
        dec_op: impl Fn(Decimal, Decimal) -> Option<Decimal>,
        float_op: impl Fn(f32, f32) -> f32,
        double_op: impl Fn(f64, f64) -> f64,
    ) -> ThinResult<NumericValue> {
        let rank = self.effective_type().max(rhs.effective_type());
        match rank {
            EffectiveNumericType::Integer => {
                let result = int_op(self.as_integer()?, rhs.as_integer()?);
                result.map(NumericValue::Integer).ok_or(ThinError::default())
            }
            EffectiveNumericType::Decimal => {
                let result = dec_op(self.as_decimal()?, rhs.as_decimal()?);
                result.map(NumericValue::Decimal).ok_or(ThinError::default())
            }
            EffectiveNumericType::Float => Ok(NumericValue::Float(Float::from(
                float_op(self.as_f32(), rhs.as_f32()),
            ))),
            EffectiveNumericType::Double => Ok(NumericValue::Double(Double::from(
                double_op(self.as_f64(), rhs.as_f64()),
            ))),
        }
    }

    /// Value comparison at the promoted rank.
    pub fn compare(&self, other: &NumericValue) -> Option<Ordering> {
        let rank = self.effective_type().max(other.effective_type());
        match rank {
            EffectiveNumericType::Integer => {
                Some(self.as_integer().ok()?.cmp(&other.as_integer().ok()?))
            }
            EffectiveNumericType::Decimal => {
                Some(self.as_decimal().ok()?.cmp(&other.as_decimal().ok()?))
            }
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }

    pub fn is_equal(&self, other: &NumericValue) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    /// Renders the value back into a literal node of the matching datatype.
    pub fn into_literal(self) -> LiteralNode {
        let (value, datatype) = match self {
            NumericValue::Integer(value) => (value.to_string(), xsd::INTEGER),
            NumericValue::Decimal(value) => (value.to_string(), xsd::DECIMAL),
            NumericValue::Float(value) => (value.to_string(), xsd::FLOAT),
            NumericValue::Double(value) => (value.to_string(), xsd::DOUBLE),
        };
        let datatype = UriNode::new(datatype)
            .unwrap_or_else(|_| unreachable!("vocabulary IRIs are well-formed"));
        LiteralNode::with_datatype(value, datatype)
    }

    pub fn into_node(self) -> Node {
        Node::Literal(self.into_literal())
    }
}

fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_string().parse().unwrap_or(f64::NAN)
}
