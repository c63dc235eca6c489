//! The XSD numeric promotion ladder: arithmetic `+ - * /`
//! with XSD numeric promotion (integer→decimal→double).
//!
//! `xsd:decimal` is modeled as `f64` rather than an arbitrary-precision
//! decimal type: there is no decimal crate in this workspace's dependency
//! stack, and SPARQL's numeric built-ins only
//! need total ordering and the four arithmetic operators, both of which
//! `f64` provides. Promotion still distinguishes `Decimal` from `Double` so
//! that round-tripping a literal's datatype (`STR`, `DATATYPE`) stays exact.

use std::cmp::Ordering;

/// A numeric value at one rung of the promotion ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    /// `xsd:integer`.
    Integer(i64),
    /// `xsd:decimal`.
    Decimal(f64),
    /// `xsd:double` (and `xsd:float`, treated identically).
    Double(f64),
}

/// The rung of the promotion ladder, used to decide the result type of a
/// binary arithmetic operation: the wider of the two operands' rungs wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rung {
    Integer,
    Decimal,
    Double,
}

impl NumericValue {
    fn rung(self) -> Rung {
        match self {
            NumericValue::Integer(_) => Rung::Integer,
            NumericValue::Decimal(_) => Rung::Decimal,
            NumericValue::Double(_) => Rung::Double,
        }
    }

    /// The value widened to `f64`, for arithmetic and comparison.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            NumericValue::Integer(i) => i as f64,
            NumericValue::Decimal(d) | NumericValue::Double(d) => d,
        }
    }

    fn at_rung(self, rung: Rung) -> NumericValue {
        match rung {
            Rung::Integer => self,
            Rung::Decimal => NumericValue::Decimal(self.as_f64()),
            Rung::Double => NumericValue::Double(self.as_f64()),
        }
    }

    fn promote_pair(self, other: NumericValue) -> (NumericValue, NumericValue) {
        let rung = self.rung().max(other.rung());
        (self.at_rung(rung), other.at_rung(rung))
    }

    /// `self + other`, promoted to the wider operand's rung.
    #[must_use]
    pub fn add(self, other: NumericValue) -> NumericValue {
        match self.promote_pair(other) {
            (NumericValue::Integer(a), NumericValue::Integer(b)) => NumericValue::Integer(a + b),
            (NumericValue::Decimal(a), NumericValue::Decimal(b)) => NumericValue::Decimal(a + b),
            (NumericValue::Double(a), NumericValue::Double(b)) => NumericValue::Double(a + b),
            _ => unreachable!("promote_pair always yields matching rungs"),
        }
    }

    /// `self - other`, promoted to the wider operand's rung.
    #[must_use]
    pub fn sub(self, other: NumericValue) -> NumericValue {
        match self.promote_pair(other) {
            (NumericValue::Integer(a), NumericValue::Integer(b)) => NumericValue::Integer(a - b),
            (NumericValue::Decimal(a), NumericValue::Decimal(b)) => NumericValue::Decimal(a - b),
            (NumericValue::Double(a), NumericValue::Double(b)) => NumericValue::Double(a - b),
            _ => unreachable!("promote_pair always yields matching rungs"),
        }
    }

    /// `self * other`, promoted to the wider operand's rung.
    #[must_use]
    pub fn mul(self, other: NumericValue) -> NumericValue {
        match self.promote_pair(other) {
            (NumericValue::Integer(a), NumericValue::Integer(b)) => NumericValue::Integer(a * b),
            (NumericValue::Decimal(a), NumericValue::Decimal(b)) => NumericValue::Decimal(a * b),
            (NumericValue::Double(a), NumericValue::Double(b)) => NumericValue::Double(a * b),
            _ => unreachable!("promote_pair always yields matching rungs"),
        }
    }

    /// `self / other`. Division always promotes to at least `Decimal`, per
    /// XSD op:numeric-divide. Returns `None` on division by zero — callers
    /// turn that into a "Division by zero is an error" expression failure.
    #[must_use]
    pub fn div(self, other: NumericValue) -> Option<NumericValue> {
        if other.as_f64() == 0.0 {
            return None;
        }
        let rung = self.rung().max(other.rung()).max(Rung::Decimal);
        let (a, b) = (self.at_rung(rung), other.at_rung(rung));
        Some(match (a, b) {
            (NumericValue::Decimal(a), NumericValue::Decimal(b)) => NumericValue::Decimal(a / b),
            (NumericValue::Double(a), NumericValue::Double(b)) => NumericValue::Double(a / b),
            _ => unreachable!("division always promotes to Decimal or wider"),
        })
    }

    /// True iff non-zero and not NaN (the effective boolean value rule for numerics).
    #[must_use]
    pub fn is_truthy(self) -> bool {
        let v = self.as_f64();
        v != 0.0 && !v.is_nan()
    }

    /// The effective XSD datatype IRI for this rung.
    #[must_use]
    pub fn datatype(self) -> &'static str {
        match self {
            NumericValue::Integer(_) => crate::term::xsd::INTEGER,
            NumericValue::Decimal(_) => crate::term::xsd::DECIMAL,
            NumericValue::Double(_) => crate::term::xsd::DOUBLE,
        }
    }

    /// The canonical lexical form.
    #[must_use]
    pub fn to_lexical(self) -> String {
        match self {
            NumericValue::Integer(i) => i.to_string(),
            NumericValue::Decimal(d) | NumericValue::Double(d) => {
                if d.fract() == 0.0 && d.is_finite() {
                    format!("{d:.1}")
                } else {
                    d.to_string()
                }
            }
        }
    }
}

impl PartialOrd for NumericValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.promote_pair(*other) {
            (NumericValue::Integer(a), NumericValue::Integer(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_stays_integer() {
        let a = NumericValue::Integer(3);
        let b = NumericValue::Integer(4);
        assert_eq!(a.add(b), NumericValue::Integer(7));
    }

    #[test]
    fn mixed_arithmetic_promotes() {
        let a = NumericValue::Integer(3);
        let b = NumericValue::Double(0.5);
        assert_eq!(a.add(b), NumericValue::Double(3.5));
    }

    #[test]
    fn division_by_zero_is_none() {
        let a = NumericValue::Integer(1);
        let b = NumericValue::Integer(0);
        assert_eq!(a.div(b), None);
    }

    #[test]
    fn division_promotes_to_decimal() {
        let a = NumericValue::Integer(7);
        let b = NumericValue::Integer(2);
        assert_eq!(a.div(b), Some(NumericValue::Decimal(3.5)));
    }
}
