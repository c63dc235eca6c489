//! Aggregate expressions for GROUP BY.

use crate::expr::Expression;

/// An aggregate function applied to a group of solution mappings.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateExpression {
    /// `COUNT(*)` counts every mapping in the group regardless of any
    /// expression outcome.
    CountAll,
    /// `COUNT(expr [DISTINCT])`.
    Count {
        /// Expression to evaluate per mapping.
        expr: Box<Expression>,
        /// Whether to count only distinct evaluated values.
        distinct: bool,
    },
    /// `SUM(expr)`. Sum of empty group is 0; non-numeric values are skipped.
    Sum {
        /// Expression to evaluate per mapping.
        expr: Box<Expression>,
        /// Whether to sum only distinct evaluated values.
        distinct: bool,
    },
    /// `AVG(expr)`. Average of empty group is 0.
    Avg {
        /// Expression to evaluate per mapping.
        expr: Box<Expression>,
        /// Whether to average only distinct evaluated values.
        distinct: bool,
    },
    /// `MIN(expr)`. An error over an empty group.
    Min(Box<Expression>),
    /// `MAX(expr)`. An error over an empty group.
    Max(Box<Expression>),
    /// `SAMPLE(expr)`: any one value from the group. An error over an
    /// empty group.
    Sample(Box<Expression>),
    /// `GROUP_CONCAT(expr [; SEPARATOR=sep])`.
    GroupConcat {
        /// Expression to evaluate per mapping.
        expr: Box<Expression>,
        /// Whether to concatenate only distinct evaluated values.
        distinct: bool,
        /// Separator between concatenated values; defaults to a single space.
        separator: Option<String>,
    },
}

impl AggregateExpression {
    /// Whether this aggregate is an error over an empty group, rather than
    /// having a defined empty-group result: MIN/MAX/SAMPLE
    /// of an empty group is an error.
    #[must_use]
    pub fn errors_on_empty_group(&self) -> bool {
        matches!(self, AggregateExpression::Min(_) | AggregateExpression::Max(_) | AggregateExpression::Sample(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_errors_on_empty_but_sum_does_not() {
        let min = AggregateExpression::Min(Box::new(Expression::variable("x")));
        let sum = AggregateExpression::Sum { expr: Box::new(Expression::variable("x")), distinct: false };
        assert!(min.errors_on_empty_group());
        assert!(!sum.errors_on_empty_group());
    }
}
