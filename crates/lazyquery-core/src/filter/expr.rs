use crate::{traits::FieldValue, value::Value};
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, Not};

///
/// Cmp
///
/// Comparison operators accepted by filter clauses. The `*Ci` variants make
/// text case-sensitivity explicit rather than leaving it store-defined.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Cmp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    ContainsCi,
    StartsWith,
    StartsWithCi,
    EndsWith,
    EndsWithCi,
}

///
/// FilterClause
/// represents a basic comparison expression: `field cmp value`
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FilterClause {
    pub field: String,
    pub cmp: Cmp,
    pub value: Value,
}

impl FilterClause {
    #[must_use]
    pub fn new(field: impl Into<String>, cmp: Cmp, value: impl FieldValue) -> Self {
        Self {
            field: field.into(),
            cmp,
            value: value.to_value(),
        }
    }
}

///
/// FilterExpr
///
/// Immutable boolean expression tree describing which records match.
///
/// Expressions can be:
/// - `True` or `False` constants
/// - Single clauses comparing a field with a value
/// - Composite expressions: `And`, `Or`, and negation `Not`
/// - `Raw`: a store-native textual predicate, opaque to this layer
///
/// Composing two expressions always produces a new node; operands are
/// never mutated.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum FilterExpr {
    #[default]
    True,
    False,
    Clause(FilterClause),
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Raw(String),
}

impl FilterExpr {
    // --- Clause ---

    /// Create a single clause: `field cmp value`.
    pub fn clause(field: impl Into<String>, cmp: Cmp, value: impl FieldValue) -> Self {
        Self::Clause(FilterClause::new(field, cmp, value))
    }

    /// Store-native textual predicate, passed through to the context verbatim.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    // --- Equality / Ordering ---

    pub fn eq(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::Eq, value)
    }

    pub fn gt(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::Gte, value)
    }

    pub fn lt(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::Lte, value)
    }

    // --- Text ---

    pub fn contains(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::Contains, value)
    }

    pub fn contains_ci(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::ContainsCi, value)
    }

    pub fn starts_with(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::StartsWith, value)
    }

    pub fn starts_with_ci(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::StartsWithCi, value)
    }

    pub fn ends_with(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::EndsWith, value)
    }

    pub fn ends_with_ci(field: impl Into<String>, value: impl FieldValue) -> Self {
        Self::clause(field, Cmp::EndsWithCi, value)
    }

    // --- Composition ---

    /// Combine two expressions into an `And` expression.
    ///
    /// This flattens nested `And`s to avoid deep nesting
    /// (e.g., `(a AND b) AND c` becomes `AND[a,b,c]`).
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::And(mut a), Self::And(mut b)) => {
                a.append(&mut b);
                Self::And(a)
            }
            (Self::And(mut a), b) => {
                a.push(b);
                Self::And(a)
            }
            (a, Self::And(mut b)) => {
                let mut list = vec![a];
                list.append(&mut b);
                Self::And(list)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    /// Combine two expressions into an `Or` expression,
    /// flattening nested `Or`s similarly to `and`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Or(mut a), Self::Or(mut b)) => {
                a.append(&mut b);
                Self::Or(a)
            }
            (Self::Or(mut a), b) => {
                a.push(b);
                Self::Or(a)
            }
            (a, Self::Or(mut b)) => {
                let mut list = vec![a];
                list.append(&mut b);
                Self::Or(list)
            }
            (a, b) => Self::Or(vec![a, b]),
        }
    }

    /// Negate this expression.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Simplifies the expression recursively, applying rules like:
    /// - Eliminate double negation `NOT NOT x` -> `x`
    /// - Apply De Morgan's laws over `Not(And)` / `Not(Or)`
    /// - Flatten nested `And` and `Or` expressions
    /// - Remove neutral elements (`True` under `And`, `False` under `Or`)
    /// - Short circuit on constants (`False` under `And`, `True` under `Or`)
    ///
    /// `Clause` and `Raw` leaves are left untouched.
    #[must_use]
    pub fn simplify(self) -> Self {
        match self {
            Self::Not(inner) => match *inner {
                Self::True => Self::False,
                Self::False => Self::True,
                Self::Not(inner2) => (*inner2).simplify(),
                Self::And(children) => {
                    // De Morgan's: NOT(AND(...)) == OR(NOT(...))
                    Self::Or(children.into_iter().map(|c| c.not().simplify()).collect())
                }
                Self::Or(children) => {
                    // De Morgan's: NOT(OR(...)) == AND(NOT(...))
                    Self::And(children.into_iter().map(|c| c.not().simplify()).collect())
                }
                x @ (Self::Clause(_) | Self::Raw(_)) => Self::Not(Box::new(x)),
            },

            Self::And(children) => {
                let flat = Self::simplify_children(children, |e| matches!(e, Self::And(_)));

                if flat.iter().any(|e| matches!(e, Self::False)) {
                    Self::False
                } else {
                    let filtered: Vec<_> = flat
                        .into_iter()
                        .filter(|e| !matches!(e, Self::True))
                        .collect();

                    match filtered.len() {
                        0 => Self::True,
                        1 => filtered.into_iter().next().unwrap(),
                        _ => Self::And(filtered),
                    }
                }
            }

            Self::Or(children) => {
                let flat = Self::simplify_children(children, |e| matches!(e, Self::Or(_)));

                if flat.iter().any(|e| matches!(e, Self::True)) {
                    Self::True
                } else {
                    let filtered: Vec<_> = flat
                        .into_iter()
                        .filter(|e| !matches!(e, Self::False))
                        .collect();

                    match filtered.len() {
                        0 => Self::False,
                        1 => filtered.into_iter().next().unwrap(),
                        _ => Self::Or(filtered),
                    }
                }
            }

            // Clauses, raw text, and constants are already simplest forms
            x => x,
        }
    }

    /// Helper to simplify and flatten nested `And` or `Or` children.
    fn simplify_children(children: Vec<Self>, flatten_if: fn(&Self) -> bool) -> Vec<Self> {
        let mut flat = Vec::with_capacity(children.len());

        for child in children {
            let simplified = child.simplify();
            if flatten_if(&simplified) {
                if let Self::And(nested) | Self::Or(nested) = simplified {
                    flat.extend(nested);
                }
            } else {
                flat.push(simplified);
            }
        }

        flat
    }
}

///
/// Bit Operations
/// allow us to do | & and ! on expressions
///

impl BitAnd for FilterExpr {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for FilterExpr {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl Not for FilterExpr {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(field: &str) -> FilterExpr {
        FilterExpr::Clause(FilterClause::new(field, Cmp::Eq, "foo"))
    }

    #[test]
    fn constructors_cover_all_cmps() {
        fn assert_clause(expr: FilterExpr, field: &str, cmp: Cmp, value: Value) {
            match expr {
                FilterExpr::Clause(c) => {
                    assert_eq!(c.field, field);
                    assert_eq!(c.cmp, cmp);
                    assert_eq!(c.value, value);
                }
                _ => panic!("expected Clause"),
            }
        }

        assert_clause(FilterExpr::eq("a", 1), "a", Cmp::Eq, Value::Int(1));
        assert_clause(FilterExpr::gt("a", 1), "a", Cmp::Gt, Value::Int(1));
        assert_clause(FilterExpr::gte("a", 1), "a", Cmp::Gte, Value::Int(1));
        assert_clause(FilterExpr::lt("a", 1), "a", Cmp::Lt, Value::Int(1));
        assert_clause(FilterExpr::lte("a", 1), "a", Cmp::Lte, Value::Int(1));
        assert_clause(
            FilterExpr::contains("a", "x"),
            "a",
            Cmp::Contains,
            Value::Text("x".to_string()),
        );
        assert_clause(
            FilterExpr::contains_ci("a", "x"),
            "a",
            Cmp::ContainsCi,
            Value::Text("x".to_string()),
        );
        assert_clause(
            FilterExpr::starts_with("a", "x"),
            "a",
            Cmp::StartsWith,
            Value::Text("x".to_string()),
        );
        assert_clause(
            FilterExpr::ends_with("a", "x"),
            "a",
            Cmp::EndsWith,
            Value::Text("x".to_string()),
        );
        assert_clause(
            FilterExpr::starts_with_ci("a", "x"),
            "a",
            Cmp::StartsWithCi,
            Value::Text("x".to_string()),
        );
        assert_clause(
            FilterExpr::ends_with_ci("a", "x"),
            "a",
            Cmp::EndsWithCi,
            Value::Text("x".to_string()),
        );
    }

    #[test]
    fn and_flattening_via_ops() {
        let f = (clause("a") & (clause("b") & clause("c"))) & clause("d");
        match f {
            FilterExpr::And(children) => assert_eq!(children.len(), 4),
            _ => panic!("expected And"),
        }
    }

    #[test]
    fn or_flattening_via_ops() {
        let f = (clause("x") | (clause("y") | clause("z"))) | clause("w");
        match f {
            FilterExpr::Or(children) => assert_eq!(children.len(), 4),
            _ => panic!("expected Or"),
        }
    }

    #[test]
    fn simplify_and_constants() {
        let expr = FilterExpr::And(vec![FilterExpr::True, clause("a")]);
        assert!(matches!(expr.simplify(), FilterExpr::Clause(_)));

        let expr = FilterExpr::And(vec![clause("a"), FilterExpr::False]);
        assert_eq!(expr.simplify(), FilterExpr::False);
    }

    #[test]
    fn simplify_or_constants() {
        let expr = FilterExpr::Or(vec![FilterExpr::False, clause("a")]);
        assert!(matches!(expr.simplify(), FilterExpr::Clause(_)));

        let expr = FilterExpr::Or(vec![clause("a"), FilterExpr::True]);
        assert_eq!(expr.simplify(), FilterExpr::True);
    }

    #[test]
    fn double_negation() {
        let expr = FilterExpr::Not(Box::new(FilterExpr::Not(Box::new(clause("x")))));
        assert!(matches!(expr.simplify(), FilterExpr::Clause(_)));
    }

    #[test]
    fn demorgan_not_and() {
        let expr = FilterExpr::Not(Box::new(FilterExpr::And(vec![clause("a"), clause("b")])));
        match expr.simplify() {
            FilterExpr::Or(children) => assert_eq!(children.len(), 2),
            _ => panic!("expected Or"),
        }
    }

    #[test]
    fn demorgan_not_or() {
        let expr = FilterExpr::Not(Box::new(FilterExpr::Or(vec![clause("a"), clause("b")])));
        match expr.simplify() {
            FilterExpr::And(children) => assert_eq!(children.len(), 2),
            _ => panic!("expected And"),
        }
    }

    #[test]
    fn raw_is_an_opaque_leaf() {
        let expr = FilterExpr::Not(Box::new(FilterExpr::raw("age > 10")));
        let simplified = expr.clone().simplify();
        assert_eq!(simplified, expr);
    }
}
