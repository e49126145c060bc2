use crate::{
    filter::{Cmp, FilterClause, FilterExpr},
    traits::FieldValues,
    value::{TextMode, Value, compare_eq, compare_order},
};
use std::cmp::Ordering;

///
/// Row-level filter evaluation.
///
/// This is **pure runtime evaluation**: no schema access, no planning.
/// Any undefined comparison simply evaluates to `false`.
///
/// CONTRACT: `Raw` nodes must be lowered by the store before evaluation;
/// a surviving `Raw` leaf never matches.
///
/// `default_mode` applies to the case-unspecified text operators
/// (`Contains`, `StartsWith`, `EndsWith`); the `*Ci` variants are always
/// case-insensitive.
///

#[must_use]
pub(crate) fn eval<R: FieldValues + ?Sized>(
    row: &R,
    expr: &FilterExpr,
    default_mode: TextMode,
) -> bool {
    match expr {
        FilterExpr::True => true,
        FilterExpr::False | FilterExpr::Raw(_) => false,

        FilterExpr::And(children) => children.iter().all(|child| eval(row, child, default_mode)),
        FilterExpr::Or(children) => children.iter().any(|child| eval(row, child, default_mode)),
        FilterExpr::Not(inner) => !eval(row, inner, default_mode),

        FilterExpr::Clause(clause) => eval_clause(row, clause, default_mode),
    }
}

///
/// Evaluate a single comparison clause against a row.
///
/// Returns `false` if:
/// - the field is missing from the row
/// - the comparison is not defined between the two values
///

fn eval_clause<R: FieldValues + ?Sized>(
    row: &R,
    clause: &FilterClause,
    default_mode: TextMode,
) -> bool {
    let FilterClause { field, cmp, value } = clause;

    let Some(actual) = row.get_value(field) else {
        return false;
    };

    // NOTE: comparison helpers return None when a comparison is invalid;
    // eval treats that as false.
    match cmp {
        Cmp::Eq => compare_eq(&actual, value).unwrap_or(false),

        Cmp::Lt => compare_order(&actual, value).is_some_and(Ordering::is_lt),
        Cmp::Lte => compare_order(&actual, value).is_some_and(Ordering::is_le),
        Cmp::Gt => compare_order(&actual, value).is_some_and(Ordering::is_gt),
        Cmp::Gte => compare_order(&actual, value).is_some_and(Ordering::is_ge),

        Cmp::Contains => contains(&actual, value, default_mode),
        Cmp::ContainsCi => contains(&actual, value, TextMode::Ci),

        Cmp::StartsWith => actual.text_starts_with(value, default_mode).unwrap_or(false),
        Cmp::StartsWithCi => actual.text_starts_with(value, TextMode::Ci).unwrap_or(false),

        Cmp::EndsWith => actual.text_ends_with(value, default_mode).unwrap_or(false),
        Cmp::EndsWithCi => actual.text_ends_with(value, TextMode::Ci).unwrap_or(false),
    }
}

///
/// Containment check: text substring or list membership.
///

fn contains(actual: &Value, needle: &Value, mode: TextMode) -> bool {
    if matches!(actual, Value::Text(_)) {
        return actual.text_contains(needle, mode).unwrap_or(false);
    }

    let Value::List(items) = actual else {
        return false;
    };

    items
        .iter()
        // Invalid comparisons are treated as non-matches.
        .any(|item| compare_eq(item, needle).unwrap_or(false))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Record;

    fn row() -> Record {
        Record::new()
            .with("name", "Brittany")
            .with("age", 27)
            .with("tags", vec!["adm", "ops"])
    }

    #[test]
    fn missing_field_never_matches() {
        let expr = FilterExpr::eq("height", 180);
        assert!(!eval(&row(), &expr, TextMode::Cs));
    }

    #[test]
    fn ordering_clauses() {
        assert!(eval(&row(), &FilterExpr::gt("age", 10), TextMode::Cs));
        assert!(eval(&row(), &FilterExpr::lte("age", 27), TextMode::Cs));
        assert!(!eval(&row(), &FilterExpr::lt("age", 27), TextMode::Cs));
    }

    #[test]
    fn text_clauses_honor_default_mode() {
        let expr = FilterExpr::starts_with("name", "brit");
        assert!(!eval(&row(), &expr, TextMode::Cs));
        assert!(eval(&row(), &expr, TextMode::Ci));

        // Ci variant ignores the default
        let expr = FilterExpr::starts_with_ci("name", "brit");
        assert!(eval(&row(), &expr, TextMode::Cs));
    }

    #[test]
    fn contains_over_text_and_lists() {
        assert!(eval(&row(), &FilterExpr::contains("name", "itt"), TextMode::Cs));
        assert!(eval(&row(), &FilterExpr::contains("tags", "ops"), TextMode::Cs));
        assert!(!eval(&row(), &FilterExpr::contains("tags", "dev"), TextMode::Cs));
    }

    #[test]
    fn composite_expressions() {
        let expr = FilterExpr::eq("name", "Brittany") & FilterExpr::gt("age", 10);
        assert!(eval(&row(), &expr, TextMode::Cs));

        let expr = FilterExpr::eq("name", "Sara") | FilterExpr::gt("age", 10);
        assert!(eval(&row(), &expr, TextMode::Cs));

        let expr = !FilterExpr::eq("name", "Brittany");
        assert!(!eval(&row(), &expr, TextMode::Cs));
    }

    #[test]
    fn raw_leaves_never_match() {
        assert!(!eval(&row(), &FilterExpr::raw("age > 10"), TextMode::Cs));
    }
}
