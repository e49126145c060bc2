use crate::{
    filter::{Cmp, FilterExpr},
    traits::FieldValue,
    value::Value,
};
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// FilterMap
///
/// Ordered dictionary form of a filter. Each key is `field` or
/// `field__operator`; insertion order determines the shape of the resulting
/// `And` tree (never its semantics).
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Deserialize, Eq, PartialEq, Serialize)]
pub struct FilterMap(Vec<(String, Value)>);

impl FilterMap {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append one entry, preserving insertion order.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl FieldValue) -> Self {
        self.0.push((key.into(), value.to_value()));
        self
    }
}

impl<K: Into<String>, V: FieldValue> FromIterator<(K, V)> for FilterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_value()))
                .collect(),
        )
    }
}

///
/// FilterError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FilterError {
    #[error("unrecognized comparison operator '{op}' in filter key '{key}'")]
    InvalidOperator { key: String, op: String },
}

/// Parse a dictionary filter into an expression tree.
///
/// Entries combine with logical AND in insertion order. An empty map parses
/// to `FilterExpr::True` (no filtering). An unknown operator suffix fails
/// with `FilterError::InvalidOperator` before any store access.
pub fn parse(map: &FilterMap) -> Result<FilterExpr, FilterError> {
    let mut expr: Option<FilterExpr> = None;

    for (key, value) in map.iter() {
        let clause = parse_entry(key, value)?;
        expr = Some(match expr.take() {
            Some(existing) => existing.and(clause),
            None => clause,
        });
    }

    Ok(expr.unwrap_or(FilterExpr::True))
}

fn parse_entry(key: &str, value: &Value) -> Result<FilterExpr, FilterError> {
    let (field, cmp) = match key.rsplit_once("__") {
        None => (key, Cmp::Eq),
        Some((field, token)) => {
            let cmp = parse_token(token).ok_or_else(|| FilterError::InvalidOperator {
                key: key.to_string(),
                op: token.to_string(),
            })?;
            (field, cmp)
        }
    };

    Ok(FilterExpr::clause(field, cmp, value.clone()))
}

fn parse_token(token: &str) -> Option<Cmp> {
    let cmp = match token.to_ascii_lowercase().as_str() {
        "eq" => Cmp::Eq,
        "gte" => Cmp::Gte,
        "gt" => Cmp::Gt,
        "lte" => Cmp::Lte,
        "lt" => Cmp::Lt,
        "contains" => Cmp::Contains,
        "beginswith" => Cmp::StartsWith,
        "endswith" => Cmp::EndsWith,
        _ => return None,
    };

    Some(cmp)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterClause;

    fn clause(field: &str, cmp: Cmp, value: Value) -> FilterExpr {
        FilterExpr::Clause(FilterClause {
            field: field.to_string(),
            cmp,
            value,
        })
    }

    #[test]
    fn empty_map_parses_to_true() {
        assert_eq!(parse(&FilterMap::new()), Ok(FilterExpr::True));
    }

    #[test]
    fn bare_key_implies_eq() {
        let map = FilterMap::new().with("name", "Brittany");
        assert_eq!(
            parse(&map),
            Ok(clause("name", Cmp::Eq, Value::Text("Brittany".into())))
        );
    }

    #[test]
    fn entries_and_combine_in_insertion_order() {
        let map = FilterMap::new()
            .with("name__beginswith", "Brit")
            .with("age__gt", 10)
            .with("age__lte", 60);

        let expr = parse(&map).unwrap();
        match expr {
            FilterExpr::And(children) => {
                assert_eq!(children.len(), 3);
                assert_eq!(
                    children[0],
                    clause("name", Cmp::StartsWith, Value::Text("Brit".into()))
                );
                assert_eq!(children[1], clause("age", Cmp::Gt, Value::Int(10)));
                assert_eq!(children[2], clause("age", Cmp::Lte, Value::Int(60)));
            }
            _ => panic!("expected And"),
        }
    }

    #[test]
    fn operator_suffix_is_case_insensitive() {
        let map = FilterMap::new().with("age__GTE", 10);
        assert_eq!(parse(&map), Ok(clause("age", Cmp::Gte, Value::Int(10))));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let map = FilterMap::new().with("age__between", 10);
        assert_eq!(
            parse(&map),
            Err(FilterError::InvalidOperator {
                key: "age__between".to_string(),
                op: "between".to_string(),
            })
        );
    }

    #[test]
    fn only_the_last_double_underscore_splits() {
        let map = FilterMap::new().with("display__name__eq", "x");
        assert_eq!(
            parse(&map),
            Ok(clause("display__name", Cmp::Eq, Value::Text("x".into())))
        );
    }
}
