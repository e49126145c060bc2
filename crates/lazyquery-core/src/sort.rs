use crate::{traits::FieldValues, value::canonical_cmp};
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error as ThisError;

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

///
/// Collation
///
/// Optional per-key ordering override. The default is the canonical value
/// order; `CaseInsensitive` folds text case before comparing.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Collation {
    CaseInsensitive,
}

///
/// SortKey
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
    pub collation: Option<Collation>,
}

impl SortKey {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
            collation: None,
        }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
            collation: None,
        }
    }

    #[must_use]
    pub const fn collated(mut self, collation: Collation) -> Self {
        self.collation = Some(collation);
        self
    }

    /// Compare two records on this key alone.
    ///
    /// A missing field sorts before any present value in ascending order.
    fn compare<R: FieldValues + ?Sized>(&self, a: &R, b: &R) -> Ordering {
        let left = a.get_value(&self.field);
        let right = b.get_value(&self.field);

        let cmp = match (&left, &right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(left), Some(right)) => match self.collation {
                Some(Collation::CaseInsensitive) => {
                    match (left.as_text(), right.as_text()) {
                        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
                        _ => canonical_cmp(left, right),
                    }
                }
                None => canonical_cmp(left, right),
            },
        };

        match self.direction {
            SortDirection::Asc => cmp,
            SortDirection::Desc => cmp.reverse(),
        }
    }
}

///
/// SortSpec
///
/// Ordered sequence of sort keys. Sequence order is significant: the first
/// key is primary, later keys break ties.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Deserialize, Eq, PartialEq, Serialize)]
pub struct SortSpec(Vec<SortKey>);

impl SortSpec {
    #[must_use]
    pub const fn new(keys: Vec<SortKey>) -> Self {
        Self(keys)
    }

    /// Compare two records under the full key sequence.
    #[must_use]
    pub fn compare_records<R: FieldValues + ?Sized>(&self, a: &R, b: &R) -> Ordering {
        for key in &self.0 {
            let cmp = key.compare(a, b);
            if cmp != Ordering::Equal {
                return cmp;
            }
        }

        Ordering::Equal
    }
}

impl From<Vec<SortKey>> for SortSpec {
    fn from(keys: Vec<SortKey>) -> Self {
        Self(keys)
    }
}

///
/// SortError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SortError {
    #[error("sort string must begin with '^': '{input}'")]
    MissingSentinel { input: String },

    #[error("empty sort key at position {index}")]
    EmptyKey { index: usize },
}

/// Parse the compact sort grammar.
///
/// The string must start with `^` (distinguishing it from a text filter);
/// the remainder is a comma-separated list of key paths, each optionally
/// prefixed with `-` for descending order:
///
/// ```ignore
/// parse_sort_str("^-name,age")  // name descending, age ascending
/// ```
pub fn parse_sort_str(s: &str) -> Result<SortSpec, SortError> {
    let Some(body) = s.strip_prefix('^') else {
        return Err(SortError::MissingSentinel {
            input: s.to_string(),
        });
    };

    let mut keys = Vec::new();
    for (index, segment) in body.split(',').enumerate() {
        let (field, direction) = match segment.strip_prefix('-') {
            Some(field) => (field, SortDirection::Desc),
            None => (segment, SortDirection::Asc),
        };

        if field.is_empty() {
            return Err(SortError::EmptyKey { index });
        }

        keys.push(SortKey {
            field: field.to_string(),
            direction,
            collation: None,
        });
    }

    Ok(SortSpec(keys))
}

///
/// TESTS
///
