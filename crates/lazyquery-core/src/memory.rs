//! In-memory data context.
//!
//! A schemaless reference store used for tests and examples. It keeps one
//! table of rows per entity kind and implements the full fetch contract,
//! including a small text-predicate grammar for raw filters.

use crate::{
    descriptor::FetchDescriptor,
    error::StoreError,
    filter::{self, FilterExpr},
    traits::{DataContext, FieldValue, FieldValues},
    value::{TextMode, Value},
};
use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet},
};

///
/// Record
///
/// A schemaless row: an ordered list of named values. Lookup is by first
/// match, so duplicate field names shadow later entries.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Record(Vec<(String, Value)>);

impl Record {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl FieldValue) -> Self {
        self.0.push((field.into(), value.to_value()));
        self
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }
}

impl FieldValues for Record {
    fn get_value(&self, field: &str) -> Option<Value> {
        self.get(field).cloned()
    }
}

///
/// MemoryContext
///
/// Single-threaded by construction (interior mutability is cell-based),
/// matching the threading contract of the query layer.
///

pub struct MemoryContext {
    tables: RefCell<BTreeMap<String, Vec<Record>>>,
    text_mode: TextMode,
    usable: Cell<bool>,
    fetches: Cell<u64>,
}

impl MemoryContext {
    #[must_use]
    pub fn new() -> Self {
        Self::with_text_mode(TextMode::Cs)
    }

    /// A context whose case-unspecified text operators fold case.
    #[must_use]
    pub fn with_text_mode(text_mode: TextMode) -> Self {
        Self {
            tables: RefCell::new(BTreeMap::new()),
            text_mode,
            usable: Cell::new(true),
            fetches: Cell::new(0),
        }
    }

    /// Insert a row, creating the entity kind's table on first use.
    pub fn insert(&self, kind: impl Into<String>, record: Record) {
        self.tables
            .borrow_mut()
            .entry(kind.into())
            .or_default()
            .push(record);
    }

    /// Mark the context unusable. Subsequent evaluations fail with
    /// `EvalError::ContextUnavailable`.
    pub fn invalidate(&self) {
        self.usable.set(false);
    }

    /// Number of fetches executed so far. Lets tests assert that frozen
    /// queries never hit the store twice.
    #[must_use]
    pub fn fetch_count(&self) -> u64 {
        self.fetches.get()
    }
}

impl Default for MemoryContext {
    fn default() -> Self {
        Self::new()
    }
}

impl DataContext for MemoryContext {
    type Record = Record;

    fn entity_kinds(&self) -> BTreeSet<String> {
        self.tables.borrow().keys().cloned().collect()
    }

    fn is_usable(&self) -> bool {
        self.usable.get()
    }

    fn execute_fetch(&self, descriptor: &FetchDescriptor) -> Result<Vec<Record>, StoreError> {
        self.fetches.set(self.fetches.get() + 1);

        let entity = descriptor
            .entity()
            .ok_or_else(|| StoreError::new("fetch descriptor has no entity"))?;

        let tables = self.tables.borrow();
        let rows = tables
            .get(entity)
            .ok_or_else(|| StoreError::new(format!("unknown entity kind '{entity}'")))?;

        // Raw text predicates are this store's concern; lower them to
        // clauses before evaluation, then normalize.
        let expr = match &descriptor.filter {
            Some(expr) => lower_raw(expr)?.simplify(),
            None => FilterExpr::True,
        };

        let mut matched: Vec<Record> = rows
            .iter()
            .filter(|row| filter::eval::eval(*row, &expr, self.text_mode))
            .cloned()
            .collect();

        if !descriptor.sort.is_empty() {
            matched.sort_by(|a, b| descriptor.sort.compare_records(a, b));
        }

        if let Some(limit) = descriptor.limit {
            matched.truncate(limit as usize);
        }

        Ok(matched)
    }
}

///
/// Raw predicate lowering.
///
/// Grammar: one or more `field op literal` clauses joined by `and`.
/// Operators: `=` `==` `!=` `>` `>=` `<` `<=`. Literals: quoted text
/// (single or double), integers, floats, `true`, `false`, `null`.
///

fn lower_raw(expr: &FilterExpr) -> Result<FilterExpr, StoreError> {
    match expr {
        FilterExpr::Raw(text) => parse_raw(text),

        FilterExpr::And(children) => Ok(FilterExpr::And(
            children.iter().map(lower_raw).collect::<Result<_, _>>()?,
        )),
        FilterExpr::Or(children) => Ok(FilterExpr::Or(
            children.iter().map(lower_raw).collect::<Result<_, _>>()?,
        )),
        FilterExpr::Not(inner) => Ok(FilterExpr::Not(Box::new(lower_raw(inner)?))),

        other => Ok(other.clone()),
    }
}

#[derive(Debug, Eq, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
}

fn tokenize(text: &str) -> Result<Vec<Token>, StoreError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '\'' || c == '"' {
            chars.next();
            let mut literal = String::new();
            loop {
                match chars.next() {
                    Some(inner) if inner == c => break,
                    Some(inner) => literal.push(inner),
                    None => {
                        return Err(StoreError::new(format!(
                            "unterminated string literal in predicate '{text}'"
                        )));
                    }
                }
            }
            tokens.push(Token::Quoted(literal));
        } else {
            let mut word = String::new();
            while let Some(&inner) = chars.peek() {
                if inner.is_whitespace() || inner == '\'' || inner == '"' {
                    break;
                }
                word.push(inner);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }

    Ok(tokens)
}

fn parse_raw(text: &str) -> Result<FilterExpr, StoreError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(StoreError::new("empty text predicate"));
    }

    let mut expr = FilterExpr::True;
    for group in tokens.split(|t| matches!(t, Token::Word(w) if w.eq_ignore_ascii_case("and"))) {
        expr = expr.and(parse_raw_clause(text, group)?);
    }

    Ok(expr)
}

fn parse_raw_clause(text: &str, tokens: &[Token]) -> Result<FilterExpr, StoreError> {
    let [Token::Word(field), Token::Word(op), literal] = tokens else {
        return Err(StoreError::new(format!(
            "malformed predicate clause in '{text}'; expected 'field op literal'"
        )));
    };

    let value = parse_raw_literal(text, literal)?;

    let clause = match op.as_str() {
        "=" | "==" => FilterExpr::eq(field, value),
        "!=" => !FilterExpr::eq(field, value),
        ">" => FilterExpr::gt(field, value),
        ">=" => FilterExpr::gte(field, value),
        "<" => FilterExpr::lt(field, value),
        "<=" => FilterExpr::lte(field, value),
        other => {
            return Err(StoreError::new(format!(
                "unsupported operator '{other}' in predicate '{text}'"
            )));
        }
    };

    Ok(clause)
}

fn parse_raw_literal(text: &str, token: &Token) -> Result<Value, StoreError> {
    match token {
        Token::Quoted(s) => Ok(Value::Text(s.clone())),
        Token::Word(w) => match w.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            _ => {
                if let Ok(int) = w.parse::<i64>() {
                    Ok(Value::Int(int))
                } else if let Ok(float) = w.parse::<f64>() {
                    Ok(float.to_value())
                } else {
                    Err(StoreError::new(format!(
                        "invalid literal '{w}' in predicate '{text}'"
                    )))
                }
            }
        },
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FetchDescriptor;

    fn seeded() -> MemoryContext {
        let ctx = MemoryContext::new();
        ctx.insert("Article", Record::new().with("title", "Alpha").with("views", 10));
        ctx.insert("Article", Record::new().with("title", "Beta").with("views", 50));
        ctx.insert("Article", Record::new().with("title", "Gamma").with("views", 30));
        ctx
    }

    #[test]
    fn unknown_entity_is_a_store_error() {
        let ctx = seeded();
        let descriptor = FetchDescriptor::for_entity("Missing");

        assert!(ctx.execute_fetch(&descriptor).is_err());
    }

    #[test]
    fn filters_sorts_and_limits() {
        let ctx = seeded();
        let descriptor = FetchDescriptor::for_entity("Article")
            .merge_filter(FilterExpr::gt("views", 5))
            .replace_sort(crate::sort::parse_sort_str("^-views").unwrap())
            .replace_limit(2);

        let rows = ctx.execute_fetch(&descriptor).unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r.get("title").cloned()).collect();

        assert_eq!(
            titles,
            vec![
                Some(Value::Text("Beta".to_string())),
                Some(Value::Text("Gamma".to_string())),
            ]
        );
    }

    #[test]
    fn raw_predicates_are_lowered() {
        let ctx = seeded();
        let descriptor = FetchDescriptor::for_entity("Article")
            .merge_filter(FilterExpr::raw("title = 'Beta' and views > 25"));

        let rows = ctx.execute_fetch(&descriptor).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("title"), Some(&Value::Text("Beta".to_string())));
    }

    #[test]
    fn raw_predicate_literals() {
        let ctx = MemoryContext::new();
        ctx.insert(
            "Flag",
            Record::new().with("on", true).with("ratio", 0.5).with("gone", Option::<i64>::None),
        );

        for text in ["on = true", "ratio < 0.75", "gone = null"] {
            let descriptor =
                FetchDescriptor::for_entity("Flag").merge_filter(FilterExpr::raw(text));
            assert_eq!(ctx.execute_fetch(&descriptor).unwrap().len(), 1, "{text}");
        }
    }

    #[test]
    fn malformed_raw_predicate_is_a_store_error() {
        let ctx = seeded();

        for text in ["", "title ~= 'x'", "title =", "views > banana", "title = 'unterminated"] {
            let descriptor =
                FetchDescriptor::for_entity("Article").merge_filter(FilterExpr::raw(text));
            assert!(ctx.execute_fetch(&descriptor).is_err(), "{text}");
        }
    }

    #[test]
    fn limit_zero_fetches_nothing() {
        let ctx = seeded();
        let descriptor = FetchDescriptor::for_entity("Article").replace_limit(0);

        assert!(ctx.execute_fetch(&descriptor).unwrap().is_empty());
    }
}
