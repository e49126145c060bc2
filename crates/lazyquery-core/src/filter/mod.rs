pub(crate) mod eval;
mod expr;
mod parse;

pub use expr::{Cmp, FilterClause, FilterExpr};
pub use parse::{FilterError, FilterMap, parse};
