//! Typed conjunctive filter consumed by repository searches.
//!
//! # Responsibility
//! - Hold an ordered list of typed clauses combined with logical AND.
//! - Render clauses into a parameterized `WHERE` fragment.
//!
//! # Invariants
//! - An empty filter matches every row.
//! - Clause values are always bound parameters; only static column names and
//!   fixed operator templates reach query text.
//! - Substring and suffix clauses escape `%`, `_` and `\` before binding and
//!   compare Unicode lower-case forms on both sides.
//! - Clauses are built only by the criteria records in this crate, so every
//!   column name belongs to the searched table.

use crate::db::{casefold, LOWER_UNICODE_FN};
use rusqlite::types::Value;

/// One predicate over a single column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Clause {
    /// Case-insensitive substring match.
    Contains { column: &'static str, needle: String },
    /// Case-insensitive suffix match.
    EndsWith { column: &'static str, suffix: String },
    /// Exact match.
    Equals { column: &'static str, value: Value },
    /// `column >= value`.
    AtLeast { column: &'static str, value: Value },
    /// `column <= value`.
    AtMost { column: &'static str, value: Value },
}

impl Clause {
    fn render(&self, bind_values: &mut Vec<Value>) -> String {
        match self {
            Self::Contains { column, needle } => {
                let needle = escape_like(&casefold(needle));
                bind_values.push(Value::Text(format!("%{needle}%")));
                format!("{LOWER_UNICODE_FN}({column}) LIKE ? ESCAPE '\\'")
            }
            Self::EndsWith { column, suffix } => {
                let suffix = escape_like(&casefold(suffix));
                bind_values.push(Value::Text(format!("%{suffix}")));
                format!("{LOWER_UNICODE_FN}({column}) LIKE ? ESCAPE '\\'")
            }
            Self::Equals { column, value } => {
                bind_values.push(value.clone());
                format!("{column} = ?")
            }
            Self::AtLeast { column, value } => {
                bind_values.push(value.clone());
                format!("{column} >= ?")
            }
            Self::AtMost { column, value } => {
                bind_values.push(value.clone());
                format!("{column} <= ?")
            }
        }
    }
}

/// Conjunction of clauses. `Filter::default()` matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// Filter with no constraint.
    pub fn all() -> Self {
        Self::default()
    }

    /// Appends one clause.
    pub(crate) fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Appends the clause built from `value` only when the value is present.
    pub(crate) fn and_some<T>(self, value: Option<T>, clause: impl FnOnce(T) -> Clause) -> Self {
        match value {
            Some(value) => self.and(clause(value)),
            None => self,
        }
    }

    /// Number of clauses in the conjunction.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[cfg(test)]
    pub(crate) fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Renders `" WHERE c1 AND c2 ..."` (or an empty string) plus bind values
    /// in placeholder order.
    pub(crate) fn to_where_sql(&self) -> (String, Vec<Value>) {
        let mut bind_values = Vec::with_capacity(self.clauses.len());
        if self.clauses.is_empty() {
            return (String::new(), bind_values);
        }

        let rendered = self
            .clauses
            .iter()
            .map(|clause| clause.render(&mut bind_values))
            .collect::<Vec<_>>();
        (format!(" WHERE {}", rendered.join(" AND ")), bind_values)
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
