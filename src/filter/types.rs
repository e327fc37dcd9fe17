use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use uuid::Uuid;

/// A typed bind parameter. Postgres is strict about parameter types, so
/// values keep their column type all the way to the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Uuid(Uuid),
    Bool(bool),
    Int(i64),
    Timestamp(DateTime<Utc>),
    TextArray(Vec<String>),
}

impl FilterValue {
    /// Ordering between values of the same kind; mixed kinds are unordered.
    pub fn compare(&self, other: &FilterValue) -> Option<Ordering> {
        use FilterValue::*;
        match (self, other) {
            (Text(a), Text(b)) => Some(a.cmp(b)),
            (Uuid(a), Uuid(b)) => Some(a.cmp(b)),
            (Bool(a), Bool(b)) => Some(a.cmp(b)),
            (Int(a), Int(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            (TextArray(a), TextArray(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    /// Case-insensitive LIKE. `\` escapes `%`, `_` and itself.
    ILike,
}

/// One predicate of a WHERE clause. A list of conditions is implicitly ANDed.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Field {
        column: String,
        op: FilterOp,
        value: FilterValue,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    pub fn eq(column: impl Into<String>, value: FilterValue) -> Self {
        Condition::Field { column: column.into(), op: FilterOp::Eq, value }
    }

    pub fn ne(column: impl Into<String>, value: FilterValue) -> Self {
        Condition::Field { column: column.into(), op: FilterOp::Ne, value }
    }

    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Condition::Field { column: column.into(), op: FilterOp::ILike, value: FilterValue::Text(pattern.into()) }
    }

    /// Case-insensitive substring match; LIKE metacharacters in `needle` are literal.
    pub fn contains_ignore_case(column: impl Into<String>, needle: &str) -> Self {
        Self::ilike(column, format!("%{}%", escape_like(needle)))
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Condition::And(conditions)
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Condition::Or(conditions)
    }
}

/// Escape `\`, `%` and `_` for use inside a LIKE pattern.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Column access for in-process evaluation of conditions.
pub trait FilterRecord {
    fn field(&self, column: &str) -> Option<FilterValue>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<FilterValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_like_metacharacters() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("milk"), "milk");
    }

    #[test]
    fn contains_wraps_pattern() {
        assert_eq!(
            Condition::contains_ignore_case("title", "a_b"),
            Condition::ilike("title", "%a\\_b%")
        );
    }
}
