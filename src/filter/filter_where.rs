use super::error::FilterError;
use super::types::{Condition, FilterOp, FilterRecord, FilterValue};

pub struct FilterWhere {
    param_values: Vec<FilterValue>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Render `conditions` (ANDed) as SQL. Placeholders start at
    /// `$starting_param_index + 1`.
    pub fn generate(conditions: &[Condition], starting_param_index: usize) -> Result<(String, Vec<FilterValue>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let sql = filter_where.build_all(conditions, " AND ", "1=1")?;
        Ok((sql, filter_where.param_values))
    }

    pub fn validate(conditions: &[Condition]) -> Result<(), FilterError> {
        for condition in conditions {
            match condition {
                Condition::Field { column, op, value } => {
                    validate_identifier(column).map_err(FilterError::InvalidColumn)?;
                    if *op == FilterOp::ILike && !matches!(value, FilterValue::Text(_)) {
                        return Err(FilterError::InvalidWhereClause(format!("ILIKE on '{}' requires a text pattern", column)));
                    }
                }
                Condition::And(inner) | Condition::Or(inner) => Self::validate(inner)?,
            }
        }
        Ok(())
    }

    /// Evaluate `conditions` (ANDed) against an in-memory record with the
    /// same semantics as the generated SQL.
    pub fn matches<R: FilterRecord>(conditions: &[Condition], record: &R) -> bool {
        conditions.iter().all(|c| Self::matches_one(c, record))
    }

    fn matches_one<R: FilterRecord>(condition: &Condition, record: &R) -> bool {
        match condition {
            Condition::Field { column, op, value } => {
                let Some(actual) = record.field(column) else { return false };
                match op {
                    FilterOp::Eq => &actual == value,
                    FilterOp::Ne => &actual != value,
                    FilterOp::ILike => match (&actual, value) {
                        (FilterValue::Text(text), FilterValue::Text(pattern)) => ilike_match(pattern, text),
                        _ => false,
                    },
                }
            }
            Condition::And(inner) => inner.iter().all(|c| Self::matches_one(c, record)),
            Condition::Or(inner) => inner.iter().any(|c| Self::matches_one(c, record)),
        }
    }

    fn build_all(&mut self, conditions: &[Condition], joiner: &str, empty: &str) -> Result<String, FilterError> {
        if conditions.is_empty() {
            return Ok(empty.to_string());
        }
        let mut parts = Vec::with_capacity(conditions.len());
        for condition in conditions {
            parts.push(self.build_sql_condition(condition)?);
        }
        Ok(parts.join(joiner))
    }

    fn build_sql_condition(&mut self, condition: &Condition) -> Result<String, FilterError> {
        match condition {
            Condition::Field { column, op, value } => {
                validate_identifier(column).map_err(FilterError::InvalidColumn)?;
                let quoted_column = format!("\"{}\"", column);
                let placeholder = self.param(value.clone());
                Ok(match op {
                    FilterOp::Eq => format!("{} = {}", quoted_column, placeholder),
                    FilterOp::Ne => format!("{} <> {}", quoted_column, placeholder),
                    FilterOp::ILike => format!("{} ILIKE {} ESCAPE '\\'", quoted_column, placeholder),
                })
            }
            Condition::And(inner) => Ok(format!("({})", self.build_all(inner, " AND ", "1=1")?)),
            Condition::Or(inner) => Ok(format!("({})", self.build_all(inner, " OR ", "1=0")?)),
        }
    }

    fn param(&mut self, value: FilterValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

pub(crate) fn validate_identifier(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("Invalid identifier format: {:?}", name));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LikeToken {
    Literal(char),
    AnyOne,
    AnyMany,
}

fn tokenize_like(pattern: &str) -> Vec<LikeToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            '%' => LikeToken::AnyMany,
            '_' => LikeToken::AnyOne,
            other => LikeToken::Literal(other),
        });
    }
    tokens
}

/// Case-insensitive LIKE matching with `\` as the escape character.
pub fn ilike_match(pattern: &str, text: &str) -> bool {
    let tokens = tokenize_like(&pattern.to_lowercase());
    let text: Vec<char> = text.to_lowercase().chars().collect();

    // Greedy wildcard matching with single backtrack point.
    let (mut t, mut p) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        match tokens.get(p) {
            Some(LikeToken::AnyMany) => {
                star = Some((p, t));
                p += 1;
            }
            Some(LikeToken::AnyOne) => {
                p += 1;
                t += 1;
            }
            Some(LikeToken::Literal(c)) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    star = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }
    tokens[p..].iter().all(|tok| *tok == LikeToken::AnyMany)
}
