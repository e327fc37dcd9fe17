use std::cmp::Ordering;

use super::error::FilterError;
use super::filter_where::validate_identifier;
use super::types::{FilterOrderInfo, FilterRecord, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse "created_at desc, title" style specs.
    pub fn parse(order_by: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in order_by.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                validate_identifier(col).map_err(FilterError::InvalidColumn)?;
                let dir = it.next().unwrap_or("asc");
                let sort = if dir.eq_ignore_ascii_case("desc") { SortDirection::Desc } else { SortDirection::Asc };
                out.push(FilterOrderInfo { column: col.to_string(), sort });
            }
        }
        Ok(out)
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() { return String::new(); }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }

    /// Compare two records by the given order. Missing or incomparable
    /// columns compare equal so a stable sort keeps input order.
    pub fn compare<R: FilterRecord>(infos: &[FilterOrderInfo], a: &R, b: &R) -> Ordering {
        for info in infos {
            let ord = match (a.field(&info.column), b.field(&info.column)) {
                (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ord = match info.sort {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}
