use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::{validate_identifier, FilterWhere};
use super::types::{Condition, FilterOrderInfo, FilterRecord, SqlResult};

/// A `SELECT *` over one table: typed WHERE conditions, ORDER BY, LIMIT/OFFSET.
/// The same filter renders to SQL or runs in-process over records.
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: String,
    conditions: Vec<Condition>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i32>,
    offset: Option<i32>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        validate_identifier(&table_name).map_err(FilterError::InvalidTableName)?;
        Ok(Self {
            table_name,
            conditions: vec![],
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn where_clause(mut self, conditions: Vec<Condition>) -> Result<Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.conditions = conditions;
        Ok(self)
    }

    pub fn order(mut self, order_by: &str) -> Result<Self, FilterError> {
        self.order_data = FilterOrder::parse(order_by)?;
        Ok(self)
    }

    pub fn limit(mut self, limit: i32, offset: Option<i32>) -> Result<Self, FilterError> {
        if limit < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); }
        if let Some(off) = offset { if off < 0 { return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string())); } }
        self.limit = Some(limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0)?;
        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            format!("WHERE {}", where_clause),
            FilterOrder::generate(&self.order_data),
            self.build_limit_clause(),
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params })
    }

    /// WHERE body only, numbering placeholders after `starting_param_index`.
    /// Used by UPDATE/DELETE statements that bind their own values first.
    pub fn to_where_sql(&self, starting_param_index: usize) -> Result<SqlResult, FilterError> {
        let (query, params) = FilterWhere::generate(&self.conditions, starting_param_index)?;
        Ok(SqlResult { query, params })
    }

    /// Run the filter over in-memory records: match, stable sort, offset, limit.
    pub fn apply<R: FilterRecord + Clone>(&self, records: impl IntoIterator<Item = R>) -> Vec<R> {
        let mut matched: Vec<R> = records
            .into_iter()
            .filter(|r| FilterWhere::matches(&self.conditions, r))
            .collect();
        if !self.order_data.is_empty() {
            matched.sort_by(|a, b| FilterOrder::compare(&self.order_data, a, b));
        }
        let offset = self.offset.unwrap_or(0).max(0) as usize;
        let limit = self.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        matched.into_iter().skip(offset).take(limit).collect()
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            (None, Some(o)) => format!("OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}
