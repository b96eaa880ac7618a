use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::{validate_identifier, FilterWhere};
use super::types::{FilterOrderInfo, Predicate, SqlResult, Window};

/// SQL statement builder for list/count queries over one table
pub struct Filter {
    table_name: String,
    predicates: Vec<Predicate>,
    order_data: Vec<FilterOrderInfo>,
    window: Option<Window>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            predicates: vec![],
            order_data: vec![],
            window: None,
        })
    }

    pub fn where_all(&mut self, predicates: &[Predicate]) -> &mut Self {
        self.predicates = predicates.to_vec();
        self
    }

    pub fn order(&mut self, order: &[FilterOrderInfo]) -> &mut Self {
        self.order_data = order.to_vec();
        self
    }

    pub fn window(&mut self, window: Window) -> Result<&mut Self, FilterError> {
        if window.limit < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); }
        if window.offset < 0 { return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string())); }
        self.window = Some(window);
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.predicates, 0)?;
        let order_clause = FilterOrder::generate(&self.order_data)?;
        let limit_clause = self.build_limit_clause();

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.predicates, 0)?;
        let query = format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_clause);
        Ok(SqlResult { query, params })
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() { return Err(FilterError::InvalidTableName("Table name cannot be empty".to_string())); }
        if !validate_identifier(name) {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }

    fn build_limit_clause(&self) -> String {
        match self.window {
            Some(Window { offset: 0, limit }) => format!("LIMIT {}", limit),
            Some(Window { offset, limit }) => format!("LIMIT {} OFFSET {}", limit, offset),
            None => String::new(),
        }
    }
}
