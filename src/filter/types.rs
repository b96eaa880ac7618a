use serde_json::Value;

/// A single store predicate. A list of predicates is combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = value`
    Eq { column: &'static str, value: Value },
    /// `column IS NULL`
    IsNull { column: &'static str },
    /// Case-insensitive substring match against any of `columns` (OR semantics)
    ContainsCi { columns: Vec<&'static str>, needle: String },
}

impl Predicate {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Predicate::Eq { column, value: value.into() }
    }

    pub fn is_null(column: &'static str) -> Self {
        Predicate::IsNull { column }
    }

    pub fn contains_ci(columns: &[&'static str], needle: impl Into<String>) -> Self {
        Predicate::ContainsCi { columns: columns.to_vec(), needle: needle.into() }
    }

    /// Evaluate against an in-memory record, reading columns through `lookup`.
    pub fn matches<F>(&self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<Value>,
    {
        match self {
            Predicate::Eq { column, value } => lookup(column).as_ref() == Some(value),
            Predicate::IsNull { column } => matches!(lookup(column), None | Some(Value::Null)),
            Predicate::ContainsCi { columns, needle } => {
                let needle = needle.to_lowercase();
                columns.iter().any(|column| match lookup(column) {
                    Some(Value::String(s)) => s.to_lowercase().contains(&needle),
                    _ => false,
                })
            }
        }
    }
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

/// Newest first, identifier as the tie-break so equal timestamps page stably.
pub const NEWEST_FIRST: &[FilterOrderInfo] = &[
    FilterOrderInfo { column: "created_at", sort: SortDirection::Desc },
    FilterOrderInfo { column: "id", sort: SortDirection::Desc },
];

/// Bounded slice of an ordered result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}
