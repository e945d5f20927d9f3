//! Normalized pagination, filter and sort descriptor.

use std::collections::BTreeMap;

use sigma_core::{AppError, AppResult};

/// Comparison operator of a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Case-insensitive substring match.
    Like,
}

impl FilterOperator {
    /// Parses a transport operator token.
    pub fn parse_transport(value: &str) -> AppResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "eq" => Ok(Self::Eq),
            "ne" => Ok(Self::Ne),
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            "like" => Ok(Self::Like),
            other => Err(AppError::Validation(format!(
                "unknown filter operator '{other}'"
            ))),
        }
    }

    /// Returns the transport token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
        }
    }

    /// Returns the SQL comparison operator, `None` for `like`.
    #[must_use]
    pub fn sql_operator(&self) -> Option<&'static str> {
        match self {
            Self::Eq => Some("="),
            Self::Ne => Some("<>"),
            Self::Gt => Some(">"),
            Self::Gte => Some(">="),
            Self::Lt => Some("<"),
            Self::Lte => Some("<="),
            Self::Like => None,
        }
    }
}

/// Sort direction of one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// One `field operator value` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    /// Transport field name.
    pub field: String,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Raw comparison literal.
    pub value: String,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Transport field name.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

/// Offset pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Rows skipped.
    pub offset: u64,
    /// Maximum rows returned.
    pub limit: u64,
}

/// Fully resolved query over one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    /// Resource the descriptor was resolved for.
    pub resource: String,
    /// Pagination window.
    pub pagination: Pagination,
    /// Conjunctive filter conditions.
    pub filters: Vec<FilterCondition>,
    /// Sort keys in priority order.
    pub sort: Vec<SortField>,
    /// Optional free-text search term.
    pub search: Option<String>,
    /// Additional resource-scoped options.
    pub options: BTreeMap<String, String>,
}

impl QueryDescriptor {
    /// Creates a descriptor with the given window and no conditions.
    #[must_use]
    pub fn unfiltered(resource: impl Into<String>, pagination: Pagination) -> Self {
        Self {
            resource: resource.into(),
            pagination,
            filters: Vec::new(),
            sort: Vec::new(),
            search: None,
            options: BTreeMap::new(),
        }
    }

    /// Returns a resource-scoped option value.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Returns whether a boolean option is switched on.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.option(key)
            .is_some_and(|value| matches!(value, "1" | "true" | "yes"))
    }
}
