//! Resolution of raw request parameters into a [`QueryDescriptor`].
//!
//! Parameters are accepted either plain (`page=2`) or namespaced by the
//! resource (`accounts.page=2`); a namespaced key always wins over the plain
//! one. Recognized keys are `page`, `page_size`, `offset`, `limit`, `sort`,
//! `filter` (repeatable, `field:operator:value`) and `search`. Any other
//! namespaced key is kept as a resource option.

use std::collections::BTreeMap;

use sigma_core::{AppError, AppResult};
use sigma_domain::{
    FilterCondition, FilterOperator, Pagination, QueryDescriptor, SortDirection, SortField,
};

const RECOGNIZED_KEYS: &[&str] = &[
    "page",
    "page_size",
    "offset",
    "limit",
    "sort",
    "filter",
    "search",
];

/// Resource-specific fallbacks and bounds applied during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefaults {
    /// Page size applied when none is requested.
    pub limit: u64,
    /// Upper bound for requested page sizes.
    pub max_limit: u64,
    /// Sort applied when none is requested.
    pub sort: Vec<SortField>,
    /// Field names accepted in filters and sort keys.
    pub fields: Vec<&'static str>,
}

impl QueryDefaults {
    /// Creates defaults for a resource exposing the given fields.
    #[must_use]
    pub fn new(fields: Vec<&'static str>) -> Self {
        Self {
            limit: 20,
            max_limit: 500,
            sort: Vec::new(),
            fields,
        }
    }

    /// Sets the default sort.
    #[must_use]
    pub fn with_sort(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort = vec![SortField {
            field: field.to_owned(),
            direction,
        }];
        self
    }

    /// Sets the default and maximum page sizes.
    #[must_use]
    pub fn with_limits(mut self, limit: u64, max_limit: u64) -> Self {
        self.limit = limit;
        self.max_limit = max_limit;
        self
    }

    fn knows_field(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }
}

/// Resolves raw query pairs into a descriptor scoped to `resource_name`.
///
/// Either every parameter resolves or the whole request is rejected with
/// [`AppError::Validation`].
pub fn resolve_query(
    raw: &[(String, String)],
    resource_name: &str,
    defaults: &QueryDefaults,
) -> AppResult<QueryDescriptor> {
    let params = RawParams::collect(raw, resource_name);

    let pagination = resolve_pagination(
        params.last("offset"),
        params.last("limit"),
        params.last("page"),
        params.last("page_size"),
        defaults,
    )?;

    let filters = params
        .values("filter")
        .into_iter()
        .filter(|value| !value.trim().is_empty())
        .map(|value| parse_filter(value, defaults))
        .collect::<AppResult<Vec<_>>>()?;

    let sort = match params.last("sort").filter(|value| !value.trim().is_empty()) {
        Some(value) => parse_sort(value, defaults)?,
        None => defaults.sort.clone(),
    };

    let search = params
        .last("search")
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned);

    Ok(QueryDescriptor {
        resource: resource_name.to_owned(),
        pagination,
        filters,
        sort,
        search,
        options: params.options,
    })
}

struct RawParams<'a> {
    plain: BTreeMap<&'a str, Vec<&'a str>>,
    scoped: BTreeMap<&'a str, Vec<&'a str>>,
    options: BTreeMap<String, String>,
}

impl<'a> RawParams<'a> {
    fn collect(raw: &'a [(String, String)], resource_name: &str) -> Self {
        let prefix = format!("{resource_name}.");
        let mut params = Self {
            plain: BTreeMap::new(),
            scoped: BTreeMap::new(),
            options: BTreeMap::new(),
        };

        for (key, value) in raw {
            if let Some(scoped_key) = key.strip_prefix(prefix.as_str()) {
                if RECOGNIZED_KEYS.contains(&scoped_key) {
                    params
                        .scoped
                        .entry(scoped_key)
                        .or_default()
                        .push(value.as_str());
                } else if !scoped_key.is_empty() {
                    params.options.insert(scoped_key.to_owned(), value.clone());
                }
            } else if RECOGNIZED_KEYS.contains(&key.as_str()) {
                params
                    .plain
                    .entry(key.as_str())
                    .or_default()
                    .push(value.as_str());
            }
        }

        params
    }

    fn values(&self, key: &str) -> Vec<&'a str> {
        self.scoped
            .get(key)
            .or_else(|| self.plain.get(key))
            .cloned()
            .unwrap_or_default()
    }

    fn last(&self, key: &str) -> Option<&'a str> {
        self.values(key).last().copied()
    }
}

fn resolve_pagination(
    offset: Option<&str>,
    limit: Option<&str>,
    page: Option<&str>,
    page_size: Option<&str>,
    defaults: &QueryDefaults,
) -> AppResult<Pagination> {
    let offset = offset.map(|value| parse_count("offset", value)).transpose()?;
    let limit = limit.map(|value| parse_size("limit", value)).transpose()?;
    let page = page.map(|value| parse_size("page", value)).transpose()?;
    let page_size = page_size
        .map(|value| parse_size("page_size", value))
        .transpose()?;

    let uses_offset_style = offset.is_some() || limit.is_some();
    let uses_page_style = page.is_some() || page_size.is_some();

    if uses_offset_style && uses_page_style {
        return Err(AppError::Validation(
            "use either offset/limit or page/page_size, not both".to_owned(),
        ));
    }

    if uses_page_style {
        let size = page_size.unwrap_or(defaults.limit).min(defaults.max_limit);
        let page = page.unwrap_or(1);
        let offset = (page - 1).checked_mul(size).ok_or_else(|| {
            AppError::Validation(format!("page {page} is out of range"))
        })?;

        return Ok(Pagination {
            offset,
            limit: size,
        });
    }

    Ok(Pagination {
        offset: offset.unwrap_or(0),
        limit: limit.unwrap_or(defaults.limit).min(defaults.max_limit),
    })
}

fn parse_count(name: &str, value: &str) -> AppResult<u64> {
    let parsed = value.trim().parse::<i64>().map_err(|error| {
        AppError::Validation(format!("{name} must be an integer, got '{value}': {error}"))
    })?;

    u64::try_from(parsed)
        .map_err(|_| AppError::Validation(format!("{name} must not be negative, got {parsed}")))
}

fn parse_size(name: &str, value: &str) -> AppResult<u64> {
    let parsed = parse_count(name, value)?;
    if parsed == 0 {
        return Err(AppError::Validation(format!(
            "{name} must be greater than zero"
        )));
    }

    Ok(parsed)
}

fn parse_filter(value: &str, defaults: &QueryDefaults) -> AppResult<FilterCondition> {
    let mut parts = value.splitn(3, ':');
    let (Some(field), Some(operator), Some(literal)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(AppError::Validation(format!(
            "filter '{value}' must have the form field:operator:value"
        )));
    };

    let field = field.trim();
    if field.is_empty() {
        return Err(AppError::Validation(format!(
            "filter '{value}' is missing a field name"
        )));
    }

    if !defaults.knows_field(field) {
        return Err(AppError::Validation(format!(
            "unknown filter field '{field}'"
        )));
    }

    Ok(FilterCondition {
        field: field.to_owned(),
        operator: FilterOperator::parse_transport(operator)?,
        value: literal.to_owned(),
    })
}

fn parse_sort(value: &str, defaults: &QueryDefaults) -> AppResult<Vec<SortField>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (field, direction) = match entry.strip_prefix('-') {
                Some(field) => (field, SortDirection::Desc),
                None => (entry.trim_start_matches('+'), SortDirection::Asc),
            };

            if !defaults.knows_field(field) {
                return Err(AppError::Validation(format!(
                    "unknown sort field '{field}'"
                )));
            }

            Ok(SortField {
                field: field.to_owned(),
                direction,
            })
        })
        .collect()
}
