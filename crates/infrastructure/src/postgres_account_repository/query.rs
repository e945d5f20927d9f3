use sqlx::{Postgres, QueryBuilder};

use sigma_application::{AccountFilter, AccountQuery};
use sigma_core::{AppError, AppResult, TenantId};
use sigma_domain::{AccountField, FieldValue, SortDirection};

/// Column backing each queryable field. Only these names reach the SQL text.
fn column(field: AccountField) -> &'static str {
    match field {
        AccountField::Id => "id",
        AccountField::Name => "name",
        AccountField::LegalName => "legal_name",
        AccountField::ServerAddress => "server_address",
        AccountField::Expiration => "expiration",
        AccountField::Plan => "plan",
        AccountField::Detail => "detail",
        AccountField::Phone => "phone",
        AccountField::Email => "email",
        AccountField::Website => "website",
        AccountField::Type => "account_type",
        AccountField::Code => "code",
        AccountField::CreatedAt => "created_at",
        AccountField::UpdatedAt => "updated_at",
    }
}

pub(super) fn push_where(
    builder: &mut QueryBuilder<'_, Postgres>,
    tenant_id: TenantId,
    query: &AccountQuery,
) -> AppResult<()> {
    builder.push(" WHERE tenant_id = ");
    builder.push_bind(tenant_id.as_uuid());

    for filter in &query.filters {
        builder.push(" AND ");
        push_filter(builder, filter)?;
    }

    if let Some(search) = &query.search {
        let pattern = like_pattern(search.as_str());
        builder.push(" AND (");
        let searchable = AccountField::all()
            .iter()
            .filter(|field| field.is_searchable());
        for (index, field) in searchable.enumerate() {
            if index > 0 {
                builder.push(" OR ");
            }
            builder.push(column(*field));
            builder.push(" ILIKE ");
            builder.push_bind(pattern.clone());
        }
        builder.push(')');
    }

    Ok(())
}

pub(super) fn push_order_by(builder: &mut QueryBuilder<'_, Postgres>, query: &AccountQuery) {
    builder.push(" ORDER BY ");
    for sort in &query.sort {
        builder.push(column(sort.field));
        match sort.direction {
            SortDirection::Asc => builder.push(" ASC NULLS FIRST, "),
            SortDirection::Desc => builder.push(" DESC NULLS LAST, "),
        };
    }
    builder.push("id ASC");
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &AccountFilter) -> AppResult<()> {
    let column = column(filter.field);

    let Some(operator) = filter.operator.sql_operator() else {
        builder.push(column);
        builder.push("::TEXT ILIKE ");
        builder.push_bind(like_pattern(filter.value.to_search_text().as_str()));
        return Ok(());
    };

    builder.push(column);
    builder.push(' ');
    builder.push(operator);
    builder.push(' ');

    match &filter.value {
        FieldValue::Integer(value) => {
            let value = i64::try_from(*value).map_err(|error| {
                AppError::Validation(format!("filter value '{value}' is out of range: {error}"))
            })?;
            builder.push_bind(value);
        }
        FieldValue::Text(value) => {
            builder.push_bind(value.clone());
        }
        FieldValue::Date(value) => {
            builder.push_bind(*value);
        }
        FieldValue::Timestamp(value) => {
            builder.push_bind(*value);
        }
        FieldValue::Null => {
            return Err(AppError::Validation(format!(
                "filter on '{}' with operator '{}' needs a value",
                filter.field.as_str(),
                filter.operator.as_str()
            )));
        }
    }

    Ok(())
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
