use sigma_application::{AccountFilter, AccountQuery, AccountRepository, AccountSort};
use sigma_core::{AppError, TenantId};
use sigma_domain::{
    Account, AccountField, AccountId, FieldValue, FilterOperator, Pagination, SortDirection,
};

use super::InMemoryAccountRepository;

fn query(pagination: Option<Pagination>) -> AccountQuery {
    AccountQuery {
        filters: Vec::new(),
        sort: Vec::new(),
        search: None,
        pagination,
    }
}

fn account(name: &str, code: &str, plan: &str) -> Account {
    let mut account = Account::new(name);
    account.code = code.to_owned();
    account.plan = plan.to_owned();
    account
}

async fn seeded(tenant_id: TenantId) -> InMemoryAccountRepository {
    let repository = InMemoryAccountRepository::new();
    for (name, code, plan) in [
        ("Acme", "ACME", "gold"),
        ("Globex", "GLOBEX", "silver"),
        ("Initech", "", "gold"),
        ("Umbrella", "UMB", "bronze"),
    ] {
        let inserted = repository
            .insert_account(tenant_id, account(name, code, plan))
            .await;
        assert!(inserted.is_ok());
    }
    repository
}

fn names(accounts: &[Account]) -> Vec<&str> {
    accounts.iter().map(|account| account.name.as_str()).collect()
}

#[tokio::test]
async fn insert_assigns_identifiers_and_timestamps() {
    let repository = InMemoryAccountRepository::new();
    let tenant_id = TenantId::new();

    let Ok(first) = repository
        .insert_account(tenant_id, Account::new("Acme"))
        .await
    else {
        panic!("insert should succeed");
    };
    let Ok(second) = repository
        .insert_account(tenant_id, Account::new("Globex"))
        .await
    else {
        panic!("insert should succeed");
    };

    assert_eq!(first.id.map(|id| id.as_u64()), Some(1));
    assert_eq!(second.id.map(|id| id.as_u64()), Some(2));
    assert!(first.created_at.is_some());
    assert_eq!(first.created_at, first.updated_at);
}

#[tokio::test]
async fn listing_is_tenant_scoped_and_ordered_by_id() {
    let tenant_id = TenantId::new();
    let repository = seeded(tenant_id).await;

    let Ok(page) = repository.list_accounts(tenant_id, &query(None)).await else {
        panic!("list should succeed");
    };
    assert_eq!(names(&page.items), vec!["Acme", "Globex", "Initech", "Umbrella"]);
    assert_eq!(page.total, 4);

    let Ok(foreign) = repository
        .list_accounts(TenantId::new(), &query(None))
        .await
    else {
        panic!("list should succeed");
    };
    assert!(foreign.items.is_empty());
    assert_eq!(foreign.total, 0);
}

#[tokio::test]
async fn pagination_reports_total_of_all_matches() {
    let tenant_id = TenantId::new();
    let repository = seeded(tenant_id).await;

    let Ok(page) = repository
        .list_accounts(
            tenant_id,
            &query(Some(Pagination {
                offset: 1,
                limit: 2,
            })),
        )
        .await
    else {
        panic!("list should succeed");
    };

    assert_eq!(names(&page.items), vec!["Globex", "Initech"]);
    assert_eq!(page.total, 4);
    assert_eq!(page.offset, 1);
    assert_eq!(page.limit, 2);
}

#[tokio::test]
async fn filters_search_and_sort_combine() {
    let tenant_id = TenantId::new();
    let repository = seeded(tenant_id).await;
    let mut gold_desc = query(None);
    gold_desc.filters.push(AccountFilter {
        field: AccountField::Plan,
        operator: FilterOperator::Eq,
        value: FieldValue::Text("gold".to_owned()),
    });
    gold_desc.sort.push(AccountSort {
        field: AccountField::Name,
        direction: SortDirection::Desc,
    });

    let Ok(page) = repository.list_accounts(tenant_id, &gold_desc).await else {
        panic!("list should succeed");
    };
    assert_eq!(names(&page.items), vec!["Initech", "Acme"]);

    let mut searched = query(None);
    searched.search = Some("GLO".to_owned());
    let Ok(page) = repository.list_accounts(tenant_id, &searched).await else {
        panic!("list should succeed");
    };
    assert_eq!(names(&page.items), vec!["Globex"]);
}

#[tokio::test]
async fn like_and_range_filters() {
    let tenant_id = TenantId::new();
    let repository = seeded(tenant_id).await;
    let mut like = query(None);
    like.filters.push(AccountFilter {
        field: AccountField::Name,
        operator: FilterOperator::Like,
        value: FieldValue::Text("E".to_owned()),
    });
    like.filters.push(AccountFilter {
        field: AccountField::Id,
        operator: FilterOperator::Gt,
        value: FieldValue::Integer(1),
    });

    let Ok(page) = repository.list_accounts(tenant_id, &like).await else {
        panic!("list should succeed");
    };

    assert_eq!(names(&page.items), vec!["Globex", "Initech", "Umbrella"]);
}

#[tokio::test]
async fn missing_values_never_match_comparisons() {
    let tenant_id = TenantId::new();
    let repository = seeded(tenant_id).await;
    let mut expiring = query(None);
    expiring.filters.push(AccountFilter {
        field: AccountField::Expiration,
        operator: FilterOperator::Lt,
        value: FieldValue::parse(sigma_domain::FieldKind::Date, "2030-01-01")
            .unwrap_or(FieldValue::Null),
    });

    let Ok(page) = repository.list_accounts(tenant_id, &expiring).await else {
        panic!("list should succeed");
    };

    assert!(page.items.is_empty());
}

#[tokio::test]
async fn duplicate_code_is_conflict() {
    let tenant_id = TenantId::new();
    let repository = seeded(tenant_id).await;

    let result = repository
        .insert_account(tenant_id, account("Other", "ACME", ""))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let Ok(in_use) = repository.code_in_use(tenant_id, "ACME", None).await else {
        panic!("lookup should succeed");
    };
    assert!(in_use);

    let Ok(own_code) = repository
        .code_in_use(tenant_id, "ACME", AccountId::new(1).ok())
        .await
    else {
        panic!("lookup should succeed");
    };
    assert!(!own_code);
}

#[tokio::test]
async fn update_preserves_creation_time_and_misses_unknown_rows() {
    let tenant_id = TenantId::new();
    let repository = seeded(tenant_id).await;
    let Ok(id) = AccountId::new(1) else {
        panic!("id should be valid");
    };
    let Ok(Some(mut stored)) = repository.find_account(tenant_id, id).await else {
        panic!("seeded account should exist");
    };
    let created_at = stored.created_at;
    stored.name = "Acme Corp".to_owned();
    stored.created_at = None;

    let Ok(Some(updated)) = repository.update_account(tenant_id, stored.clone()).await else {
        panic!("update should succeed");
    };
    assert_eq!(updated.name, "Acme Corp");
    assert_eq!(updated.created_at, created_at);

    let Ok(missing) = repository.update_account(TenantId::new(), stored).await else {
        panic!("update should not fail");
    };
    assert!(missing.is_none());
}

#[tokio::test]
async fn delete_returns_removed_row() {
    let tenant_id = TenantId::new();
    let repository = seeded(tenant_id).await;
    let Ok(id) = AccountId::new(2) else {
        panic!("id should be valid");
    };

    let Ok(Some(removed)) = repository.delete_account(tenant_id, id).await else {
        panic!("delete should return the row");
    };
    assert_eq!(removed.name, "Globex");

    let Ok(again) = repository.delete_account(tenant_id, id).await else {
        panic!("delete should not fail");
    };
    assert!(again.is_none());
}

fn padded_code(id: AccountId) -> String {
    format!("ACC-{:06}", id.as_u64())
}

#[tokio::test]
async fn generated_code_is_derived_from_assigned_id() {
    let repository = InMemoryAccountRepository::new();
    let tenant_id = TenantId::new();

    let Ok(created) = repository
        .insert_account_with_generated_code(tenant_id, Account::new("Acme"), padded_code)
        .await
    else {
        panic!("insert should succeed");
    };

    assert_eq!(created.id.map(|id| id.as_u64()), Some(1));
    assert_eq!(created.code, "ACC-000001");
}

#[tokio::test]
async fn generated_code_conflict_stores_nothing() {
    let repository = InMemoryAccountRepository::new();
    let tenant_id = TenantId::new();
    assert!(
        repository
            .insert_account(tenant_id, account("Manual", "ACC-000002", ""))
            .await
            .is_ok()
    );

    let result = repository
        .insert_account_with_generated_code(tenant_id, Account::new("Auto"), padded_code)
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let Ok(page) = repository.list_accounts(tenant_id, &query(None)).await else {
        panic!("list should succeed");
    };
    assert_eq!(names(&page.items), vec!["Manual"]);

    // The rejected insert did not burn an identifier.
    let Ok(next) = repository
        .insert_account(tenant_id, Account::new("Next"))
        .await
    else {
        panic!("insert should succeed");
    };
    assert_eq!(next.id.map(|id| id.as_u64()), Some(2));
}
