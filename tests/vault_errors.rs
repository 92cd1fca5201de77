//! Vault Error and Configuration Tests
//!
//! Validation and paging errors surface before the store is touched;
//! store failures surface as they are.

mod common;

use std::io::Write;

use common::*;
use vaultdb::criteria::{CustomCriteria, PageSpecification, QueryCriteria, Sort, SortColumn};
use vaultdb::schema::Attribute;
use vaultdb::{ConfigError, VaultConfig, VaultQuery, VaultQueryError};

// =============================================================================
// Validation Tests
// =============================================================================

/// An oversized page fails even when the store is closed: no store access.
#[test]
fn test_paging_rejected_before_store_access() {
    let service = service();
    fund(&service);
    service.store().close();

    let err = service
        .query_by(&VaultQuery::new(cash_type()).with_paging(PageSpecification::new(0, 513)))
        .unwrap_err();
    assert!(matches!(err, VaultQueryError::Paging(_)));
    assert!(err.is_rejected_before_store());

    let err = service
        .track_by(&VaultQuery::new(cash_type()).with_paging(PageSpecification::new(-1, 10)))
        .unwrap_err();
    assert!(matches!(err, VaultQueryError::Paging(_)));
    assert_eq!(service.store().publisher().subscriber_count(), 0);
}

/// Omitted paging means the first page at the configured ceiling.
#[test]
fn test_default_paging_uses_configured_page_size() {
    let service = service_with(VaultConfig::default().with_max_page_size(10));
    fund(&service);

    let page = service.query_by(&VaultQuery::new(cash_type())).unwrap();
    assert_eq!(page.len(), 10);
    assert_eq!(page.total_states_available, 15);

    let err = service
        .query_by(&VaultQuery::new(cash_type()).with_paging(PageSpecification::new(0, 11)))
        .unwrap_err();
    assert_eq!(err.code(), "VAULT_PAGING_INVALID");
}

/// The configured ceiling cannot lift pages past the global maximum.
#[test]
fn test_page_size_ceiling_capped_at_maximum() {
    assert!(matches!(
        VaultConfig::from_json_str(r#"{"max_page_size": 100000}"#),
        Err(ConfigError::InvalidValue {
            field: "max_page_size",
            ..
        })
    ));

    let service = service_with(VaultConfig::default().with_max_page_size(100_000));
    fund(&service);
    let err = service
        .query_by(&VaultQuery::new(cash_type()).with_paging(PageSpecification::new(0, 5000)))
        .unwrap_err();
    assert!(matches!(err, VaultQueryError::Paging(_)));
}

#[test]
fn test_unknown_attribute_rejected() {
    let service = service();
    let colour = Attribute::custom(CASH_SCHEMA, "colour");

    let err = service
        .query_by(&VaultQuery::new(cash_type()).with_criteria(QueryCriteria::custom(colour.equal("red"))))
        .unwrap_err();
    assert!(matches!(err, VaultQueryError::Validation(_)));
    assert_eq!(err.code(), "VAULT_UNKNOWN_ATTRIBUTE");

    let err = service
        .query_by(&VaultQuery::new(cash_type()).with_sort(Sort::by(SortColumn::asc(linear_number()))))
        .unwrap_err();
    assert_eq!(err.code(), "VAULT_UNKNOWN_ATTRIBUTE");
}

#[test]
fn test_malformed_criteria_rejected() {
    assert!(CustomCriteria::all(Vec::new()).is_err());

    let service = service();
    let err = service
        .query_by(
            &VaultQuery::new(cash_type())
                .with_criteria(QueryCriteria::custom(currency().in_values(Vec::<&str>::new()))),
        )
        .unwrap_err();
    assert_eq!(err.code(), "VAULT_QUERY_INVALID");

    let err = service
        .query_by(&VaultQuery::for_types(Vec::new()))
        .unwrap_err();
    assert_eq!(err.code(), "VAULT_QUERY_INVALID");
}

/// A failed query leaves the service usable.
#[test]
fn test_failure_does_not_poison_service() {
    let service = service();
    fund(&service);

    let _ = service.query_by(&VaultQuery::new(cash_type()).with_paging(PageSpecification::new(0, 0)));
    let page = service.query_by(&VaultQuery::new(cash_type())).unwrap();
    assert_eq!(page.total_states_available, 15);

    let metrics = service.metrics().snapshot();
    assert_eq!(metrics.queries_rejected, 1);
    assert_eq!(metrics.queries_executed, 1);
}

// =============================================================================
// Store Access Tests
// =============================================================================

#[test]
fn test_closed_store_reports_store_access() {
    let service = service();
    fund(&service);
    service.store().close();

    let err = service.query_by(&VaultQuery::new(cash_type())).unwrap_err();
    assert!(matches!(err, VaultQueryError::StoreAccess(_)));
    assert_eq!(err.code(), "VAULT_STORE_UNAVAILABLE");

    let err = service.track_by(&VaultQuery::new(cash_type())).unwrap_err();
    assert!(matches!(err, VaultQueryError::StoreAccess(_)));
    assert_eq!(service.store().publisher().subscriber_count(), 0);
}

// =============================================================================
// Explain Tests
// =============================================================================

#[test]
fn test_explain_plan() {
    let service = service();
    let explain = service.explain(
        &VaultQuery::new(cash_type())
            .with_criteria(QueryCriteria::custom(currency().equal("USD")))
            .with_sort(Sort::by(SortColumn::desc(pennies()))),
    );
    let rendered = explain.to_string();
    assert!(explain.accepted);
    assert!(rendered.contains("Scan: Cash"));
    assert!(rendered.contains("Scan Status: UNCONSUMED"));

    let rejected = service.explain(
        &VaultQuery::new(cash_type()).with_paging(PageSpecification::new(0, 1000)),
    );
    assert!(!rejected.accepted);
    assert!(rejected.to_string().contains("VAULT_PAGING_INVALID"));
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"max_page_size": 20, "explain_queries": true}}"#).unwrap();

    let config = VaultConfig::from_file(file.path()).unwrap();
    assert_eq!(config.max_page_size, 20);
    assert!(config.explain_queries);
    assert_eq!(config.max_subscribers, 1024);

    let service = service_with(config);
    fund(&service);
    let err = service
        .query_by(&VaultQuery::new(cash_type()).with_paging(PageSpecification::new(0, 21)))
        .unwrap_err();
    assert!(matches!(err, VaultQueryError::Paging(_)));
    let page = service
        .query_by(&VaultQuery::new(cash_type()).with_paging(PageSpecification::new(0, 20)))
        .unwrap();
    assert_eq!(page.len(), 15);
}

#[test]
fn test_config_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("vault.json");
    assert!(matches!(
        VaultConfig::from_file(&missing),
        Err(ConfigError::Io { .. })
    ));

    std::fs::write(&missing, r#"{"max_subscribers": 0}"#).unwrap();
    assert!(matches!(
        VaultConfig::from_file(&missing),
        Err(ConfigError::InvalidValue { field: "max_subscribers", .. })
    ));
}
