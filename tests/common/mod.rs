//! Shared fixtures for vault integration tests
//!
//! Cash deposits use fixed lot sizes so aggregate results are exact:
//! USD 600 in 6 lots, GBP 400 in 4 lots, CHF 500 in 5 lots.

#![allow(dead_code)]

use vaultdb::contract::{
    ContractState, Party, RecordType, StateRef, TypeRegistry, UniqueIdentifier,
};
use vaultdb::schema::{Attribute, FieldKind, MappedSchema, SchemaRegistry};
use vaultdb::storage::VaultTransaction;
use vaultdb::{VaultConfig, VaultQueryService};

pub const CASH_SCHEMA: &str = "CashSchemaV1";
pub const LINEAR_SCHEMA: &str = "DummyLinearSchemaV1";

pub const USD_LOTS: [&[i64]; 3] = [&[100], &[113, 87], &[100, 100, 100]];
pub const GBP_LOTS: &[i64] = &[103, 93, 102, 102];
pub const CHF_LOTS: &[i64] = &[102, 94, 100, 102, 102];

pub fn cash_type() -> RecordType {
    RecordType::new("Cash")
}

pub fn linear_type() -> RecordType {
    RecordType::new("DummyLinear")
}

pub fn deal_type() -> RecordType {
    RecordType::new("DummyDeal")
}

pub fn registry() -> SchemaRegistry {
    let mut types = TypeRegistry::new();
    types.register_abstract(RecordType::deal_state(), [RecordType::linear_state()]);
    types.register_concrete(cash_type(), [RecordType::fungible_asset()]);
    types.register_concrete(linear_type(), [RecordType::linear_state()]);
    types.register_concrete(deal_type(), [RecordType::deal_state()]);

    let mut schemas = SchemaRegistry::new(types);
    schemas
        .register(
            MappedSchema::new(CASH_SCHEMA, 1)
                .mapping(cash_type())
                .field("pennies", FieldKind::Int)
                .field("currency", FieldKind::Text)
                .field("issuer", FieldKind::Text),
        )
        .expect("cash schema");
    schemas
        .register(
            MappedSchema::new(LINEAR_SCHEMA, 1)
                .mapping(linear_type())
                .mapping(deal_type())
                .field("linear_number", FieldKind::Int)
                .field("linear_string", FieldKind::Text),
        )
        .expect("linear schema");
    schemas
}

pub fn service() -> VaultQueryService {
    service_with(VaultConfig::default())
}

pub fn service_with(config: VaultConfig) -> VaultQueryService {
    VaultQueryService::open(registry(), config)
}

pub fn pennies() -> Attribute {
    Attribute::custom(CASH_SCHEMA, "pennies")
}

pub fn currency() -> Attribute {
    Attribute::custom(CASH_SCHEMA, "currency")
}

pub fn issuer() -> Attribute {
    Attribute::custom(CASH_SCHEMA, "issuer")
}

pub fn linear_number() -> Attribute {
    Attribute::custom(LINEAR_SCHEMA, "linear_number")
}

pub fn cash_state(pennies: i64, currency: &str) -> ContractState {
    issued_cash_state(pennies, currency, "BankOfCorda")
}

pub fn issued_cash_state(pennies: i64, currency: &str, issuer: &str) -> ContractState {
    ContractState::new(cash_type())
        .with_participant(Party::new("MegaCorp"))
        .with_field("pennies", pennies)
        .with_field("currency", currency)
        .with_field("issuer", issuer)
}

/// Records one transaction producing a cash state per lot.
pub fn deposit(service: &VaultQueryService, currency: &str, lots: &[i64]) -> Vec<StateRef> {
    let mut tx = VaultTransaction::new();
    for lot in lots {
        tx = tx.producing(cash_state(*lot, currency));
    }
    let update = service.store().record(tx).expect("deposit");
    update.produced.iter().map(|s| s.reference).collect()
}

/// The five deposits: three in USD, one each in GBP and CHF.
pub fn fund(service: &VaultQueryService) -> Vec<StateRef> {
    let mut refs = Vec::new();
    for lots in USD_LOTS {
        refs.extend(deposit(service, "USD", lots));
    }
    refs.extend(deposit(service, "GBP", GBP_LOTS));
    refs.extend(deposit(service, "CHF", CHF_LOTS));
    refs
}

/// Cash from two issuers, recorded DUMMY first so storage order differs
/// from group order. Per (issuer, currency): BOC/GBP 400, DUMMY/GBP 300,
/// BOC/USD 200, DUMMY/USD 100.
pub fn fund_two_issuers(service: &VaultQueryService) -> Vec<StateRef> {
    let lots: [(&str, &str, &[i64]); 4] = [
        ("DUMMY", "USD", &[60, 40]),
        ("DUMMY", "GBP", &[300]),
        ("BOC", "USD", &[50, 150]),
        ("BOC", "GBP", &[100, 100, 200]),
    ];
    let mut states = Vec::new();
    for (issuer, currency, amounts) in lots {
        for amount in amounts {
            states.push(issued_cash_state(*amount, currency, issuer));
        }
    }
    record(service, states)
}

/// Spends `references` into a single change output.
pub fn spend(service: &VaultQueryService, references: &[StateRef], change: i64, currency: &str) {
    let mut tx = VaultTransaction::new();
    for reference in references {
        tx = tx.consuming(*reference);
    }
    service
        .store()
        .record(tx.producing(cash_state(change, currency)))
        .expect("spend");
}

pub fn linear_state(id: &UniqueIdentifier, number: i64) -> ContractState {
    ContractState::new(linear_type())
        .with_participant(Party::new("Alice"))
        .with_linear_id(id.clone())
        .with_field("linear_number", number)
        .with_field("linear_string", format!("linear-{}", number))
}

pub fn deal_state(reference: &str, participant: &str) -> ContractState {
    ContractState::new(deal_type())
        .with_participant(Party::new(participant))
        .with_linear_id(UniqueIdentifier::with_external_id(reference))
        .with_deal_reference(reference)
        .with_field("linear_number", 0i64)
}

pub fn record(service: &VaultQueryService, states: Vec<ContractState>) -> Vec<StateRef> {
    let mut tx = VaultTransaction::new();
    for state in states {
        tx = tx.producing(state);
    }
    let update = service.store().record(tx).expect("record");
    update.produced.iter().map(|s| s.reference).collect()
}
