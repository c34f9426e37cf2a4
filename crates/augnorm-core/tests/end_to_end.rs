use indexmap::IndexMap;

use augnorm_core::ast::{
    AutomationDirective, AutomationType, ColumnDef, DeletePolicy, ForeignKeyDirective,
    SchemaDocument, SqlType, SyncDirection, SyncDirective, SyncOp, TableColumnEntry, TableDef,
};
use augnorm_core::diff::DatabaseSnapshot;
use augnorm_core::sql::{render_diff, Postgres};
use augnorm_core::{compile, processor, CompileError};

fn pk() -> ColumnDef {
    ColumnDef {
        sql_type: SqlType::Integer,
        size: None,
        decimal: None,
        primary_key: true,
        unique: false,
        sequence: true,
        automation: None,
        calculated: None,
    }
}

fn numeric(decimal: u32) -> ColumnDef {
    ColumnDef {
        sql_type: SqlType::Numeric,
        size: Some(10),
        decimal: Some(decimal),
        primary_key: false,
        unique: false,
        sequence: false,
        automation: None,
        calculated: None,
    }
}

fn entry(def: ColumnDef) -> Option<TableColumnEntry> {
    Some(TableColumnEntry::Full(def))
}

fn varchar(size: u32) -> ColumnDef {
    ColumnDef {
        sql_type: SqlType::Varchar,
        size: Some(size),
        decimal: None,
        primary_key: false,
        unique: false,
        sequence: false,
        automation: None,
        calculated: None,
    }
}

fn fk(table: &str) -> ForeignKeyDirective {
    ForeignKeyDirective {
        table: table.to_string(),
        prefix: None,
        suffix: None,
        on_delete: DeletePolicy::NoAction,
    }
}

/// Scenario 1 — a SUM aggregation on `accounts.balance` rolling up
/// `transactions.amount`.
#[test]
fn simple_sum_produces_one_trigger_on_the_child_table() {
    let mut document = SchemaDocument::default();

    let mut accounts = TableDef::default();
    accounts.columns.insert("account_id".to_string(), entry(pk()));
    let balance = ColumnDef {
        automation: Some(AutomationDirective {
            automation_type: AutomationType::Sum,
            table: "transactions".to_string(),
            foreign_key: "account_fk".to_string(),
            column: "amount".to_string(),
        }),
        ..numeric(2)
    };
    accounts.columns.insert("balance".to_string(), entry(balance));
    document.tables.insert("accounts".to_string(), accounts);

    let mut transactions = TableDef::default();
    transactions
        .columns
        .insert("transaction_id".to_string(), entry(pk()));
    transactions.columns.insert("amount".to_string(), entry(numeric(2)));
    transactions
        .foreign_keys
        .insert("account_fk".to_string(), fk("accounts"));
    document.tables.insert("transactions".to_string(), transactions);

    let output = compile(&document, &DatabaseSnapshot::empty()).unwrap();

    let mut created = output.diff.tables_to_create.clone();
    created.sort();
    assert_eq!(created, vec!["accounts".to_string(), "transactions".to_string()]);

    let ddl = render_diff(&output.diff, &output.processed, &Postgres);
    let accounts_table = ddl
        .iter()
        .find(|s| s.starts_with("CREATE TABLE accounts"))
        .unwrap();
    assert!(accounts_table.contains("balance NUMERIC(10,2) DEFAULT 0"));

    let transactions_triggers: Vec<&String> = output
        .trigger_statements
        .iter()
        .filter(|s| s.contains("transactions_before_"))
        .collect();
    assert_eq!(transactions_triggers.len(), 3);

    assert!(!output
        .trigger_statements
        .iter()
        .any(|s| s.contains("accounts_before_")));
}

/// Scenario 2 — a mutual FK cycle is fatal.
#[test]
fn mutual_fk_cycle_is_rejected() {
    let mut document = SchemaDocument::default();

    let mut orders = TableDef::default();
    orders.columns.insert("id".to_string(), entry(pk()));
    orders.foreign_keys.insert("customer_fk".to_string(), fk("customers"));
    document.tables.insert("orders".to_string(), orders);

    let mut customers = TableDef::default();
    customers.columns.insert("id".to_string(), entry(pk()));
    customers.foreign_keys.insert("order_fk".to_string(), fk("orders"));
    document.tables.insert("customers".to_string(), customers);

    let err = compile(&document, &DatabaseSnapshot::empty()).unwrap_err();
    assert!(matches!(err, CompileError::FKCycle { .. }));
}

/// Scenario 3 — calculated-column dependency order.
#[test]
fn calculated_columns_are_ordered_by_dependency() {
    let mut document = SchemaDocument::default();

    let mut sales = TableDef::default();
    sales.columns.insert("id".to_string(), entry(pk()));
    sales.columns.insert("price".to_string(), entry(numeric(2)));
    sales.columns.insert("quantity".to_string(), entry(numeric(0)));
    sales.columns.insert(
        "subtotal".to_string(),
        entry(ColumnDef {
            calculated: Some("price * quantity".to_string()),
            ..numeric(2)
        }),
    );
    sales.columns.insert(
        "tax".to_string(),
        entry(ColumnDef {
            calculated: Some("subtotal * 0.1".to_string()),
            ..numeric(2)
        }),
    );
    sales.columns.insert(
        "total".to_string(),
        entry(ColumnDef {
            calculated: Some("subtotal + tax".to_string()),
            ..numeric(2)
        }),
    );
    document.tables.insert("sales".to_string(), sales);

    let processed = processor::process_schema(&document).unwrap();
    let table = processed.table("sales").unwrap();
    let order = augnorm_core::graph::calculated_column_order("sales", table).unwrap();

    let pos = |name: &str| order.iter().position(|c| c == name).unwrap();
    assert!(pos("subtotal") < pos("tax"));
    assert!(pos("tax") < pos("total"));
}

/// Scenario 4 — four aggregations sourcing the same child collapse into
/// one trigger per operation on that child.
#[test]
fn multiple_aggregations_share_a_single_trigger() {
    let mut document = SchemaDocument::default();

    let mut summary = TableDef::default();
    summary.columns.insert("id".to_string(), entry(pk()));
    for (name, kind) in [
        ("total", AutomationType::Sum),
        ("count", AutomationType::Count),
        ("biggest", AutomationType::Max),
        ("newest", AutomationType::Latest),
    ] {
        summary.columns.insert(
            name.to_string(),
            entry(ColumnDef {
                automation: Some(AutomationDirective {
                    automation_type: kind,
                    table: "details".to_string(),
                    foreign_key: "summary_fk".to_string(),
                    column: "value".to_string(),
                }),
                ..numeric(2)
            }),
        );
    }
    document.tables.insert("summary".to_string(), summary);

    let mut details = TableDef::default();
    details.columns.insert("id".to_string(), entry(pk()));
    details.columns.insert("value".to_string(), entry(numeric(2)));
    details
        .foreign_keys
        .insert("summary_fk".to_string(), fk("summary"));
    document.tables.insert("details".to_string(), details);

    let output = compile(&document, &DatabaseSnapshot::empty()).unwrap();

    let insert_trigger = output
        .trigger_statements
        .iter()
        .find(|s| s.contains("details_before_insert_genlogic"))
        .unwrap();

    for expected in ["total", "count", "biggest", "newest"] {
        assert!(
            insert_trigger.contains(expected),
            "missing effect for {expected} in {insert_trigger}"
        );
    }
}

/// Scenario 5 — SNAPSHOT produces a PULL only; a sibling FOLLOW also adds
/// a guarded push-to-children step on the parent's UPDATE trigger.
#[test]
fn snapshot_pulls_without_pushing_back_but_a_sibling_follow_does() {
    let mut document = SchemaDocument::default();

    let mut products = TableDef::default();
    products.columns.insert("id".to_string(), entry(pk()));
    products.columns.insert("name".to_string(), entry(varchar(255)));
    products.columns.insert("status".to_string(), entry(varchar(50)));
    document.tables.insert("products".to_string(), products);

    let mut line_items = TableDef::default();
    line_items.columns.insert("id".to_string(), entry(pk()));
    line_items.foreign_keys.insert("product_fk".to_string(), fk("products"));
    line_items.columns.insert(
        "product_name".to_string(),
        entry(ColumnDef {
            automation: Some(AutomationDirective {
                automation_type: AutomationType::Snapshot,
                table: "products".to_string(),
                foreign_key: "product_fk".to_string(),
                column: "name".to_string(),
            }),
            ..varchar(255)
        }),
    );
    line_items.columns.insert(
        "product_status".to_string(),
        entry(ColumnDef {
            automation: Some(AutomationDirective {
                automation_type: AutomationType::Follow,
                table: "products".to_string(),
                foreign_key: "product_fk".to_string(),
                column: "status".to_string(),
            }),
            ..varchar(50)
        }),
    );
    document.tables.insert("line_items".to_string(), line_items);

    let output = compile(&document, &DatabaseSnapshot::empty()).unwrap();

    let insert_trigger = output
        .trigger_statements
        .iter()
        .find(|s| s.contains("line_items_before_insert_genlogic"))
        .unwrap();
    assert!(insert_trigger.contains("SELECT name"));
    assert!(insert_trigger.contains("NEW.product_fk"));

    let products_update_trigger = output
        .trigger_statements
        .iter()
        .find(|s| s.contains("products_before_update_genlogic"));
    assert!(products_update_trigger.is_some());

    assert!(!output
        .trigger_statements
        .iter()
        .any(|s| s.contains("products_before_insert_genlogic")));
}

/// Scenario 6 — a push-direction SYNC on UPDATE reads OLD for the WHERE
/// clause and NEW for the SET clause.
#[test]
fn sync_update_uses_old_for_where_and_new_for_set() {
    let mut document = SchemaDocument::default();

    let mut source = TableDef::default();
    source.columns.insert("id".to_string(), entry(pk()));
    source.columns.insert("key_col".to_string(), entry(numeric(0)));

    let mut match_columns = IndexMap::new();
    match_columns.insert("key_col".to_string(), "t_key".to_string());
    source.sync.insert(
        "target".to_string(),
        SyncDirective {
            direction: SyncDirection::Push,
            operations: vec![SyncOp::Insert, SyncOp::Update, SyncOp::Delete],
            match_columns,
            match_conditions: Vec::new(),
            column_map: IndexMap::new(),
            literals: IndexMap::new(),
        },
    );
    document.tables.insert("source".to_string(), source);

    let mut target = TableDef::default();
    target.columns.insert("t_key".to_string(), entry(numeric(0)));
    document.tables.insert("target".to_string(), target);

    let output = compile(&document, &DatabaseSnapshot::empty()).unwrap();

    let update_trigger = output
        .trigger_statements
        .iter()
        .find(|s| s.contains("source_before_update_genlogic"))
        .unwrap();

    assert!(update_trigger.contains("UPDATE target SET t_key = NEW.key_col WHERE t_key = OLD.key_col"));
}
