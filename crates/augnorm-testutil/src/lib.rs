use augnorm_core::ast::{
    AutomationDirective, AutomationType, ColumnDef, DeletePolicy, ForeignKeyDirective,
    SchemaDocument, SqlType, TableColumnEntry, TableDef,
};

fn column(sql_type: SqlType) -> ColumnDef {
    ColumnDef {
        sql_type,
        size: None,
        decimal: None,
        primary_key: false,
        unique: false,
        sequence: false,
        automation: None,
        calculated: None,
    }
}

fn primary_key() -> ColumnDef {
    ColumnDef {
        primary_key: true,
        sequence: true,
        ..column(SqlType::Integer)
    }
}

fn sized(sql_type: SqlType, size: u32) -> ColumnDef {
    ColumnDef {
        size: Some(size),
        ..column(sql_type)
    }
}

fn full(def: ColumnDef) -> Option<TableColumnEntry> {
    Some(TableColumnEntry::Full(def))
}

/// A small customers/orders/order_items schema: one FK chain plus a SUM
/// aggregation from `order_items.amount` rolling up into `orders.total`.
pub fn ecommerce_schema() -> SchemaDocument {
    let mut document = SchemaDocument::default();

    let mut customers = TableDef::default();
    customers.columns.insert("id".to_string(), full(primary_key()));
    customers
        .columns
        .insert("email".to_string(), full(sized(SqlType::Varchar, 255)));
    document.tables.insert("customers".to_string(), customers);

    let mut orders = TableDef::default();
    orders.columns.insert("id".to_string(), full(primary_key()));
    let total = ColumnDef {
        decimal: Some(2),
        automation: Some(AutomationDirective {
            automation_type: AutomationType::Sum,
            table: "order_items".to_string(),
            foreign_key: "order".to_string(),
            column: "amount".to_string(),
        }),
        ..sized(SqlType::Numeric, 10)
    };
    orders.columns.insert("total".to_string(), full(total));
    orders.foreign_keys.insert(
        "customer".to_string(),
        ForeignKeyDirective {
            table: "customers".to_string(),
            prefix: None,
            suffix: None,
            on_delete: DeletePolicy::Cascade,
        },
    );
    document.tables.insert("orders".to_string(), orders);

    let mut order_items = TableDef::default();
    order_items
        .columns
        .insert("id".to_string(), full(primary_key()));
    order_items.columns.insert(
        "amount".to_string(),
        full(ColumnDef {
            decimal: Some(2),
            ..sized(SqlType::Numeric, 10)
        }),
    );
    order_items.foreign_keys.insert(
        "order".to_string(),
        ForeignKeyDirective {
            table: "orders".to_string(),
            prefix: None,
            suffix: None,
            on_delete: DeletePolicy::Cascade,
        },
    );
    document
        .tables
        .insert("order_items".to_string(), order_items);

    document
}

/// A mutually cyclic pair of tables — `employees.manager` points at
/// `departments`, `departments.head` points back at `employees`. Used to
/// exercise the always-fatal FK cycle check.
pub fn circular_schema() -> SchemaDocument {
    let mut document = SchemaDocument::default();

    let mut employees = TableDef::default();
    employees
        .columns
        .insert("id".to_string(), full(primary_key()));
    employees.foreign_keys.insert(
        "department".to_string(),
        ForeignKeyDirective {
            table: "departments".to_string(),
            prefix: None,
            suffix: None,
            on_delete: DeletePolicy::SetNull,
        },
    );
    document.tables.insert("employees".to_string(), employees);

    let mut departments = TableDef::default();
    departments
        .columns
        .insert("id".to_string(), full(primary_key()));
    departments.foreign_keys.insert(
        "head".to_string(),
        ForeignKeyDirective {
            table: "employees".to_string(),
            prefix: None,
            suffix: None,
            on_delete: DeletePolicy::SetNull,
        },
    );
    document
        .tables
        .insert("departments".to_string(), departments);

    document
}
