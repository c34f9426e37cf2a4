use std::path::Path;

use anyhow::{Context, Result};

use augnorm_core::diff::DatabaseSnapshot;
use augnorm_core::sql::{self, Postgres};
use augnorm_core::validator::validate;
use augnorm_db::PostgresIntrospector;

use crate::args::{DiffArgs, DiffFormat};
use crate::db::{connect, resolve_db_url, resolve_schema_name};
use crate::loader;

pub async fn run(args: &DiffArgs) -> Result<()> {
    let document = loader::load(Path::new(&args.schema))?;
    let validation = validate(&document);
    if !validation.is_ok() {
        for error in &validation.errors {
            eprintln!("error: {error}");
        }
        anyhow::bail!("schema validation failed");
    }

    let db_url = resolve_db_url(args.db.as_deref())?;
    let schema_name = resolve_schema_name(args.schema_name.as_deref())?;
    let pool = connect(&db_url).await?;
    let introspector = PostgresIntrospector::with_schema(pool, schema_name);
    let snapshot: DatabaseSnapshot = introspector
        .introspect()
        .await
        .context("failed to introspect database")?;

    let processed = augnorm_core::processor::process_schema(&document)?;
    let schema_diff = augnorm_core::diff::diff_schema(&processed, &snapshot);

    match args.format {
        DiffFormat::Json => {
            let summary = schema_diff.summary();
            println!("{}", serde_json::json!({ "summary": summary }));
        }
        DiffFormat::Sql => {
            let statements = sql::render_diff(&schema_diff, &processed, &Postgres);
            if statements.is_empty() {
                println!("{}", schema_diff.summary());
            } else {
                for statement in statements {
                    println!("{statement}");
                }
            }
        }
    }

    Ok(())
}
