use std::path::Path;

use anyhow::{Context, Result};

use augnorm_core::compile;
use augnorm_core::diff::DatabaseSnapshot;
use augnorm_core::sql::{self, Postgres};
use augnorm_db::{Executor, PostgresIntrospector};

use crate::args::CompileArgs;
use crate::db::{connect, resolve_db_url, resolve_schema_name};
use crate::loader;

pub async fn run(args: &CompileArgs) -> Result<()> {
    let document = loader::load(Path::new(&args.schema))?;

    let db_url = resolve_db_url(args.db.as_deref())?;
    let schema_name = resolve_schema_name(args.schema_name.as_deref())?;
    let pool = connect(&db_url).await?;

    let introspector = PostgresIntrospector::with_schema(pool.clone(), schema_name);
    let snapshot: DatabaseSnapshot = introspector
        .introspect()
        .await
        .context("failed to introspect database")?;

    let output = compile(&document, &snapshot)?;

    println!("{}", output.diff.summary());

    let tables: Vec<String> = output.processed.tables.keys().cloned().collect();
    let mut statements = sql::render_diff(&output.diff, &output.processed, &Postgres);
    statements.extend(sql::render_trigger_drops(&tables));
    statements.extend(output.trigger_statements.clone());

    if args.dry_run {
        println!("\n-- dry run: statements not applied --\n");
        for statement in &statements {
            println!("{statement}");
        }
        return Ok(());
    }

    if statements.is_empty() {
        println!("Nothing to apply.");
        return Ok(());
    }

    let executor = Executor::new(pool);
    executor
        .apply(&statements)
        .await
        .context("failed to apply generated statements")?;

    println!("Applied {} statement(s).", statements.len());
    Ok(())
}
