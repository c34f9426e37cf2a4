use std::path::Path;
use std::process;

use anyhow::Result;

use augnorm_core::validator::validate;

use crate::args::ValidateArgs;
use crate::loader;

pub async fn run(args: &ValidateArgs) -> Result<()> {
    let schema = loader::load(Path::new(&args.schema))?;
    let result = validate(&schema);

    if result.is_ok() {
        println!("{}: schema is valid.", args.schema);
        return Ok(());
    }

    println!("{}: {} error(s) found:", args.schema, result.errors.len());
    for error in &result.errors {
        println!("  - {error}");
    }
    process::exit(1);
}
