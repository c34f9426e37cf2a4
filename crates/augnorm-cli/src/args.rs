use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "augnorm",
    about = "Compile augmented-normalization schema documents to SQL",
    version,
    after_help = "Examples:\n  augnorm compile schema.yaml --db postgres://localhost/myapp\n  augnorm validate schema.yaml\n  augnorm diff schema.yaml --db postgres://localhost/myapp\n  augnorm graph schema.yaml --format mermaid"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate, diff against the database, and apply the resulting DDL and triggers
    Compile(CompileArgs),

    /// Run the validator against a schema document and report errors
    Validate(ValidateArgs),

    /// Show the DDL a schema document would produce without applying it
    Diff(DiffArgs),

    /// Visualize the foreign-key dependency graph
    Graph(GraphArgs),
}

#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Path to the schema document (YAML)
    pub schema: String,

    /// Database connection URL. Falls back to DATABASE_URL, .env, then augnorm.toml
    #[arg(long, env = "DATABASE_URL")]
    pub db: Option<String>,

    /// Schema name to introspect (default: public)
    #[arg(long)]
    pub schema_name: Option<String>,

    /// Print the statements that would run without applying them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the schema document (YAML)
    pub schema: String,
}

#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Path to the schema document (YAML)
    pub schema: String,

    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub db: Option<String>,

    /// Schema name to introspect
    #[arg(long)]
    pub schema_name: Option<String>,

    /// Output format for the diff
    #[arg(long, default_value = "sql")]
    pub format: DiffFormat,
}

#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Path to the schema document (YAML)
    pub schema: String,

    /// Output format for the dependency graph
    #[arg(long, default_value = "mermaid")]
    pub format: GraphFormat,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum DiffFormat {
    Sql,
    Json,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum GraphFormat {
    Mermaid,
    Dot,
}
