use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "stateql",
    version,
    about = "Converge a live database schema to a desired DDL text."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: DialectCommand,
}

#[derive(Subcommand, Debug)]
pub enum DialectCommand {
    /// MySQL / MariaDB
    #[cfg(feature = "mysql")]
    Mysql(NetworkDialectArgs),
    /// PostgreSQL
    #[cfg(feature = "postgres")]
    Postgres(PostgresArgs),
    /// Microsoft SQL Server
    #[cfg(feature = "mssql")]
    Mssql(MssqlArgs),
    /// SQLite
    #[cfg(feature = "sqlite")]
    Sqlite(FileDialectArgs),
}

/// Flags shared by every dialect subcommand.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Database name. For sqlite this is the database file path. A value ending in
    /// `.sql` is treated as a desired-format stand-in for the current schema instead
    /// of a live connection target.
    pub database: String,

    /// Desired-schema input file (repeatable; `-` reads from stdin).
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Vec<String>,

    /// Apply the computed plan inside a transaction.
    #[arg(long, conflicts_with = "export")]
    pub apply: bool,

    /// Print the computed plan but execute nothing (already the default).
    #[arg(long = "dry-run", conflicts_with = "apply")]
    pub dry_run: bool,

    /// Print the live schema as DDL text and exit.
    #[arg(long)]
    pub export: bool,

    /// Allow destructive statements; otherwise they are emitted as `-- Skipped: `.
    #[arg(long = "enable-drop")]
    pub enable_drop: bool,

    /// Regex of tables to include (repeatable).
    #[arg(long = "target-table", value_name = "REGEX")]
    pub target_table: Vec<String>,

    /// Regex of tables to exclude (repeatable).
    #[arg(long = "skip-table", value_name = "REGEX")]
    pub skip_table: Vec<String>,

    /// Regex of views to exclude (repeatable).
    #[arg(long = "skip-view", value_name = "REGEX")]
    pub skip_view: Vec<String>,

    /// Exclude extension-owned objects from the plan.
    #[arg(long = "skip-extension")]
    pub skip_extension: bool,

    /// Ignore table partitioning specs when diffing.
    #[arg(long = "skip-partition")]
    pub skip_partition: bool,

    /// Restrict the plan to these schema namespaces (repeatable).
    #[arg(long = "target-schema", value_name = "SCHEMA")]
    pub target_schema: Vec<String>,

    /// Restrict privilege comparisons to these roles (repeatable).
    #[arg(long = "managed-role", value_name = "ROLE")]
    pub managed_role: Vec<String>,

    /// Mark `CREATE INDEX` statements with `CONCURRENTLY` (PostgreSQL).
    #[arg(long = "create-index-concurrently")]
    pub create_index_concurrently: bool,

    /// Force every statement into the non-transactional bucket.
    #[arg(long = "disable-ddl-transaction")]
    pub disable_ddl_transaction: bool,

    /// MySQL `ALTER TABLE` algorithm hint.
    #[arg(long)]
    pub algorithm: Option<String>,

    /// MySQL `ALTER TABLE` lock hint.
    #[arg(long)]
    pub lock: Option<String>,

    /// SQL run verbatim inside the migration transaction before any generated statement.
    #[arg(long = "before-apply", value_name = "SQL")]
    pub before_apply: Option<String>,

    /// YAML config file merged into the generator config (repeatable, in order).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Vec<PathBuf>,

    /// Inline YAML merged into the generator config (repeatable, in order).
    #[arg(long = "config-inline", value_name = "YAML")]
    pub config_inline: Vec<String>,
}

/// Connection flags for network dialects that support a unix-domain socket
/// (MySQL/MariaDB).
#[derive(Args, Debug, Clone)]
pub struct NetworkDialectArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Database host.
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// Database port.
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Database user.
    #[arg(short = 'U', long)]
    pub user: Option<String>,

    /// Database password. Overridden by the dialect's password environment variable.
    #[arg(short = 'P', long)]
    pub password: Option<String>,

    /// Read the password interactively from the terminal.
    #[arg(long = "password-prompt")]
    pub password_prompt: bool,

    /// Unix-domain socket path.
    #[arg(long)]
    pub socket: Option<String>,
}

/// Connection flags for PostgreSQL, which additionally exposes `--sslmode`.
#[derive(Args, Debug, Clone)]
pub struct PostgresArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(short = 'h', long)]
    pub host: Option<String>,

    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    #[arg(short = 'U', long)]
    pub user: Option<String>,

    #[arg(short = 'P', long)]
    pub password: Option<String>,

    #[arg(long = "password-prompt")]
    pub password_prompt: bool,

    #[arg(long)]
    pub socket: Option<String>,

    /// libpq `sslmode` (disable/allow/prefer/require/verify-ca/verify-full).
    #[arg(long)]
    pub sslmode: Option<String>,
}

/// Connection flags for Microsoft SQL Server.
#[derive(Args, Debug, Clone)]
pub struct MssqlArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(short = 'h', long)]
    pub host: Option<String>,

    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    #[arg(short = 'U', long)]
    pub user: Option<String>,

    #[arg(short = 'P', long)]
    pub password: Option<String>,

    #[arg(long = "password-prompt")]
    pub password_prompt: bool,

    /// Use Windows integrated authentication instead of `--user`/`--password`.
    #[arg(long = "trusted-connection")]
    pub trusted_connection: bool,

    /// Named instance to connect to, resolved via the SQL Server Browser service.
    #[arg(long)]
    pub instance: Option<String>,

    /// Skip TLS certificate verification.
    #[arg(long = "trust-server-cert")]
    pub trust_server_cert: bool,
}

/// Flags for file-backed dialects (SQLite) with no network connection concept.
#[derive(Args, Debug, Clone)]
pub struct FileDialectArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}
