use std::{
    fs,
    io::{self, IsTerminal, Read, Write},
    path::PathBuf,
};

use stateql_core::{ConnectionConfig, Dialect, Mode, Orchestrator, OrchestratorOptions};

use crate::{
    cli::{Cli, CommonArgs, DialectCommand},
    config_file::GeneratorConfigFile,
    error_presentation::{CliError, CliResult},
};

const MYSQL_PASSWORD_ENV: &str = "MYSQL_PWD";
const POSTGRES_PASSWORD_ENV: &str = "PGPASSWORD";
const MSSQL_PASSWORD_ENV: &str = "MSSQL_PWD";

/// Top-level dispatcher: runs the selected dialect subcommand and returns the
/// transcript that should be written to stdout.
pub(crate) fn run(cli: Cli) -> CliResult<String> {
    match cli.command {
        #[cfg(feature = "mysql")]
        DialectCommand::Mysql(args) => {
            let password = resolve_password(
                args.password.clone(),
                args.password_prompt,
                MYSQL_PASSWORD_ENV,
            )?;
            let common = args.common.clone();
            run_dialect(&stateql_dialect_mysql::MysqlDialect, &common, || {
                Ok(ConnectionConfig {
                    host: args.host.clone(),
                    port: args.port,
                    user: args.user.clone(),
                    password,
                    database: common.database.clone(),
                    socket: args.socket.clone(),
                    extra: Default::default(),
                })
            })
        }
        #[cfg(feature = "postgres")]
        DialectCommand::Postgres(args) => {
            let password = resolve_password(
                args.password.clone(),
                args.password_prompt,
                POSTGRES_PASSWORD_ENV,
            )?;
            let common = args.common.clone();
            run_dialect(&stateql_dialect_postgres::PostgresDialect, &common, || {
                let mut extra = std::collections::BTreeMap::new();
                if let Some(sslmode) = &args.sslmode {
                    extra.insert("postgres.sslmode".to_string(), sslmode.clone());
                }
                Ok(ConnectionConfig {
                    host: args.host.clone(),
                    port: args.port,
                    user: args.user.clone(),
                    password,
                    database: common.database.clone(),
                    socket: args.socket.clone(),
                    extra,
                })
            })
        }
        #[cfg(feature = "mssql")]
        DialectCommand::Mssql(args) => {
            let password = resolve_password(
                args.password.clone(),
                args.password_prompt,
                MSSQL_PASSWORD_ENV,
            )?;
            let common = args.common.clone();
            run_dialect(&stateql_dialect_mssql::MssqlDialect, &common, || {
                let mut extra = std::collections::BTreeMap::new();
                extra.insert(
                    "mssql.trusted_connection".to_string(),
                    args.trusted_connection.to_string(),
                );
                if let Some(instance) = &args.instance {
                    extra.insert("mssql.instance".to_string(), instance.clone());
                }
                extra.insert(
                    "mssql.trust_server_cert".to_string(),
                    args.trust_server_cert.to_string(),
                );
                Ok(ConnectionConfig {
                    host: args.host.clone(),
                    port: args.port,
                    user: args.user.clone(),
                    password,
                    database: common.database.clone(),
                    socket: None,
                    extra,
                })
            })
        }
        #[cfg(feature = "sqlite")]
        DialectCommand::Sqlite(args) => {
            let common = args.common.clone();
            run_dialect(&stateql_dialect_sqlite::SqliteDialect, &common, || {
                Ok(ConnectionConfig {
                    host: None,
                    port: None,
                    user: None,
                    password: None,
                    database: common.database.clone(),
                    socket: None,
                    extra: Default::default(),
                })
            })
        }
        #[allow(unreachable_patterns)]
        _ => unreachable!("no dialect feature is enabled for this build"),
    }
}

fn run_dialect(
    dialect: &dyn Dialect,
    common: &CommonArgs,
    build_connection: impl FnOnce() -> CliResult<ConnectionConfig>,
) -> CliResult<String> {
    let config = load_generator_config(common)?;
    let options = build_options(common, &config);
    let desired_sql = read_desired_sql(common)?;
    let orchestrator = Orchestrator::new(dialect);

    let output = if common.database.ends_with(".sql") {
        let current_sql = read_file(&common.database)?;
        orchestrator.diff_text(&current_sql, &desired_sql, options)?
    } else {
        let mut connection_config = build_connection()?;
        if let Some(dump_concurrency) = config.dump_concurrency {
            connection_config
                .extra
                .insert("dump_concurrency".to_string(), dump_concurrency.to_string());
        }
        orchestrator.run(&connection_config, &desired_sql, options)?
    };

    Ok(match output {
        stateql_core::OrchestratorOutput::Applied(sql) => sql,
        stateql_core::OrchestratorOutput::DryRunSql(sql) => sql,
        stateql_core::OrchestratorOutput::ExportSql(sql) => sql,
    })
}

fn build_options(common: &CommonArgs, config: &GeneratorConfigFile) -> OrchestratorOptions {
    // Dry-run is already the default whenever `--apply`/`--export` are absent;
    // `--dry-run` itself is accepted only to let scripts say so explicitly.
    let mode = match (common.export, common.apply, common.dry_run) {
        (true, _, _) => Mode::Export,
        (false, true, _) => Mode::Apply,
        (false, false, _) => Mode::DryRun,
    };

    let mut target_tables = common.target_table.clone();
    target_tables.extend(config.target_tables.clone());
    let mut skip_tables = common.skip_table.clone();
    skip_tables.extend(config.skip_tables.clone());
    let mut skip_views = common.skip_view.clone();
    skip_views.extend(config.skip_views.clone());
    let mut target_schema = common.target_schema.clone();
    target_schema.extend(config.target_schema.clone());
    let mut managed_roles = common.managed_role.clone();
    managed_roles.extend(config.managed_roles.clone());

    OrchestratorOptions {
        mode,
        enable_drop: common.enable_drop || config.enable_drop.unwrap_or(false),
        target_tables,
        skip_tables,
        skip_views,
        target_schema,
        managed_roles,
        create_index_concurrently: common.create_index_concurrently
            || config.create_index_concurrently.unwrap_or(false),
        disable_ddl_transaction: common.disable_ddl_transaction
            || config.disable_ddl_transaction.unwrap_or(false),
        legacy_ignore_quotes: config.legacy_ignore_quotes.unwrap_or(true),
        algorithm: common.algorithm.clone().or_else(|| config.algorithm.clone()),
        lock: common.lock.clone().or_else(|| config.lock.clone()),
        before_apply: common.before_apply.clone(),
        skip_extension: common.skip_extension,
        skip_partition: common.skip_partition,
    }
}

fn load_generator_config(common: &CommonArgs) -> CliResult<GeneratorConfigFile> {
    let mut merged = GeneratorConfigFile::default();

    for path in &common.config {
        let text = fs::read_to_string(path).map_err(|source| CliError::ReadConfigFile {
            path: path.clone(),
            source,
        })?;
        let parsed: GeneratorConfigFile =
            serde_yaml::from_str(&text).map_err(|source| CliError::ParseConfig {
                label: path.display().to_string(),
                source,
            })?;
        merged = merged.merge(parsed);
    }

    for (index, inline) in common.config_inline.iter().enumerate() {
        let parsed: GeneratorConfigFile =
            serde_yaml::from_str(inline).map_err(|source| CliError::ParseConfig {
                label: format!("--config-inline[{index}]"),
                source,
            })?;
        merged = merged.merge(parsed);
    }

    Ok(merged)
}

fn read_desired_sql(common: &CommonArgs) -> CliResult<String> {
    if common.file.is_empty() {
        return read_stdin();
    }

    let mut combined = String::new();
    for entry in &common.file {
        if entry == "-" {
            combined.push_str(&read_stdin()?);
        } else {
            combined.push_str(&read_file(entry)?);
        }
        combined.push('\n');
    }
    Ok(combined)
}

fn read_file(path: &str) -> CliResult<String> {
    fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: PathBuf::from(path),
        source,
    })
}

fn read_stdin() -> CliResult<String> {
    if io::stdin().is_terminal() {
        return Err(CliError::MissingDesiredSchemaInput);
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(CliError::ReadStdin)?;
    Ok(buffer)
}

fn resolve_password(
    explicit: Option<String>,
    prompt: bool,
    env_var: &'static str,
) -> CliResult<Option<String>> {
    if let Ok(from_env) = std::env::var(env_var) {
        return Ok(Some(from_env));
    }
    if prompt {
        let password = rpassword::prompt_password("Password: ").map_err(CliError::ReadStdin)?;
        return Ok(Some(password));
    }
    Ok(explicit)
}

#[allow(dead_code)]
fn flush_stdout() -> io::Result<()> {
    io::stdout().flush()
}
