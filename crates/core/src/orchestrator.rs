use std::sync::Arc;

use regex::Regex;

use crate::{
    ConfigError, ConnectionConfig, DatabaseAdapter, Dialect, DiffConfig, DiffDiagnostics,
    DiffEngine, EquivalencePolicy, Executor, Expr, OrchestratorOutput::*, Renderer, Result,
    RunHeader, SchemaObject,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Apply,
    #[default]
    DryRun,
    Export,
}

/// Mirrors the CLI-level generator config (`--target-table`, `--skip-table`, ...);
/// see [`DiffConfig`] for the compiled, diff-time form of the same knobs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrchestratorOptions {
    pub mode: Mode,
    pub enable_drop: bool,
    pub target_tables: Vec<String>,
    pub skip_tables: Vec<String>,
    pub skip_views: Vec<String>,
    pub target_schema: Vec<String>,
    pub managed_roles: Vec<String>,
    pub create_index_concurrently: bool,
    pub disable_ddl_transaction: bool,
    pub legacy_ignore_quotes: bool,
    pub algorithm: Option<String>,
    pub lock: Option<String>,
    /// Raw SQL run verbatim inside the transaction before any generated statement.
    pub before_apply: Option<String>,
    /// Drops extension objects from both registries before diffing (`--skip-extension`).
    pub skip_extension: bool,
    /// Clears table partitioning specs from both registries before diffing (`--skip-partition`).
    pub skip_partition: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorOutput {
    Applied(String),
    DryRunSql(String),
    ExportSql(String),
}

pub struct Orchestrator<'a> {
    dialect: &'a dyn Dialect,
    diff_engine: DiffEngine,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect,
            diff_engine: DiffEngine::new(),
        }
    }

    pub fn run(
        &self,
        connection_config: &ConnectionConfig,
        desired_sql: &str,
        options: OrchestratorOptions,
    ) -> Result<OrchestratorOutput> {
        let mut adapter = self.dialect.connect(connection_config)?;
        let current_sql = adapter.export_schema()?;
        match options.mode {
            Mode::Export => Ok(ExportSql(
                self.export_sql_from_input(&current_sql, &options)?,
            )),
            Mode::Apply | Mode::DryRun => {
                let current = self.parse_and_normalize(&current_sql, &options)?;
                let desired = self.parse_and_normalize(desired_sql, &options)?;
                let diff_config = self.diff_config(adapter.as_ref(), &options)?;
                let diff_outcome =
                    self.diff_engine
                        .diff_with_diagnostics(&desired, &current, &diff_config)?;
                let statements = self.dialect.generate_ddl(&diff_outcome.ops)?;
                let skipped = skipped_messages(&diff_outcome.diagnostics);

                if options.mode == Mode::Apply {
                    let rendered = Renderer::new(self.dialect).render_run(
                        RunHeader::Apply,
                        &statements,
                        &skipped,
                        options.enable_drop,
                    );
                    let mut executor = Executor::new(adapter.as_mut(), options.enable_drop);
                    executor.execute_plan_with_hook(options.before_apply.as_deref(), &statements)?;
                    Ok(OrchestratorOutput::Applied(rendered))
                } else {
                    let rendered = Renderer::new(self.dialect).render_run(
                        RunHeader::DryRun,
                        &statements,
                        &skipped,
                        options.enable_drop,
                    );
                    Ok(DryRunSql(rendered))
                }
            }
        }
    }

    /// Diffs two schema texts directly, without opening a database connection.
    ///
    /// Mirrors the CLI rule that a positional database argument ending in `.sql` is
    /// treated as a stand-in for the current schema rather than a live connection
    /// target. [`Mode::Apply`] has nothing to execute against in this mode and is
    /// rejected with [`ConfigError::ApplyRequiresConnection`].
    pub fn diff_text(
        &self,
        current_sql: &str,
        desired_sql: &str,
        options: OrchestratorOptions,
    ) -> Result<OrchestratorOutput> {
        match options.mode {
            Mode::Export => Ok(ExportSql(self.export_sql_from_input(current_sql, &options)?)),
            Mode::Apply => Err(ConfigError::ApplyRequiresConnection.into()),
            Mode::DryRun => {
                let current = self.parse_and_normalize(current_sql, &options)?;
                let desired = self.parse_and_normalize(desired_sql, &options)?;
                let diff_config = self.diff_config_for_search_path(Vec::new(), &options)?;
                let diff_outcome =
                    self.diff_engine
                        .diff_with_diagnostics(&desired, &current, &diff_config)?;
                let statements = self.dialect.generate_ddl(&diff_outcome.ops)?;
                let skipped = skipped_messages(&diff_outcome.diagnostics);
                let rendered = Renderer::new(self.dialect).render_run(
                    RunHeader::DryRun,
                    &statements,
                    &skipped,
                    options.enable_drop,
                );
                Ok(DryRunSql(rendered))
            }
        }
    }

    pub fn export_roundtrip_matches(&self, exported_sql: &str) -> Result<bool> {
        let re_exported_sql =
            self.export_sql_from_input(exported_sql, &OrchestratorOptions::default())?;
        Ok(exported_sql == re_exported_sql)
    }

    fn parse_and_normalize(
        &self,
        sql: &str,
        options: &OrchestratorOptions,
    ) -> Result<Vec<SchemaObject>> {
        let mut objects = self.dialect.parse(sql)?;
        for object in &mut objects {
            self.dialect.normalize(object);
        }
        if options.skip_extension {
            objects.retain(|object| !matches!(object, SchemaObject::Extension(_)));
        }
        if options.skip_partition {
            for object in &mut objects {
                if let SchemaObject::Table(table) = object {
                    table.partition = None;
                }
            }
        }
        Ok(objects)
    }

    fn export_sql_from_input(&self, sql: &str, options: &OrchestratorOptions) -> Result<String> {
        let objects = self.parse_and_normalize(sql, options)?;
        self.render_export(&objects)
    }

    fn diff_config(
        &self,
        adapter: &dyn DatabaseAdapter,
        options: &OrchestratorOptions,
    ) -> Result<DiffConfig> {
        self.diff_config_for_search_path(adapter.schema_search_path(), options)
    }

    fn diff_config_for_search_path(
        &self,
        schema_search_path: Vec<String>,
        options: &OrchestratorOptions,
    ) -> Result<DiffConfig> {
        Ok(DiffConfig {
            enable_drop: options.enable_drop,
            schema_search_path,
            equivalence_policy: Arc::new(DelegatingEquivalencePolicy {
                inner: self.dialect.equivalence_policy(),
            }),
            target_tables: compile_patterns("target_tables", &options.target_tables)?,
            skip_tables: compile_patterns("skip_tables", &options.skip_tables)?,
            skip_views: compile_patterns("skip_views", &options.skip_views)?,
            target_schema: options.target_schema.clone(),
            managed_roles: options.managed_roles.clone(),
            create_index_concurrently: options.create_index_concurrently,
            disable_ddl_transaction: options.disable_ddl_transaction,
            legacy_ignore_quotes: options.legacy_ignore_quotes,
            algorithm: options.algorithm.clone(),
            lock: options.lock.clone(),
        })
    }

    fn render_export(&self, objects: &[SchemaObject]) -> Result<String> {
        let mut rendered = String::new();
        for object in objects {
            rendered.push_str(&self.dialect.to_sql(object)?);
            rendered.push('\n');
        }
        Ok(rendered)
    }
}

struct DelegatingEquivalencePolicy {
    inner: &'static dyn EquivalencePolicy,
}

impl EquivalencePolicy for DelegatingEquivalencePolicy {
    fn is_equivalent_expr(&self, left: &Expr, right: &Expr) -> bool {
        self.inner.is_equivalent_expr(left, right)
    }

    fn is_equivalent_custom_type(&self, left: &str, right: &str) -> bool {
        self.inner.is_equivalent_custom_type(left, right)
    }
}

fn skipped_messages(diagnostics: &DiffDiagnostics) -> Vec<String> {
    diagnostics
        .skipped_ops
        .iter()
        .map(|diagnostic| diagnostic.kind.tag().to_string())
        .collect()
}

fn compile_patterns(field: &'static str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| {
                ConfigError::InvalidPattern {
                    field,
                    pattern: pattern.clone(),
                    source,
                }
                .into()
            })
        })
        .collect()
}
