use std::{io, path::PathBuf};

use anyhow::Context;
use miette::Report;

const ORCHESTRATOR_CONTEXT: &str = "while running orchestrator";
const FILE_READ_CONTEXT: &str = "while reading desired schema file";
const STDIN_READ_CONTEXT: &str = "while reading desired schema from stdin";

pub(crate) type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug)]
pub(crate) enum CliError {
    MissingDesiredSchemaInput,
    ReadFile {
        path: PathBuf,
        source: io::Error,
    },
    ReadStdin(io::Error),
    ReadConfigFile {
        path: PathBuf,
        source: io::Error,
    },
    ParseConfig {
        label: String,
        source: serde_yaml::Error,
    },
    Core(stateql_core::Error),
}

impl From<stateql_core::Error> for CliError {
    fn from(value: stateql_core::Error) -> Self {
        Self::Core(value)
    }
}

pub(crate) fn render_runtime_error(error: CliError) -> String {
    match error {
        CliError::MissingDesiredSchemaInput => {
            format!("[usage] {}", missing_desired_schema_message())
        }
        CliError::ReadFile { path, source } => {
            let context = format!("{FILE_READ_CONTEXT} `{}`", path.display());
            let report = report_with_context(source, context);
            format!("[io] {report}")
        }
        CliError::ReadStdin(source) => {
            let report = report_with_context(source, STDIN_READ_CONTEXT);
            format!("[io] {report}")
        }
        CliError::ReadConfigFile { path, source } => {
            let context = format!("while reading config file `{}`", path.display());
            let report = report_with_context(source, context);
            format!("[config] {report}")
        }
        CliError::ParseConfig { label, source } => {
            let context = format!("while parsing config `{label}`");
            let report = report_with_context(source, context);
            format!("[config] {report}")
        }
        CliError::Core(source) => {
            let category = core_category(&source);
            let report = report_with_context(source, ORCHESTRATOR_CONTEXT);
            format!("[{category}] {report}")
        }
    }
}

fn report_with_context<E, C>(source: E, context: C) -> Report
where
    E: std::error::Error + Send + Sync + 'static,
    C: Into<String>,
{
    let context = context.into();
    let anyhow_error = std::result::Result::<(), E>::Err(source)
        .context(context)
        .expect_err("context wrapping must produce an error");
    miette::miette!("{anyhow_error:#}")
}

fn core_category(error: &stateql_core::Error) -> &'static str {
    match error {
        stateql_core::Error::Parse(_) => "parse",
        stateql_core::Error::Diff(_) => "diff",
        stateql_core::Error::Generate(_) => "generate",
        stateql_core::Error::Execute(_) => "execute",
        stateql_core::Error::Config(_) => "config",
    }
}

fn missing_desired_schema_message() -> &'static str {
    "missing desired schema SQL: pass --file <PATH> or pipe SQL via stdin"
}
