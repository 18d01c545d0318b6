use crate::{Dialect, Statement, StatementContext, is_destructive_statement};

const SKIPPED_DIAGNOSTICS_HEADER: &str = "-- Skipped operations (enable_drop=false):";
const NOTHING_MODIFIED_LINE: &str = "-- Nothing is modified --";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunHeader {
    Apply,
    DryRun,
}

impl RunHeader {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Apply => "-- Apply --",
            Self::DryRun => "-- dry run --",
        }
    }
}

pub struct Renderer<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    #[must_use]
    pub const fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    /// Renders the full stdout transcript for a run: header line, skipped-operation
    /// diagnostics, the statements themselves, and the "nothing modified" marker when
    /// there is nothing else to show.
    #[must_use]
    pub fn render_run(
        &self,
        header: RunHeader,
        statements: &[Statement],
        skipped: &[String],
        enable_drop: bool,
    ) -> String {
        let mut rendered = String::new();
        rendered.push_str(header.label());
        rendered.push('\n');

        self.render_skipped_diagnostics(&mut rendered, skipped);

        if statements.is_empty() && skipped.is_empty() {
            rendered.push_str(NOTHING_MODIFIED_LINE);
            rendered.push('\n');
            return rendered;
        }

        rendered.push_str(&self.render_gated(statements, enable_drop));
        rendered
    }

    #[must_use]
    pub fn render(&self, statements: &[Statement]) -> String {
        self.render_gated(statements, true)
    }

    fn render_gated(&self, statements: &[Statement], enable_drop: bool) -> String {
        let mut rendered = String::new();

        for statement in statements {
            match statement {
                Statement::Sql { sql, context, .. }
                    if !enable_drop
                        && is_destructive_statement(sql)
                        && !matches!(context, Some(StatementContext::SqliteTableRebuild { .. })) =>
                {
                    rendered.push_str("-- Skipped: ");
                    rendered.push_str(sql);
                    rendered.push('\n');
                }
                Statement::Sql { sql, .. } => {
                    rendered.push_str(sql);
                    rendered.push('\n');
                }
                Statement::BatchBoundary => self.push_batch_separator(&mut rendered),
            }
        }

        rendered
    }

    fn push_batch_separator(&self, rendered: &mut String) {
        let separator = self.dialect.batch_separator();
        if separator.is_empty() {
            return;
        }

        rendered.push_str(separator);
        if !separator.ends_with('\n') {
            rendered.push('\n');
        }
    }

    pub(crate) fn render_skipped_diagnostics(&self, rendered: &mut String, diagnostics: &[String]) {
        if diagnostics.is_empty() {
            return;
        }

        self.render_diagnostics_header(rendered, SKIPPED_DIAGNOSTICS_HEADER);
        for message in diagnostics {
            rendered.push_str("-- Skipped: ");
            rendered.push_str(message);
            rendered.push('\n');
        }
        rendered.push('\n');
    }

    fn render_diagnostics_header(&self, rendered: &mut String, header: &str) {
        rendered.push_str(header);
        rendered.push('\n');
    }
}
