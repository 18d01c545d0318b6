use crate::{
    DatabaseAdapter, Error, ExecutionError, Result, SourceLocation, Statement, StatementContext,
    Transaction, is_destructive_statement,
};

pub struct Executor<'a> {
    adapter: &'a mut dyn DatabaseAdapter,
    enable_drop: bool,
}

impl<'a> Executor<'a> {
    #[must_use]
    pub fn new(adapter: &'a mut dyn DatabaseAdapter, enable_drop: bool) -> Self {
        Self {
            adapter,
            enable_drop,
        }
    }

    /// A statement the drop-gating rule vetoes: its text is destructive and
    /// `enable_drop=false`. Such statements are never sent to the adapter.
    ///
    /// Statements carrying a [`StatementContext::SqliteTableRebuild`] context are exempt:
    /// the `DROP TABLE` in a rebuild is a mechanical step of an otherwise non-destructive
    /// `AlterColumn`, and skipping it would leave the renamed shadow table unable to take
    /// the original name.
    fn is_gated(&self, sql: &str, context: Option<&StatementContext>) -> bool {
        if matches!(context, Some(StatementContext::SqliteTableRebuild { .. })) {
            return false;
        }
        !self.enable_drop && is_destructive_statement(sql)
    }

    pub fn execute_plan(&mut self, statements: &[Statement]) -> Result<()> {
        self.execute_plan_with_hook(None, statements)
    }

    /// Runs `before_apply` verbatim inside the transaction ahead of the first
    /// transactional statement (opening one solely for the hook when the plan starts
    /// non-transactional or is empty), then executes `statements` as normal.
    pub fn execute_plan_with_hook(
        &mut self,
        before_apply: Option<&str>,
        statements: &[Statement],
    ) -> Result<()> {
        let hook = before_apply.map(str::trim).filter(|sql| !sql.is_empty());
        let mut index = 0;
        let mut executed_statements = 0;

        let hook_joins_first_group = hook.is_some()
            && statements
                .first()
                .is_some_and(Statement::is_transactional);

        if !hook_joins_first_group {
            if let Some(hook_sql) = hook {
                self.run_hook_alone(hook_sql, &mut executed_statements)?;
            }
        }

        while index < statements.len() {
            let pending_hook = if index == 0 && hook_joins_first_group {
                hook
            } else {
                None
            };
            index = self.execute_next_group(statements, index, &mut executed_statements, pending_hook)?;
        }

        Ok(())
    }

    fn run_hook_alone(&mut self, hook_sql: &str, executed_statements: &mut usize) -> Result<()> {
        let mut tx = self
            .adapter
            .begin()
            .map_err(|source| Self::build_statement_failed(0, hook_sql, None, *executed_statements, source))?;
        tx.execute(hook_sql)
            .map_err(|source| Self::build_statement_failed(0, hook_sql, None, *executed_statements, source))?;
        tx.commit()?;
        Ok(())
    }

    fn execute_next_group(
        &mut self,
        statements: &[Statement],
        start: usize,
        executed_statements: &mut usize,
        hook: Option<&str>,
    ) -> Result<usize> {
        match &statements[start] {
            Statement::Sql {
                transactional: true,
                sql,
                context,
                ..
            } => self.execute_transactional_group(
                statements,
                start,
                sql,
                context.as_ref(),
                executed_statements,
                hook,
            ),
            Statement::Sql {
                sql,
                transactional: false,
                context,
            } => self.execute_non_transactional_statement(
                start,
                sql,
                context.as_ref(),
                executed_statements,
            ),
            Statement::BatchBoundary => Ok(start + 1),
        }
    }

    fn execute_transactional_group(
        &mut self,
        statements: &[Statement],
        start: usize,
        start_sql: &str,
        start_context: Option<&StatementContext>,
        executed_statements: &mut usize,
        hook: Option<&str>,
    ) -> Result<usize> {
        let mut tx = Some(self.adapter.begin().map_err(|source| {
            Self::build_statement_failed(
                start,
                start_sql,
                start_context,
                *executed_statements,
                source,
            )
        })?);

        if let Some(hook_sql) = hook {
            tx.as_mut()
                .expect("transaction just opened")
                .execute(hook_sql)
                .map_err(|source| {
                    Self::build_statement_failed(start, hook_sql, None, *executed_statements, source)
                })?;
        }

        let mut cursor = start;
        let mut last_sql = start_sql;
        let mut last_statement_index = start;
        let mut last_context = start_context.cloned();

        while let Some(statement) = statements.get(cursor) {
            match statement {
                Statement::Sql {
                    sql,
                    transactional: true,
                    context,
                } => {
                    if !self.is_gated(sql, context.as_ref()) {
                        if let Some(transaction) = tx.as_mut() {
                            transaction.execute(sql).map_err(|source| {
                                Self::build_statement_failed(
                                    cursor,
                                    sql,
                                    context.as_ref(),
                                    *executed_statements,
                                    source,
                                )
                            })?;
                        }
                        *executed_statements += 1;
                    }
                    last_statement_index = cursor;
                    last_sql = sql;
                    last_context = context.clone();
                    cursor += 1;
                }
                Statement::Sql {
                    transactional: false,
                    ..
                } => break,
                Statement::BatchBoundary => {
                    cursor += 1;
                }
            }
        }

        Self::flush_tx_if_open(tx).map_err(|source| {
            Self::build_statement_failed(
                last_statement_index,
                last_sql,
                last_context.as_ref(),
                *executed_statements,
                source,
            )
        })?;
        Ok(cursor)
    }

    fn execute_non_transactional_statement(
        &mut self,
        start: usize,
        sql: &str,
        context: Option<&StatementContext>,
        executed_statements: &mut usize,
    ) -> Result<usize> {
        if !self.is_gated(sql, context) {
            self.adapter.execute(sql).map_err(|source| {
                Self::build_statement_failed(start, sql, context, *executed_statements, source)
            })?;
            *executed_statements += 1;
        }
        Ok(start + 1)
    }

    fn flush_tx_if_open(transaction: Option<Transaction<'_>>) -> Result<()> {
        if let Some(transaction) = transaction {
            transaction.commit()?;
        }

        Ok(())
    }

    fn build_statement_failed(
        statement_index: usize,
        sql: &str,
        context: Option<&StatementContext>,
        executed_statements: usize,
        source: Error,
    ) -> Error {
        let source_location = Self::inherited_source_location(&source);
        let inherited_context = Self::inherited_statement_context(&source);

        ExecutionError::statement_failed(
            statement_index,
            sql,
            executed_statements,
            source_location,
            context.cloned().or(inherited_context),
            source,
        )
        .into()
    }

    fn inherited_source_location(source: &Error) -> Option<SourceLocation> {
        match source {
            Error::Execute(ExecutionError::StatementFailed {
                source_location, ..
            }) => source_location.clone(),
            _ => None,
        }
    }

    fn inherited_statement_context(source: &Error) -> Option<StatementContext> {
        match source {
            Error::Execute(ExecutionError::StatementFailed {
                statement_context, ..
            }) => statement_context.as_deref().cloned(),
            _ => None,
        }
    }
}
