use crate::{Result, Version};

/// Per-dialect connection to a live database.
///
/// Contract requirements:
/// - `export_schema` returns DDL text that, fed back through the same dialect's parser,
///   reconstructs the observable current state.
/// - `execute` never implicitly wraps `sql` in a transaction; callers that need
///   transactional semantics go through [`begin`](DatabaseAdapter::begin).
/// - Implementations never write during [`Dialect::parse`](crate::Dialect::parse) or
///   [`Dialect::normalize`](crate::Dialect::normalize); only [`execute`](DatabaseAdapter::execute)
///   and [`Transaction::execute`] perform writes.
pub trait DatabaseAdapter {
    fn export_schema(&self) -> Result<String>;
    fn execute(&self, sql: &str) -> Result<()>;
    fn begin(&mut self) -> Result<Transaction<'_>>;
    fn schema_search_path(&self) -> Vec<String>;
    fn server_version(&self) -> Result<Version>;
}

/// An open transaction borrowed from a [`DatabaseAdapter`].
///
/// Dropping a `Transaction` without calling [`commit`](Transaction::commit) or
/// [`rollback`](Transaction::rollback) leaves the underlying connection's transaction
/// open; callers are expected to always resolve it explicitly, matching the Executor's
/// rollback-on-error protocol.
pub struct Transaction<'a> {
    adapter: &'a mut dyn DatabaseAdapter,
}

impl<'a> Transaction<'a> {
    #[must_use]
    pub fn new(adapter: &'a mut dyn DatabaseAdapter) -> Self {
        Self { adapter }
    }

    pub fn execute(&mut self, sql: &str) -> Result<()> {
        self.adapter.execute(sql)
    }

    pub fn commit(self) -> Result<()> {
        self.adapter.execute("COMMIT")
    }

    pub fn rollback(self) -> Result<()> {
        self.adapter.execute("ROLLBACK")
    }
}
