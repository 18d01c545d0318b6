use crate::QualifiedName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteRebuildStep {
    CreateShadowTable,
    CopyData,
    DropOldTable,
    RenameShadowTable,
    RecreateIndexes,
    RecreateTriggers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementContext {
    SqliteTableRebuild {
        table: QualifiedName,
        step: SqliteRebuildStep,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Sql {
        sql: String,
        transactional: bool,
        context: Option<StatementContext>,
    },
    BatchBoundary,
}

impl Statement {
    #[must_use]
    pub const fn is_transactional(&self) -> bool {
        matches!(self, Self::Sql { transactional: true, .. })
    }
}

/// Top-level verbs that make a statement "destructive" per the drop-gating rule:
/// when `enable_drop=false`, a statement whose text contains one of these is logged
/// commented and never sent to the database, regardless of which [`crate::DiffOp`]
/// produced it.
const DESTRUCTIVE_KEYWORDS: [&str; 13] = [
    "DROP TABLE",
    "DROP SCHEMA",
    "DROP COLUMN",
    "DROP ROLE",
    "DROP USER",
    "DROP FUNCTION",
    "DROP PROCEDURE",
    "DROP TRIGGER",
    "DROP VIEW",
    "DROP MATERIALIZED VIEW",
    "DROP INDEX",
    "DROP SEQUENCE",
    "DROP TYPE",
];

/// Catches destructive SQL that reaches the Executor by a path the diff engine's
/// `enable_drop` gating never sees, e.g. the `DROP TABLE` a SQLite table rebuild
/// issues against the original table while applying an unrelated `AlterColumn`.
#[must_use]
pub fn is_destructive_statement(sql: &str) -> bool {
    DESTRUCTIVE_KEYWORDS
        .iter()
        .any(|keyword| sql.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::is_destructive_statement;

    #[test]
    fn flags_known_destructive_verbs() {
        assert!(is_destructive_statement("DROP TABLE users;"));
        assert!(is_destructive_statement("ALTER TABLE t DROP COLUMN c;"));
        assert!(is_destructive_statement("DROP MATERIALIZED VIEW v;"));
    }

    #[test]
    fn leaves_non_destructive_statements_alone() {
        assert!(!is_destructive_statement("CREATE TABLE users (id INT);"));
        assert!(!is_destructive_statement("ALTER TABLE t ADD COLUMN c INT;"));
    }
}
