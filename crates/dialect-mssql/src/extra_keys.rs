pub(crate) const TABLE_PRIMARY_KEY_CLUSTERED: &str = "mssql.primary_key_clustered";
pub(crate) const TABLE_SOURCE_SQL: &str = "mssql.source_sql";
pub(crate) const COLUMN_IDENTITY_NOT_FOR_REPLICATION: &str = "mssql.identity_not_for_replication";
