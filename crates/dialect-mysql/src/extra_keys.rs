pub(crate) const TABLE_SOURCE_SQL: &str = "mysql.source_sql";
pub(crate) const TABLE_PARTITION_SQL: &str = "mysql.partition_sql";
pub(crate) const TABLE_HAS_CHANGE_COLUMN: &str = "mysql.has_change_column";
pub(crate) const TABLE_HAS_AFTER_CLAUSE: &str = "mysql.has_after_clause";
pub(crate) const TABLE_HAS_AUTO_INCREMENT: &str = "mysql.has_auto_increment";
pub(crate) const TABLE_HAS_PARTITIONING: &str = "mysql.has_partitioning";
