pub(crate) const TABLE_IF_NOT_EXISTS: &str = "postgres.if_not_exists";
pub(crate) const TABLE_ACCESS_METHOD: &str = "postgres.access_method";
pub(crate) const TABLESPACE: &str = "postgres.tablespace";
pub(crate) const TABLE_PARTITION_PARENT_SCHEMA: &str = "postgres.partition_parent_schema";
pub(crate) const TABLE_PARTITION_PARENT_NAME: &str = "postgres.partition_parent_name";
pub(crate) const COLUMN_IDENTITY: &str = "postgres.identity";
pub(crate) const COLUMN_GENERATED: &str = "postgres.generated";
