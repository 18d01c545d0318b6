mod expr;
mod ident;
mod schema_object;
mod types;

pub use expr::{
    BinaryOperator, ComparisonOp, Expr, IsTest, Literal, SetQuantifier, SubQuery, UnaryOperator,
    WindowSpec,
};
pub use ident::{Ident, QualifiedName};
pub use schema_object::{
    CheckConstraint, CheckOption, Column, ColumnPosition, Comment, CommentTarget, Deferrable,
    Domain, EnumValuePosition, ExclusionConstraint, ExclusionElement, Extension, ForeignKey,
    ForeignKeyAction, Function, FunctionParam, FunctionParamMode, FunctionSecurity,
    GeneratedColumn, Identity, IndexColumn, IndexDef, IndexOwner, MaterializedView, NullsOrder,
    Partition, PartitionBound, PartitionElement, PartitionStrategy, Policy, PolicyCommand,
    PrimaryKey, Privilege, PrivilegeObject, PrivilegeOp, SchemaDef, SchemaObject, Sequence,
    SortOrder, Table, TableOptions, Trigger, TriggerEvent, TriggerForEach, TriggerTiming, TypeDef,
    TypeKind, View, ViewSecurity, Volatility,
};
pub use types::{DataType, Value, float_total_cmp, value_total_eq};

/// Keys into [`Column::extra`](schema_object::Column::extra),
/// [`ForeignKey::extra`](schema_object::ForeignKey::extra), and similar dialect-extension
/// maps that more than one dialect crate reads or writes, and so cannot live in any single
/// dialect crate's private `extra_keys` module.
pub mod extra_keys {
    pub mod mysql {
        /// Set on a [`Column`](super::super::Column) that carries `AUTO_INCREMENT`.
        pub const AUTO_INCREMENT: &str = "mysql.auto_increment";
    }

    pub mod mssql {
        /// Name of the `DEFAULT` constraint backing a column, read by the column-drop
        /// path so the constraint can be dropped before the column itself.
        pub const DEFAULT_CONSTRAINT_NAME: &str = "mssql.default_constraint_name";
    }
}
