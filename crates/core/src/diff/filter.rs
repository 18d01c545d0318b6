use crate::{
    CommentTarget, DiffConfig, Ident, IndexOwner, PrivilegeObject, QualifiedName, SchemaObject,
};

/// Applies `target_tables`/`skip_tables`/`skip_views`/`target_schema`/`managed_roles`
/// to a schema's object list. A skipped object is dropped from the slice entirely, so
/// that everything downstream treats it as if it never existed on either side.
pub(super) fn filter_objects(objects: &[SchemaObject], config: &DiffConfig) -> Vec<SchemaObject> {
    if !config.has_object_filters() && config.managed_roles.is_empty() {
        return objects.to_vec();
    }

    objects
        .iter()
        .filter(|object| keep_object(object, config))
        .cloned()
        .collect()
}

fn keep_object(object: &SchemaObject, config: &DiffConfig) -> bool {
    match object {
        SchemaObject::Table(table) => keep_table(&table.name, config),
        SchemaObject::View(view) => keep_view(&view.name, config),
        SchemaObject::MaterializedView(view) => keep_view(&view.name, config),
        SchemaObject::Index(index) => keep_index_owner(&index.owner, config),
        SchemaObject::Trigger(trigger) => keep_table(&trigger.table, config),
        SchemaObject::Policy(policy) => keep_table(&policy.table, config),
        SchemaObject::Sequence(sequence) => keep_schema(sequence.name.schema.as_ref(), config),
        SchemaObject::Function(function) => keep_schema(function.name.schema.as_ref(), config),
        SchemaObject::Type(type_def) => keep_schema(type_def.name.schema.as_ref(), config),
        SchemaObject::Domain(domain) => keep_schema(domain.name.schema.as_ref(), config),
        SchemaObject::Extension(extension) => keep_schema(extension.schema.as_ref(), config),
        SchemaObject::Schema(schema_def) => keep_schema_name(&schema_def.name, config),
        SchemaObject::Comment(comment) => keep_comment_target(&comment.target, config),
        SchemaObject::Privilege(privilege) => {
            keep_privilege_object(&privilege.on, config) && keep_role(&privilege.grantee, config)
        }
    }
}

fn keep_index_owner(owner: &IndexOwner, config: &DiffConfig) -> bool {
    match owner {
        IndexOwner::Table(name) => keep_table(name, config),
        IndexOwner::View(name) | IndexOwner::MaterializedView(name) => keep_view(name, config),
    }
}

fn keep_comment_target(target: &CommentTarget, config: &DiffConfig) -> bool {
    match target {
        CommentTarget::Table(name) | CommentTarget::Column { table: name, .. } => {
            keep_table(name, config)
        }
        CommentTarget::View(name) | CommentTarget::MaterializedView(name) => {
            keep_view(name, config)
        }
        CommentTarget::Index(name)
        | CommentTarget::Sequence(name)
        | CommentTarget::Trigger(name)
        | CommentTarget::Function(name)
        | CommentTarget::Type(name)
        | CommentTarget::Domain(name) => keep_schema(name.schema.as_ref(), config),
        CommentTarget::Extension(name) | CommentTarget::Schema(name) => {
            keep_schema_name(name, config)
        }
    }
}

fn keep_privilege_object(object: &PrivilegeObject, config: &DiffConfig) -> bool {
    match object {
        PrivilegeObject::Table(name) => keep_table(name, config),
        PrivilegeObject::View(name) | PrivilegeObject::MaterializedView(name) => {
            keep_view(name, config)
        }
        PrivilegeObject::Sequence(name)
        | PrivilegeObject::Domain(name)
        | PrivilegeObject::Type(name)
        | PrivilegeObject::Function(name) => keep_schema(name.schema.as_ref(), config),
        PrivilegeObject::Schema(name) | PrivilegeObject::Database(name) => {
            keep_schema_name(name, config)
        }
    }
}

fn keep_table(name: &QualifiedName, config: &DiffConfig) -> bool {
    if !keep_schema(name.schema.as_ref(), config) {
        return false;
    }

    let qualified = qualified_name_text(name);
    if !config.target_tables.is_empty()
        && !config
            .target_tables
            .iter()
            .any(|pattern| pattern.is_match(&qualified))
    {
        return false;
    }

    !config
        .skip_tables
        .iter()
        .any(|pattern| pattern.is_match(&qualified))
}

fn keep_view(name: &QualifiedName, config: &DiffConfig) -> bool {
    if !keep_schema(name.schema.as_ref(), config) {
        return false;
    }

    let qualified = qualified_name_text(name);
    !config
        .skip_views
        .iter()
        .any(|pattern| pattern.is_match(&qualified))
}

/// Tables/views qualified by a schema outside `target_schema` are dropped. An
/// unqualified name is always kept: resolving it against the search path is the
/// differencing engine's job, not the filter's.
fn keep_schema(schema: Option<&Ident>, config: &DiffConfig) -> bool {
    if config.target_schema.is_empty() {
        return true;
    }

    match schema {
        Some(schema) => config
            .target_schema
            .iter()
            .any(|candidate| candidate == &schema.value),
        None => true,
    }
}

fn keep_schema_name(name: &Ident, config: &DiffConfig) -> bool {
    if config.target_schema.is_empty() {
        return true;
    }

    config
        .target_schema
        .iter()
        .any(|candidate| candidate == &name.value)
}

fn keep_role(grantee: &Ident, config: &DiffConfig) -> bool {
    if config.managed_roles.is_empty() {
        return true;
    }

    config
        .managed_roles
        .iter()
        .any(|role| role == &grantee.value)
}

fn qualified_name_text(name: &QualifiedName) -> String {
    match &name.schema {
        Some(schema) => format!("{}.{}", schema.value, name.name.value),
        None => name.name.value.clone(),
    }
}
