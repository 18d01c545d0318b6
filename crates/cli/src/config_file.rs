use serde::{Deserialize, Deserializer};

/// Mirrors the `GeneratorConfig` YAML keys accepted by `--config`/`--config-inline`.
///
/// Every list-valued key accepts either a single scalar string or a YAML sequence of
/// strings ("string-or-list form"); [`string_or_seq`] normalizes both shapes to `Vec<String>`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfigFile {
    #[serde(deserialize_with = "string_or_seq", default)]
    pub target_tables: Vec<String>,
    #[serde(deserialize_with = "string_or_seq", default)]
    pub skip_tables: Vec<String>,
    #[serde(deserialize_with = "string_or_seq", default)]
    pub skip_views: Vec<String>,
    #[serde(deserialize_with = "string_or_seq", default)]
    pub target_schema: Vec<String>,
    #[serde(deserialize_with = "string_or_seq", default)]
    pub managed_roles: Vec<String>,
    pub algorithm: Option<String>,
    pub lock: Option<String>,
    pub dump_concurrency: Option<i32>,
    pub enable_drop: Option<bool>,
    pub create_index_concurrently: Option<bool>,
    pub disable_ddl_transaction: Option<bool>,
    pub legacy_ignore_quotes: Option<bool>,
}

impl GeneratorConfigFile {
    /// Merges `other` on top of `self`: scalars are overwritten when `Some`, lists are
    /// appended in file/`--config-inline` order, matching the CLI's documented
    /// "merged in order" contract for repeatable `--config`/`--config-inline` flags.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.target_tables.extend(other.target_tables);
        self.skip_tables.extend(other.skip_tables);
        self.skip_views.extend(other.skip_views);
        self.target_schema.extend(other.target_schema);
        self.managed_roles.extend(other.managed_roles);
        self.algorithm = other.algorithm.or(self.algorithm);
        self.lock = other.lock.or(self.lock);
        self.dump_concurrency = other.dump_concurrency.or(self.dump_concurrency);
        self.enable_drop = other.enable_drop.or(self.enable_drop);
        self.create_index_concurrently = other
            .create_index_concurrently
            .or(self.create_index_concurrently);
        self.disable_ddl_transaction = other
            .disable_ddl_transaction
            .or(self.disable_ddl_transaction);
        self.legacy_ignore_quotes = other.legacy_ignore_quotes.or(self.legacy_ignore_quotes);
        self
    }
}

fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrSeq {
        One(String),
        Many(Vec<String>),
    }

    match StringOrSeq::deserialize(deserializer)? {
        StringOrSeq::One(value) => Ok(vec![value]),
        StringOrSeq::Many(values) => Ok(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_and_list_forms_for_the_same_key() {
        let scalar: GeneratorConfigFile = serde_yaml::from_str("skip_tables: logs").unwrap();
        assert_eq!(scalar.skip_tables, vec!["logs".to_string()]);

        let list: GeneratorConfigFile =
            serde_yaml::from_str("skip_tables:\n  - logs\n  - audits").unwrap();
        assert_eq!(
            list.skip_tables,
            vec!["logs".to_string(), "audits".to_string()]
        );
    }

    #[test]
    fn merge_appends_lists_and_overwrites_scalars_in_order() {
        let base: GeneratorConfigFile =
            serde_yaml::from_str("skip_tables: logs\nenable_drop: false").unwrap();
        let overlay: GeneratorConfigFile =
            serde_yaml::from_str("skip_tables: audits\nenable_drop: true").unwrap();

        let merged = base.merge(overlay);

        assert_eq!(
            merged.skip_tables,
            vec!["logs".to_string(), "audits".to_string()]
        );
        assert_eq!(merged.enable_drop, Some(true));
    }

    #[test]
    fn rejects_unknown_keys() {
        let result: Result<GeneratorConfigFile, _> = serde_yaml::from_str("not_a_real_key: 1");
        assert!(result.is_err());
    }

    #[test]
    fn dump_concurrency_parses_negative_and_positive_values_and_last_config_wins() {
        let negative: GeneratorConfigFile =
            serde_yaml::from_str("dump_concurrency: -1").unwrap();
        assert_eq!(negative.dump_concurrency, Some(-1));

        let base: GeneratorConfigFile = serde_yaml::from_str("dump_concurrency: 4").unwrap();
        let overlay: GeneratorConfigFile = serde_yaml::from_str("dump_concurrency: 8").unwrap();
        let merged = base.merge(overlay);
        assert_eq!(merged.dump_concurrency, Some(8));
    }
}
