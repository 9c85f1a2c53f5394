//! Searchable attribute declarations.
//!
//! A registry is built once per model, validated at build time, and shared
//! read-only by every compilation afterwards.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::LazyLock,
};

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::{error::SpecificationError, value::ColumnType};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// Logical keys must lex as a single word of the query grammar.
static LOGICAL_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("logical key pattern"));

/// A declared `table.column` pair, before alias substitution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhysicalColumn {
    pub table: String,
    pub column: String,
}

impl fmt::Display for PhysicalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Per-attribute options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct AttributeOptions {
    /// Included in bare-term searches. `None` means "not stated".
    pub default: Option<bool>,
    /// Declared scalar type; text when absent.
    pub kind: Option<ColumnType>,
}

impl AttributeOptions {
    pub fn with_default(mut self, default: bool) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_kind(mut self, kind: ColumnType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn column_type(&self) -> ColumnType {
        self.kind.unwrap_or_default()
    }

    /// Later declarations override the fields they state.
    fn merge(&mut self, other: AttributeOptions) {
        if other.default.is_some() {
            self.default = other.default;
        }
        if other.kind.is_some() {
            self.kind = other.kind;
        }
    }
}

/// Read-only view of a model's searchable attributes, consumed by the
/// resolver.
pub trait Registry {
    /// Columns a logical key maps to, or `None` when the key is not searchable.
    fn columns_for(&self, key: &str) -> Option<&[PhysicalColumn]>;

    fn options_for(&self, key: &str) -> AttributeOptions;

    /// Keys searched by bare terms, in declaration order.
    fn default_keys(&self) -> Vec<&str>;

    /// Replacement for a table name component, if one was declared.
    fn alias_for(&self, table: &str) -> Option<&str>;

    fn has_attributes(&self) -> bool;
}

#[derive(Debug, Clone)]
struct Attribute {
    key: String,
    columns: Vec<PhysicalColumn>,
    options: AttributeOptions,
}

/// The registry built from declarations.
#[derive(Debug, Clone)]
pub struct AttributeRegistry {
    model: String,
    table: String,
    attributes: Vec<Attribute>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, String>,
}

impl AttributeRegistry {
    /// Start declaring the searchable attributes of `model`.
    ///
    /// The default table is derived from the model name (`UserProfile` →
    /// `user_profiles`) unless [`RegistryBuilder::table_name`] overrides it.
    pub fn builder(model: impl Into<String>) -> RegistryBuilder {
        RegistryBuilder {
            model: model.into(),
            table: None,
            declarations: Vec::new(),
            options: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn from_config(config: RegistryConfig) -> Result<Self, SpecificationError> {
        let mut builder = Self::builder(config.model);
        if let Some(table) = config.table {
            builder = builder.table_name(table);
        }
        for attribute in config.attributes {
            let columns = attribute
                .columns
                .unwrap_or_else(|| vec![attribute.key.clone()]);
            let options = AttributeOptions {
                default: attribute.default,
                kind: attribute.kind,
            };
            builder = builder
                .searchable(attribute.key.clone(), columns)
                .options(attribute.key, options);
        }
        for (table, replacement) in config.aliases {
            builder = builder.alias(table, replacement);
        }
        builder.build()
    }

    pub fn from_json_str(json: &str) -> Result<Self, SpecificationError> {
        let config: RegistryConfig = serde_json::from_str(json)?;
        Self::from_config(config)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|attribute| attribute.key.as_str())
    }

    fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.index.get(key).map(|&i| &self.attributes[i])
    }
}

impl Registry for AttributeRegistry {
    fn columns_for(&self, key: &str) -> Option<&[PhysicalColumn]> {
        self.attribute(key).map(|attribute| attribute.columns.as_slice())
    }

    fn options_for(&self, key: &str) -> AttributeOptions {
        self.attribute(key)
            .map(|attribute| attribute.options)
            .unwrap_or_default()
    }

    fn default_keys(&self) -> Vec<&str> {
        let explicit: Vec<&str> = self
            .attributes
            .iter()
            .filter(|attribute| attribute.options.default == Some(true))
            .map(|attribute| attribute.key.as_str())
            .collect();
        if !explicit.is_empty() {
            return explicit;
        }

        self.attributes
            .iter()
            .filter(|attribute| attribute.options.default != Some(false))
            .map(|attribute| attribute.key.as_str())
            .collect()
    }

    fn alias_for(&self, table: &str) -> Option<&str> {
        self.aliases.get(table).map(String::as_str)
    }

    fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }
}

/// Collects declarations; validation happens in [`RegistryBuilder::build`].
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    model: String,
    table: Option<String>,
    declarations: Vec<(String, Vec<String>)>,
    options: Vec<(String, AttributeOptions)>,
    aliases: Vec<(String, String)>,
}

impl RegistryBuilder {
    pub fn table_name(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Declare `key` as searchable over `columns`, each either `column` (on
    /// the model's table) or `table.column`. Re-declaring a key replaces its
    /// columns.
    pub fn searchable<I, S>(mut self, key: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declarations
            .push((key.into(), columns.into_iter().map(Into::into).collect()));
        self
    }

    /// Declare a key that maps to the column of the same name.
    pub fn attribute(self, key: impl Into<String>) -> Self {
        let key = key.into();
        let column = key.clone();
        self.searchable(key, [column])
    }

    pub fn options(mut self, key: impl Into<String>, options: AttributeOptions) -> Self {
        self.options.push((key.into(), options));
        self
    }

    /// Substitute `replacement` for the table component `table` when
    /// resolving columns.
    pub fn alias(mut self, table: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.aliases.push((table.into(), replacement.into()));
        self
    }

    pub fn build(self) -> Result<AttributeRegistry, SpecificationError> {
        let model = self.model.trim().to_string();
        if model.is_empty() {
            return Err(SpecificationError::EmptyModel);
        }
        let table = self.table.unwrap_or_else(|| tableize(&model));
        if !IDENTIFIER.is_match(&table) {
            return Err(SpecificationError::InvalidIdentifier(table));
        }

        let mut attributes: Vec<Attribute> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (key, columns) in self.declarations {
            if !LOGICAL_KEY.is_match(&key) {
                return Err(SpecificationError::InvalidIdentifier(key));
            }
            if columns.is_empty() {
                return Err(SpecificationError::NoColumns(key));
            }
            let columns = columns
                .iter()
                .map(|column| physical_column(&key, column, &table))
                .collect::<Result<Vec<_>, _>>()?;

            match index.get(&key) {
                Some(&i) => attributes[i].columns = columns,
                None => {
                    index.insert(key.clone(), attributes.len());
                    attributes.push(Attribute {
                        key,
                        columns,
                        options: AttributeOptions::default(),
                    });
                }
            }
        }

        for (key, options) in self.options {
            let Some(&i) = index.get(&key) else {
                return Err(SpecificationError::UndeclaredAttribute(key));
            };
            attributes[i].options.merge(options);
        }

        let mut aliases = HashMap::new();
        for (from, to) in self.aliases {
            for name in [&from, &to] {
                if !IDENTIFIER.is_match(name) {
                    return Err(SpecificationError::InvalidIdentifier(name.clone()));
                }
            }
            aliases.insert(from, to);
        }

        debug!(
            model = %model,
            table = %table,
            attributes = attributes.len(),
            aliases = aliases.len(),
            "searchable attributes registered"
        );

        Ok(AttributeRegistry {
            model,
            table,
            attributes,
            index,
            aliases,
        })
    }
}

fn physical_column(
    key: &str,
    column: &str,
    default_table: &str,
) -> Result<PhysicalColumn, SpecificationError> {
    let invalid = || SpecificationError::InvalidColumn {
        key: key.to_string(),
        column: column.to_string(),
    };

    let (table, name) = match column.split_once('.') {
        Some((table, name)) => (table, name),
        None => (default_table, column),
    };
    if !IDENTIFIER.is_match(table) || !IDENTIFIER.is_match(name) {
        return Err(invalid());
    }

    Ok(PhysicalColumn {
        table: table.to_string(),
        column: name.to_string(),
    })
}

/// Table name for a model: last path segment, snake_case, pluralized.
///
/// ```
/// use attr_search::registry::tableize;
///
/// assert_eq!(tableize("User"), "users");
/// assert_eq!(tableize("app::UserProfile"), "user_profiles");
/// assert_eq!(tableize("Category"), "categories");
/// ```
pub fn tableize(model: &str) -> String {
    let name = model.rsplit("::").next().unwrap_or(model);
    let chars: Vec<char> = name.chars().collect();

    let mut snake = String::with_capacity(name.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                snake.push('_');
            }
        }
        snake.extend(ch.to_lowercase());
    }

    pluralize(&snake)
}

fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) && !stem.is_empty() {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// JSON description of a model's searchable attributes.
///
/// ```json
/// {
///   "model": "User",
///   "attributes": [
///     {"key": "name", "columns": ["first_name", "last_name"], "default": true},
///     {"key": "age", "type": "number"},
///     {"key": "city", "columns": ["addresses.city"]}
///   ],
///   "aliases": {"addresses": "home_addresses"}
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    pub model: String,
    #[serde(default)]
    pub table: Option<String>,
    pub attributes: Vec<AttributeConfig>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeConfig {
    pub key: String,
    /// Defaults to a single column named like the key.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default, rename = "type")]
    pub kind: Option<ColumnType>,
    #[serde(default)]
    pub default: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tableize() {
        assert_eq!(tableize("Box"), "boxes");
        assert_eq!(tableize("Day"), "days");
        assert_eq!(tableize("HTTPRequest"), "http_requests");
        assert_eq!(tableize("Admin::Comment"), "comments");
    }

    #[test]
    fn test_default_keys_fall_back_to_all_not_excluded() {
        let registry = AttributeRegistry::builder("User")
            .attribute("name")
            .attribute("email")
            .attribute("token")
            .options("token", AttributeOptions::default().with_default(false))
            .build()
            .unwrap();
        assert_eq!(registry.default_keys(), vec!["name", "email"]);
    }

    #[test]
    fn test_explicit_default_keys_win() {
        let registry = AttributeRegistry::builder("User")
            .attribute("name")
            .attribute("email")
            .options("email", AttributeOptions::default().with_default(true))
            .build()
            .unwrap();
        assert_eq!(registry.default_keys(), vec!["email"]);
    }

    #[test]
    fn test_redeclaration_replaces_columns() {
        let registry = AttributeRegistry::builder("User")
            .searchable("name", ["first_name"])
            .searchable("name", ["first_name", "last_name"])
            .build()
            .unwrap();
        assert_eq!(registry.columns_for("name").map(<[_]>::len), Some(2));
        assert_eq!(registry.keys().count(), 1);
    }
}
