use serde::{Deserialize, Serialize};
use crate::expression::index_columns_clause;
use crate::helpers::is_blank;
use crate::models::QualifiedName;
use crate::{DboKind, DboToolsError, Result};

pub const DEFAULT_INDEX_METHOD: &str = "btree";

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub columns: Vec<IndexColumn>,
    #[serde(default)]
    pub is_unique: bool,
    /// Access method, `btree` when left empty.
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub predicate: Option<String>,
    /// The full `create index` statement as reported by postgres. Only used when
    /// rendering in simple mode.
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub tablespace: Option<String>,
}

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct IndexColumn {
    pub name: String,
    #[serde(default)]
    pub collation: Option<String>,
    #[serde(default)]
    pub direction: Option<IndexColumnDirection>,
    #[serde(default)]
    pub nulls_order: Option<IndexNullsOrder>,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum IndexColumnDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexNullsOrder {
    First,
    Last,
}

impl IndexColumn {
    pub fn new(name: &str) -> Self {
        IndexColumn {
            name: name.to_string(),
            ..crate::default()
        }
    }
}

impl IndexDescriptor {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        IndexDescriptor {
            name: name.to_string(),
            columns: columns.iter().map(|c| IndexColumn::new(c)).collect(),
            ..crate::default()
        }
    }

    pub fn method(&self) -> &str {
        if is_blank(&self.method) {
            DEFAULT_INDEX_METHOD
        } else {
            &self.method
        }
    }

    pub(crate) fn validate(&self, table: QualifiedName, simple: bool) -> Result {
        if is_blank(&self.name) {
            return Err(DboToolsError::invalid(DboKind::Table, &table.to_string(), "index without a name"));
        }

        if !simple && self.columns.is_empty() {
            return Err(DboToolsError::invalid(DboKind::Table, &table.to_string(), format!("index '{}' has no columns", self.name)));
        }

        Ok(())
    }

    pub fn get_create_statement(&self, table: QualifiedName, simple: bool) -> Result<String> {
        if simple {
            return match &self.definition {
                Some(definition) if !is_blank(definition) => Ok(format!("{};", definition.trim_end_matches(';'))),
                _ => Err(DboToolsError::invalid(DboKind::Table, &table.to_string(), format!("index '{}' has no definition", self.name))),
            };
        }

        let mut command = "create ".to_string();
        if self.is_unique {
            command.push_str("unique ");
        }
        command.push_str("index ");
        command.push_str(&self.name);
        command.push_str(" on ");
        command.push_str(&table.to_string());
        command.push_str(" using ");
        command.push_str(self.method());
        command.push_str(" (");
        command.push_str(&index_columns_clause(&self.columns));
        command.push(')');

        if let Some(tablespace) = &self.tablespace {
            command.push_str(" tablespace ");
            command.push_str(tablespace);
        }

        if let Some(predicate) = &self.predicate {
            command.push_str(" where (");
            command.push_str(predicate);
            command.push(')');
        }

        command.push(';');

        Ok(command)
    }

    /// Indexes live in the schema of their table.
    pub fn get_drop_statement(&self, schema: &str) -> String {
        format!("drop index if exists {}.{};", schema, self.name)
    }

    /// Returns the drop of the old index and the creation of the new one.
    pub fn get_update_statements(&self, old: &IndexDescriptor, table: QualifiedName, old_table: QualifiedName, simple: bool) -> Result<(String, String)> {
        Ok((old.get_drop_statement(old_table.schema), self.get_create_statement(table, simple)?))
    }
}
