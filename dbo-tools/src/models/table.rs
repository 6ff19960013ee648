use serde::{Deserialize, Serialize};
use crate::helpers::{comment_value, first_duplicate, is_blank};
use crate::models::{ColumnDescriptor, ConstraintDescriptor, IndexDescriptor, QualifiedName};
use crate::{DboKind, DboToolsError, Result};

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub constraints: Vec<ConstraintDescriptor>,
    #[serde(default)]
    pub indices: Vec<IndexDescriptor>,
}

impl TableDescriptor {
    pub fn new(schema: &str, name: &str) -> Self {
        TableDescriptor {
            schema: schema.to_string(),
            name: name.to_string(),
            ..crate::default()
        }
    }

    pub fn qualified_name(&self) -> QualifiedName<'_> {
        QualifiedName::new(&self.schema, &self.name)
    }

    pub fn validate(&self, simple: bool) -> Result {
        let table = self.qualified_name();

        if is_blank(&self.schema) || is_blank(&self.name) {
            return Err(DboToolsError::invalid(DboKind::Table, &table.to_string(), "schema and name are required"));
        }

        for column in &self.columns {
            column.validate(table)?;
        }
        for constraint in &self.constraints {
            constraint.validate(table, simple)?;
        }
        for index in &self.indices {
            index.validate(table, simple)?;
        }

        if let Some(name) = first_duplicate(self.columns.iter().map(|c| c.name.as_str())) {
            return Err(DboToolsError::invalid(DboKind::Table, &table.to_string(), format!("column '{}' is defined more than once", name)));
        }
        if let Some(name) = first_duplicate(self.constraints.iter().map(|c| c.name.as_str())) {
            return Err(DboToolsError::invalid(DboKind::Table, &table.to_string(), format!("constraint '{}' is defined more than once", name)));
        }
        if let Some(name) = first_duplicate(self.indices.iter().map(|c| c.name.as_str())) {
            return Err(DboToolsError::invalid(DboKind::Table, &table.to_string(), format!("index '{}' is defined more than once", name)));
        }

        Ok(())
    }

    /// Creates the bare table. Columns, constraints and indices are added afterwards by
    /// their own statements.
    pub fn get_create_statements(&self) -> Vec<String> {
        let mut statements = vec![format!("create table {} ();", self.qualified_name())];

        if self.comment.is_some() {
            statements.push(self.get_comment_statement());
        }

        statements
    }

    /// Renames the old table to the name of this one. The schema stays the same.
    pub fn get_rename_statement(&self, old: &TableDescriptor) -> String {
        format!("alter table {} rename to {};", old.qualified_name(), self.name)
    }

    pub fn get_comment_statement(&self) -> String {
        format!("comment on table {} is {};", self.qualified_name(), comment_value(self.comment.as_deref()))
    }
}
