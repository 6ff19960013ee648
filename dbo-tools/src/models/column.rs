use serde::{Deserialize, Serialize};
use crate::helpers::{comment_value, is_blank};
use crate::models::QualifiedName;
use crate::{DboKind, DboToolsError, Result};

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
    /// Length or precision, rendered as `data_type(length)`.
    #[serde(default)]
    pub data_type_length: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub identity: ColumnIdentity,
    #[serde(default)]
    pub ordinal_position: i32,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnIdentity {
    #[default]
    None,
    Always,
    ByDefault,
}

impl ColumnIdentity {
    fn generation(&self) -> Option<&'static str> {
        match self {
            ColumnIdentity::None => None,
            ColumnIdentity::Always => Some("always"),
            ColumnIdentity::ByDefault => Some("by default"),
        }
    }
}

/// Statements for adding a column.
///
/// `set_not_null` and `comment` are split out so they can run after any data backfill.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct ColumnAddScript {
    pub add: String,
    pub set_not_null: Option<String>,
    pub comment: Option<String>,
}

/// Statements for bringing an existing column in line with its new description.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct ColumnUpdateScript {
    pub rename: Option<String>,
    pub data_type: Option<String>,
    pub default_value: Option<String>,
    pub identity: Option<String>,
    pub set_not_null: Option<String>,
    pub drop_not_null: Option<String>,
    pub comment: Option<String>,
}

impl ColumnUpdateScript {
    pub fn is_empty(&self) -> bool {
        self == &ColumnUpdateScript::default()
    }
}

impl ColumnDescriptor {
    pub fn new(name: &str, data_type: &str) -> Self {
        ColumnDescriptor {
            name: name.to_string(),
            data_type: data_type.to_string(),
            ..crate::default()
        }
    }

    /// The data type including the length, if any.
    pub fn full_data_type(&self) -> String {
        match &self.data_type_length {
            Some(length) if !is_blank(length) => format!("{}({})", self.data_type, length),
            _ => self.data_type.clone(),
        }
    }

    pub(crate) fn validate(&self, table: QualifiedName) -> Result {
        if is_blank(&self.name) {
            return Err(DboToolsError::invalid(DboKind::Table, &table.to_string(), "column without a name"));
        }

        if is_blank(&self.data_type) {
            return Err(DboToolsError::invalid(DboKind::Table, &table.to_string(), format!("column '{}' has no data type", self.name)));
        }

        Ok(())
    }

    pub fn get_add_statements(&self, table: QualifiedName) -> ColumnAddScript {
        let mut add = format!("alter table {} add column {} {}", table, self.name, self.full_data_type());

        if let Some(default_value) = &self.default_value {
            add.push_str(" default ");
            add.push_str(default_value);
        }

        if let Some(generation) = self.identity.generation() {
            add.push_str(" generated ");
            add.push_str(generation);
            add.push_str(" as identity");
        }

        add.push(';');

        let set_not_null = self.required.then(|| self.get_set_not_null_statement(table));

        let comment = self.comment.as_ref().map(|_| self.get_comment_statement(table));

        ColumnAddScript {
            add,
            set_not_null,
            comment,
        }
    }

    /// Compares against the previous version of the column. Statements always address
    /// the column by its new name, after the rename.
    pub fn get_update_statements(&self, old: &ColumnDescriptor, table: QualifiedName) -> ColumnUpdateScript {
        let mut script = ColumnUpdateScript::default();

        if old.name != self.name {
            script.rename = Some(format!("alter table {} rename column {} to {};", table, old.name, self.name));
        }

        if old.data_type != self.data_type || old.data_type_length != self.data_type_length {
            script.data_type = Some(format!("alter table {} alter column {} type {};", table, self.name, self.full_data_type()));
        }

        if old.default_value != self.default_value {
            script.default_value = Some(match &self.default_value {
                Some(default_value) => format!("alter table {} alter column {} set default {}::{};", table, self.name, default_value, self.data_type),
                None => format!("alter table {} alter column {} drop default;", table, self.name),
            });
        }

        if old.required != self.required {
            if self.required {
                script.set_not_null = Some(self.get_set_not_null_statement(table));
            } else {
                script.drop_not_null = Some(format!("alter table {} alter column {} drop not null;", table, self.name));
            }
        }

        if old.identity != self.identity {
            script.identity = Some(match (old.identity.generation(), self.identity.generation()) {
                (_, None) => format!("alter table {} alter column {} drop identity if exists;", table, self.name),
                (None, Some(generation)) => format!("alter table {} alter column {} add generated {} as identity;", table, self.name, generation),
                (Some(_), Some(generation)) => format!("alter table {} alter column {} set generated {};", table, self.name, generation),
            });
        }

        if old.comment != self.comment {
            script.comment = Some(self.get_comment_statement(table));
        }

        script
    }

    pub fn get_drop_statement(&self, table: QualifiedName) -> String {
        format!("alter table {} drop column if exists {};", table, self.name)
    }

    fn get_set_not_null_statement(&self, table: QualifiedName) -> String {
        format!("alter table {} alter column {} set not null;", table, self.name)
    }

    fn get_comment_statement(&self, table: QualifiedName) -> String {
        format!("comment on column {}.{} is {};", table, self.name, comment_value(self.comment.as_deref()))
    }
}
