use serde::{Deserialize, Serialize};
use crate::helpers::is_blank;
use crate::models::QualifiedName;
use crate::{DboKind, DboToolsError, Result};

/// A sequence. Every attribute can be altered in place, so a sequence is never recreated.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct SequenceDescriptor {
    pub schema: String,
    pub name: String,
    pub increment: i64,
    pub min_value: i64,
    pub max_value: i64,
    pub start_value: i64,
    #[serde(default)]
    pub cycle: bool,
    pub cache_size: i64,
}

impl SequenceDescriptor {
    pub fn qualified_name(&self) -> QualifiedName<'_> {
        QualifiedName::new(&self.schema, &self.name)
    }

    pub fn validate(&self) -> Result {
        if is_blank(&self.schema) || is_blank(&self.name) {
            return Err(DboToolsError::invalid(DboKind::Sequence, &self.qualified_name().to_string(), "schema and name are required"));
        }

        Ok(())
    }

    pub fn get_create_statement(&self) -> String {
        let mut sql = format!("create sequence if not exists {} increment {} minvalue {} maxvalue {} start {} cache {}",
                              self.qualified_name(), self.increment, self.min_value, self.max_value, self.start_value, self.cache_size);

        if self.cycle {
            sql.push_str(" cycle");
        }

        sql.push(';');

        sql
    }

    /// The attribute clauses that differ from the old sequence, in the order they are
    /// rendered in a single `alter sequence`.
    fn get_changed_attributes(&self, old: &SequenceDescriptor) -> Vec<String> {
        let mut changes = Vec::new();

        if old.min_value != self.min_value {
            changes.push(format!("minvalue {}", self.min_value));
        }
        if old.max_value != self.max_value {
            changes.push(format!("maxvalue {}", self.max_value));
        }
        if old.start_value != self.start_value {
            changes.push(format!("start {}", self.start_value));
        }
        if old.increment != self.increment {
            changes.push(format!("increment {}", self.increment));
        }
        if old.cache_size != self.cache_size {
            changes.push(format!("cache {}", self.cache_size));
        }
        if old.cycle != self.cycle {
            changes.push(if self.cycle { "cycle" } else { "no cycle" }.to_string());
        }

        changes
    }

    /// Moves the old sequence into the schema of this one.
    pub fn get_set_schema_statement(&self, old: &SequenceDescriptor) -> String {
        format!("alter sequence if exists {} set schema {};", old.qualified_name(), self.schema)
    }

    /// Renames the old sequence, after it has been moved to the new schema.
    pub fn get_rename_statement(&self, old: &SequenceDescriptor) -> String {
        format!("alter sequence if exists {}.{} rename to {};", self.schema, old.name, self.name)
    }

    pub fn get_alter_statement(&self, old: &SequenceDescriptor) -> Option<String> {
        let changes = self.get_changed_attributes(old);
        if changes.is_empty() {
            return None;
        }

        Some(format!("alter sequence if exists {} {};", self.qualified_name(), changes.join(" ")))
    }
}
