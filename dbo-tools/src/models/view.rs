use serde::{Deserialize, Serialize};
use crate::helpers::{comment_value, is_blank};
use crate::models::QualifiedName;
use crate::sql_text::SqlText;
use crate::{DboKind, DboToolsError, Result};

#[derive(Debug, Eq, PartialEq, Default, Clone, Serialize, Deserialize)]
pub struct ViewDescriptor {
    pub schema: String,
    pub name: String,
    /// The select query the view is defined as.
    pub definition: SqlText,
    #[serde(default)]
    pub description: Option<String>,
}

impl ViewDescriptor {
    pub fn qualified_name(&self) -> QualifiedName<'_> {
        QualifiedName::new(&self.schema, &self.name)
    }

    pub fn validate(&self) -> Result {
        let fail = |reason: &str| Err(DboToolsError::invalid(DboKind::View, &self.qualified_name().to_string(), reason));

        if is_blank(&self.schema) || is_blank(&self.name) {
            return fail("schema and name are required");
        }
        if is_blank(&self.definition) {
            return fail("the view has no query");
        }

        Ok(())
    }

    pub fn get_create_view_sql(&self) -> String {
        let mut sql = format!("create or replace view {} as ", self.qualified_name());
        sql.push_str(self.definition.trim_end().trim_end_matches(';'));
        sql.push(';');
        sql
    }

    pub fn get_comment_statement(&self) -> Option<String> {
        self.description.as_ref().map(|d| format!("comment on view {} is {};", self.qualified_name(), comment_value(Some(d))))
    }

    pub fn get_drop_statement(&self) -> String {
        format!("drop view if exists {};", self.qualified_name())
    }
}
