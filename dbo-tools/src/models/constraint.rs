use serde::{Deserialize, Serialize};
use crate::expression::constraint_expression;
use crate::helpers::{comment_value, is_blank};
use crate::models::QualifiedName;
use crate::{DboKind, DboToolsError, Result};

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct ConstraintDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub kind: ConstraintKind,
    /// Constrained columns, for primary, unique and foreign keys.
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub deferrable: Deferrable,
    #[serde(default)]
    pub comment: Option<String>,
    /// The full constraint definition as reported by postgres, e.g. `PRIMARY KEY (id)`.
    /// Only used when rendering in simple mode.
    #[serde(default)]
    pub definition: Option<String>,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintKind {
    Check {
        #[serde(default)]
        condition: Option<String>,
    },
    Primary,
    Unique,
    Foreign(ForeignKeyReference),
    Exclude(ExclusionDefinition),
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct ForeignKeyReference {
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    #[serde(default)]
    pub on_update: ForeignKeyAction,
    #[serde(default)]
    pub on_delete: ForeignKeyAction,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ForeignKeyAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyAction::NoAction => "no action",
            ForeignKeyAction::Restrict => "restrict",
            ForeignKeyAction::Cascade => "cascade",
            ForeignKeyAction::SetNull => "set null",
            ForeignKeyAction::SetDefault => "set default",
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct ExclusionDefinition {
    /// Index access method backing the constraint, e.g. `gist`.
    pub method: String,
    pub elements: Vec<ExclusionElement>,
    #[serde(default)]
    pub predicate: Option<String>,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct ExclusionElement {
    pub column: String,
    pub operator: String,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deferrable {
    #[default]
    None,
    InitiallyImmediate,
    InitiallyDeferred,
}

/// What it takes to turn the old version of a constraint into the new one.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum ConstraintUpdate {
    /// A renamed primary key, which can stay in place.
    Rename(String),
    Replace {
        drop: String,
        add: Vec<String>,
    },
}

impl ConstraintDescriptor {
    pub fn new(name: &str, kind: ConstraintKind, columns: &[&str]) -> Self {
        ConstraintDescriptor {
            name: name.to_string(),
            kind,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            deferrable: Deferrable::None,
            comment: None,
            definition: None,
        }
    }

    /// Primary and unique keys can be referenced by foreign keys, so they are created
    /// before anything that might depend on them.
    pub fn is_key(&self) -> bool {
        matches!(self.kind, ConstraintKind::Primary | ConstraintKind::Unique)
    }

    pub(crate) fn validate(&self, table: QualifiedName, simple: bool) -> Result {
        let fail = |reason: String| Err(DboToolsError::invalid(DboKind::Table, &table.to_string(), reason));

        if is_blank(&self.name) {
            return fail("constraint without a name".to_string());
        }

        // In simple mode the definition is only needed once the constraint gets added.
        if simple {
            return Ok(());
        }

        match &self.kind {
            ConstraintKind::Check { condition } => {
                if condition.as_deref().map_or(true, is_blank) {
                    return fail(format!("check constraint '{}' has no condition", self.name));
                }
            }
            ConstraintKind::Primary | ConstraintKind::Unique => {
                if self.columns.is_empty() {
                    return fail(format!("constraint '{}' has no columns", self.name));
                }
            }
            ConstraintKind::Foreign(reference) => {
                if self.columns.is_empty() || reference.referenced_columns.is_empty() {
                    return fail(format!("foreign key '{}' has no columns", self.name));
                }
                if is_blank(&reference.referenced_table) {
                    return fail(format!("foreign key '{}' does not reference a table", self.name));
                }
            }
            ConstraintKind::Exclude(exclusion) => {
                if exclusion.elements.is_empty() {
                    return fail(format!("exclusion constraint '{}' has no elements", self.name));
                }
            }
        }

        Ok(())
    }

    /// Equality where the check condition is not considered, since in simple mode the
    /// definition already carries it.
    pub(crate) fn eq_ignoring_condition(&self, other: &ConstraintDescriptor) -> bool {
        match (&self.kind, &other.kind) {
            (ConstraintKind::Check { .. }, ConstraintKind::Check { .. }) => {
                self.name == other.name
                    && self.columns == other.columns
                    && self.deferrable == other.deferrable
                    && self.comment == other.comment
                    && self.definition == other.definition
            }
            _ => self == other,
        }
    }

    pub fn get_add_statements(&self, table: QualifiedName, simple: bool) -> Result<Vec<String>> {
        let expression = if simple {
            match &self.definition {
                Some(definition) if !is_blank(definition) => definition.clone(),
                _ => return Err(DboToolsError::invalid(DboKind::Table, &table.to_string(), format!("constraint '{}' has no definition", self.name))),
            }
        } else {
            constraint_expression(self, table)?
        };

        let mut statements = vec![format!("alter table {} add constraint {} {};", table, self.name, expression)];

        if let Some(comment) = &self.comment {
            statements.push(format!("comment on constraint {} on {} is {};", self.name, table, comment_value(Some(comment))));
        }

        Ok(statements)
    }

    pub fn get_drop_statement(&self, table: QualifiedName) -> String {
        format!("alter table {} drop constraint if exists {};", table, self.name)
    }

    /// Drops are issued against the old table, additions against the new one.
    pub fn get_update_statements(&self, old: &ConstraintDescriptor, table: QualifiedName, old_table: QualifiedName, simple: bool) -> Result<ConstraintUpdate> {
        if self.kind == ConstraintKind::Primary && old.kind == ConstraintKind::Primary && self.name != old.name {
            return Ok(ConstraintUpdate::Rename(format!("alter table {} rename constraint {} to {};", table, old.name, self.name)));
        }

        Ok(ConstraintUpdate::Replace {
            drop: old.get_drop_statement(old_table),
            add: self.get_add_statements(table, simple)?,
        })
    }
}
