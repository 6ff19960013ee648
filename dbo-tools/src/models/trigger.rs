use itertools::Itertools;
use serde::{Deserialize, Serialize};
use crate::helpers::{comment_value, is_blank};
use crate::models::QualifiedName;
use crate::{DboKind, DboToolsError, Result};

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct TriggerDescriptor {
    pub name: String,
    pub schema: String,
    pub table_name: String,
    pub timing: TriggerTiming,
    pub events: TriggerEvents,
    #[serde(default)]
    pub level: TriggerLevel,
    #[serde(default)]
    pub constraint: ConstraintTriggerMode,
    #[serde(default)]
    pub condition: Option<String>,
    pub function_schema: String,
    pub function_name: String,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerTiming {
    #[default]
    Before,
    After,
    InsteadOf,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
pub struct TriggerEvents {
    #[serde(default)]
    pub insert: bool,
    #[serde(default)]
    pub update: bool,
    #[serde(default)]
    pub delete: bool,
    #[serde(default)]
    pub truncate: bool,
}

impl TriggerEvents {
    fn is_empty(&self) -> bool {
        !(self.insert || self.update || self.delete || self.truncate)
    }

    /// The set events joined by `or`, always in insert, update, delete, truncate order.
    fn to_sql(self) -> String {
        [
            (self.insert, "insert"),
            (self.update, "update"),
            (self.delete, "delete"),
            (self.truncate, "truncate"),
        ]
            .into_iter()
            .filter(|(set, _)| *set)
            .map(|(_, event)| event)
            .join(" or ")
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerLevel {
    #[default]
    Row,
    Statement,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintTriggerMode {
    /// A regular trigger.
    #[default]
    None,
    NotDeferrable,
    DeferrableImmediate,
    DeferrableDeferred,
}

impl TriggerDescriptor {
    pub fn table(&self) -> QualifiedName<'_> {
        QualifiedName::new(&self.schema, &self.table_name)
    }

    pub fn validate(&self) -> Result {
        let fail = |reason: &str| Err(DboToolsError::invalid(DboKind::Trigger, &format!("{} on {}", self.name, self.table()), reason));

        if is_blank(&self.name) || is_blank(&self.schema) || is_blank(&self.table_name) {
            return fail("name, schema and table are required");
        }
        if is_blank(&self.function_schema) || is_blank(&self.function_name) {
            return fail("the trigger does not execute a function");
        }
        if self.events.is_empty() {
            return fail("the trigger does not fire on any event");
        }

        Ok(())
    }

    pub fn get_create_statement(&self) -> String {
        let mut sql = "create".to_string();

        if self.constraint != ConstraintTriggerMode::None {
            sql.push_str(" constraint");
        }

        sql.push_str(" trigger ");
        sql.push_str(&self.name);
        sql.push(' ');
        sql.push_str(match self.timing {
            TriggerTiming::Before => "before",
            TriggerTiming::After => "after",
            TriggerTiming::InsteadOf => "instead of",
        });
        sql.push(' ');
        sql.push_str(&self.events.to_sql());
        sql.push_str(" on ");
        sql.push_str(&self.table().to_string());

        match self.constraint {
            ConstraintTriggerMode::None | ConstraintTriggerMode::NotDeferrable => {}
            ConstraintTriggerMode::DeferrableImmediate => sql.push_str(" deferrable"),
            ConstraintTriggerMode::DeferrableDeferred => sql.push_str(" deferrable initially deferred"),
        }

        sql.push_str(" for each ");
        sql.push_str(match self.level {
            TriggerLevel::Row => "row",
            TriggerLevel::Statement => "statement",
        });

        if let Some(cond) = &self.condition {
            sql.push_str(" when (");
            sql.push_str(cond);
            sql.push(')');
        }

        sql.push_str(" execute procedure ");
        sql.push_str(&self.function_schema);
        sql.push('.');
        sql.push_str(&self.function_name);
        sql.push('(');
        sql.push_str(&self.arguments.join(","));
        sql.push_str(");");

        sql
    }

    pub fn get_comment_statement(&self) -> Option<String> {
        self.comment.as_ref().map(|c| format!("comment on trigger {} on {} is {};", self.name, self.table(), comment_value(Some(c))))
    }

    pub fn get_drop_statement(&self) -> String {
        format!("drop trigger if exists {} on {};", self.name, self.table())
    }
}
