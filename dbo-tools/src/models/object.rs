use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::diff::{diff_function, diff_sequence, diff_table, diff_trigger, diff_view, DiffOptions, DiffResult};
use crate::models::{FunctionDescriptor, SequenceDescriptor, TableDescriptor, TriggerDescriptor, ViewDescriptor};
use crate::provider::ObjectKey;
use crate::{DboToolsError, Result};

#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DboKind {
    Table,
    View,
    Function,
    Sequence,
    Trigger,
}

impl Display for DboKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DboKind::Table => "table",
            DboKind::View => "view",
            DboKind::Function => "function",
            DboKind::Sequence => "sequence",
            DboKind::Trigger => "trigger",
        })
    }
}

/// Any of the database objects that can be diffed, tagged by `kind` when serialized.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DboObject {
    Table(TableDescriptor),
    View(ViewDescriptor),
    Function(FunctionDescriptor),
    Sequence(SequenceDescriptor),
    Trigger(TriggerDescriptor),
}

impl DboObject {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn kind(&self) -> DboKind {
        match self {
            DboObject::Table(_) => DboKind::Table,
            DboObject::View(_) => DboKind::View,
            DboObject::Function(_) => DboKind::Function,
            DboObject::Sequence(_) => DboKind::Sequence,
            DboObject::Trigger(_) => DboKind::Trigger,
        }
    }

    /// The key the object is looked up by in a live database.
    pub fn key(&self) -> ObjectKey {
        match self {
            DboObject::Table(t) => ObjectKey::new(&t.schema, &t.name),
            DboObject::View(v) => ObjectKey::new(&v.schema, &v.name),
            DboObject::Function(f) => ObjectKey::new(&f.schema, &f.name),
            DboObject::Sequence(s) => ObjectKey::new(&s.schema, &s.name),
            DboObject::Trigger(t) => ObjectKey::for_table(&t.schema, &t.name, &t.table_name),
        }
    }

    pub fn validate(&self, options: &DiffOptions) -> Result {
        match self {
            DboObject::Table(t) => t.validate(options.simple),
            DboObject::View(v) => v.validate(),
            DboObject::Function(f) => f.validate(),
            DboObject::Sequence(s) => s.validate(),
            DboObject::Trigger(t) => t.validate(),
        }
    }

    /// Diffs this object against its old version, or against nothing if it does not exist yet.
    pub fn diff(&self, old: Option<&DboObject>, options: &DiffOptions) -> Result<DiffResult> {
        if let Some(old) = old {
            if old.kind() != self.kind() {
                return Err(DboToolsError::ObjectKindMismatch {
                    expected: self.kind(),
                    actual: old.kind(),
                });
            }
        }

        match self {
            DboObject::Table(new) => diff_table(new, old.and_then(DboObject::as_table), options),
            DboObject::View(new) => diff_view(new, old.and_then(DboObject::as_view)),
            DboObject::Function(new) => diff_function(new, old.and_then(DboObject::as_function)),
            DboObject::Sequence(new) => diff_sequence(new, old.and_then(DboObject::as_sequence)),
            DboObject::Trigger(new) => diff_trigger(new, old.and_then(DboObject::as_trigger)),
        }
    }

    /// Renders the object from scratch. Tables are rendered in simple mode, so constraints and
    /// indices come from their stored definitions.
    pub fn create_script(&self) -> Result<String> {
        Ok(self.diff(None, &DiffOptions::default())?.to_script())
    }

    fn as_table(&self) -> Option<&TableDescriptor> {
        match self {
            DboObject::Table(t) => Some(t),
            _ => None,
        }
    }

    fn as_view(&self) -> Option<&ViewDescriptor> {
        match self {
            DboObject::View(v) => Some(v),
            _ => None,
        }
    }

    fn as_function(&self) -> Option<&FunctionDescriptor> {
        match self {
            DboObject::Function(f) => Some(f),
            _ => None,
        }
    }

    fn as_sequence(&self) -> Option<&SequenceDescriptor> {
        match self {
            DboObject::Sequence(s) => Some(s),
            _ => None,
        }
    }

    fn as_trigger(&self) -> Option<&TriggerDescriptor> {
        match self {
            DboObject::Trigger(t) => Some(t),
            _ => None,
        }
    }
}

impl From<TableDescriptor> for DboObject {
    fn from(value: TableDescriptor) -> Self {
        DboObject::Table(value)
    }
}

impl From<ViewDescriptor> for DboObject {
    fn from(value: ViewDescriptor) -> Self {
        DboObject::View(value)
    }
}

impl From<FunctionDescriptor> for DboObject {
    fn from(value: FunctionDescriptor) -> Self {
        DboObject::Function(value)
    }
}

impl From<SequenceDescriptor> for DboObject {
    fn from(value: SequenceDescriptor) -> Self {
        DboObject::Sequence(value)
    }
}

impl From<TriggerDescriptor> for DboObject {
    fn from(value: TriggerDescriptor) -> Self {
        DboObject::Trigger(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use crate::models::{ColumnDescriptor, ConstraintKind, TriggerEvents, TriggerTiming};
    use crate::{default, ConstraintDescriptor};

    #[test]
    fn loads_table_from_json() {
        let json = indoc! {r#"
            {
                "kind": "table",
                "schema": "public",
                "name": "people",
                "columns": [
                    { "name": "id", "data_type": "int4", "required": true, "identity": "always" },
                    { "name": "name", "data_type": "varchar", "data_type_length": "100" }
                ],
                "constraints": [
                    { "name": "people_pkey", "type": "primary", "columns": ["id"], "definition": "PRIMARY KEY (id)" }
                ]
            }
        "#};

        let object = DboObject::from_json(json).unwrap();

        let expected = TableDescriptor {
            columns: vec![
                ColumnDescriptor {
                    required: true,
                    identity: crate::ColumnIdentity::Always,
                    ..ColumnDescriptor::new("id", "int4")
                },
                ColumnDescriptor {
                    data_type_length: Some("100".to_string()),
                    ..ColumnDescriptor::new("name", "varchar")
                },
            ],
            constraints: vec![ConstraintDescriptor {
                definition: Some("PRIMARY KEY (id)".to_string()),
                ..ConstraintDescriptor::new("people_pkey", ConstraintKind::Primary, &["id"])
            }],
            ..TableDescriptor::new("public", "people")
        };

        similar_asserts::assert_eq!(object, DboObject::Table(expected));
        assert_eq!(object.kind(), DboKind::Table);
    }

    #[test]
    fn trigger_key_carries_table() {
        let trigger = DboObject::from(TriggerDescriptor {
            name: "audit".to_string(),
            schema: "public".to_string(),
            table_name: "accounts".to_string(),
            ..default()
        });

        assert_eq!(trigger.key(), ObjectKey::for_table("public", "audit", "accounts"));
    }

    #[test]
    fn diff_against_other_kind_fails() {
        let table = DboObject::from(TableDescriptor::new("public", "people"));
        let view = DboObject::from(ViewDescriptor {
            schema: "public".to_string(),
            name: "people".to_string(),
            definition: "select 1".into(),
            description: None,
        });

        let err = table.diff(Some(&view), &DiffOptions::default()).unwrap_err();

        assert!(matches!(err, DboToolsError::ObjectKindMismatch { expected: DboKind::Table, actual: DboKind::View }));
        assert_eq!(err.to_string(), "Cannot diff a view against a table");
    }

    #[test]
    fn create_script_of_trigger() {
        let trigger = DboObject::from(TriggerDescriptor {
            name: "audit".to_string(),
            schema: "public".to_string(),
            table_name: "accounts".to_string(),
            timing: TriggerTiming::Before,
            events: TriggerEvents {
                update: true,
                ..default()
            },
            function_schema: "public".to_string(),
            function_name: "touch".to_string(),
            comment: Some("Keeps updated_at current".to_string()),
            ..default()
        });

        assert_eq!(trigger.create_script().unwrap(), "create trigger audit before update on public.accounts for each row execute procedure public.touch();\r\ncomment on trigger audit on public.accounts is 'Keeps updated_at current';");
    }

    #[test]
    fn invalid_object_does_not_render() {
        let table = DboObject::from(TableDescriptor::new("", "people"));

        assert!(table.validate(&DiffOptions::default()).is_err());
        assert!(table.create_script().is_err());
    }
}
