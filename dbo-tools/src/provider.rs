use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use crate::diff::{DiffOptions, DiffResult};
use crate::models::{DboKind, DboObject};
use crate::Result;

/// Identifies an object in a database. Triggers are only unique per table, so they also
/// carry the name of their table.
#[derive(Debug, Eq, PartialEq, Clone, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub table_name: Option<String>,
}

impl ObjectKey {
    pub fn new(schema: &str, name: &str) -> Self {
        ObjectKey {
            schema: schema.to_string(),
            name: name.to_string(),
            table_name: None,
        }
    }

    pub fn for_table(schema: &str, name: &str, table_name: &str) -> Self {
        ObjectKey {
            table_name: Some(table_name.to_string()),
            ..ObjectKey::new(schema, name)
        }
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.table_name {
            Some(table) => write!(f, "{} on {}.{}", self.name, self.schema, table),
            None => write!(f, "{}.{}", self.schema, self.name),
        }
    }
}

/// Looks up the current state of objects, typically in a live database.
pub trait MetadataProvider {
    /// Returns `None` when no such object exists, which is not an error.
    fn get(&self, kind: DboKind, key: &ObjectKey) -> impl std::future::Future<Output = Result<Option<DboObject>>> + Send;
}

/// Fetches the current version of the object from the provider and diffs against it.
#[instrument(skip_all, fields(kind = %new.kind(), key = %new.key()))]
pub async fn diff_with_provider<P: MetadataProvider>(provider: &P, new: &DboObject, options: &DiffOptions) -> Result<DiffResult> {
    let old = provider.get(new.kind(), &new.key()).await?;

    if old.is_none() {
        debug!("object does not exist yet");
    }

    new.diff(old.as_ref(), options)
}

/// A provider serving objects from a stored snapshot, such as a previously deployed schema.
#[derive(Debug, Default, Clone)]
pub struct SnapshotProvider {
    objects: HashMap<(DboKind, ObjectKey), DboObject>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Many(Vec<DboObject>),
    One(DboObject),
}

/// Reads either a single object or an array of objects.
pub fn objects_from_json(json: &str) -> Result<Vec<DboObject>> {
    Ok(match serde_json::from_str(json)? {
        Snapshot::Many(objects) => objects,
        Snapshot::One(object) => vec![object],
    })
}

impl SnapshotProvider {
    pub fn new(objects: impl IntoIterator<Item = DboObject>) -> Self {
        SnapshotProvider {
            objects: objects.into_iter().map(|o| ((o.kind(), o.key()), o)).collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(SnapshotProvider::new(objects_from_json(json)?))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl MetadataProvider for SnapshotProvider {
    async fn get(&self, kind: DboKind, key: &ObjectKey) -> Result<Option<DboObject>> {
        Ok(self.objects.get(&(kind, key.clone())).cloned())
    }
}
