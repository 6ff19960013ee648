mod function;
mod options;
mod sequence;
mod table;
mod trigger;
mod view;

use std::collections::HashSet;
use serde::Serialize;

pub use function::diff_function;
pub use options::*;
pub use sequence::diff_sequence;
pub use table::diff_table;
pub use trigger::diff_trigger;
pub use view::diff_view;

/// Separates statements in a rendered script.
pub const STATEMENT_SEPARATOR: &str = "\r\n";

/// The groups a diff sorts its statements into. A script always runs the buckets in the
/// order they are declared here.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Drops that lose no data, like constraints, indices and objects about to be recreated.
    SafeDrop,
    /// Drops that lose data, like columns.
    UnsafeDrop,
    Main,
    /// Primary and unique keys, which foreign keys may depend on.
    PKey,
    /// Foreign keys, other constraints, not null enforcement and comments.
    End,
}

impl Bucket {
    pub const ALL: [Bucket; 5] = [Bucket::SafeDrop, Bucket::UnsafeDrop, Bucket::Main, Bucket::PKey, Bucket::End];

    pub fn name(&self) -> &'static str {
        match self {
            Bucket::SafeDrop => "safedrop",
            Bucket::UnsafeDrop => "unsafedrop",
            Bucket::Main => "main",
            Bucket::PKey => "pkey",
            Bucket::End => "end",
        }
    }
}

/// The statements needed to bring one object from its old state to its new one.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize)]
pub struct DiffResult {
    pub safedrop: Vec<String>,
    pub unsafedrop: Vec<String>,
    pub main: Vec<String>,
    pub pkey: Vec<String>,
    pub end: Vec<String>,
    /// Columns whose data type changed. Not part of the script, but views selecting from
    /// them might need to be recreated.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub retyped_columns: Vec<String>,
}

impl DiffResult {
    pub fn push(&mut self, bucket: Bucket, statement: impl Into<String>) {
        let statement = statement.into();
        if statement.is_empty() {
            return;
        }

        self.bucket_mut(bucket).push(statement);
    }

    pub fn extend(&mut self, bucket: Bucket, statements: impl IntoIterator<Item = String>) {
        for statement in statements {
            self.push(bucket, statement);
        }
    }

    pub fn bucket(&self, bucket: Bucket) -> &[String] {
        match bucket {
            Bucket::SafeDrop => &self.safedrop,
            Bucket::UnsafeDrop => &self.unsafedrop,
            Bucket::Main => &self.main,
            Bucket::PKey => &self.pkey,
            Bucket::End => &self.end,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<String> {
        match bucket {
            Bucket::SafeDrop => &mut self.safedrop,
            Bucket::UnsafeDrop => &mut self.unsafedrop,
            Bucket::Main => &mut self.main,
            Bucket::PKey => &mut self.pkey,
            Bucket::End => &mut self.end,
        }
    }

    pub fn is_empty(&self) -> bool {
        Bucket::ALL.iter().all(|b| self.bucket(*b).is_empty())
    }

    pub fn len(&self) -> usize {
        Bucket::ALL.iter().map(|b| self.bucket(*b).len()).sum()
    }

    /// All statements in execution order.
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        Bucket::ALL.into_iter().flat_map(move |b| self.bucket(b).iter().map(|s| s.as_str()))
    }

    pub fn to_script(&self) -> String {
        diff_to_script(self)
    }
}

/// Joins the statements of all buckets into one script, one statement per line.
pub fn diff_to_script(result: &DiffResult) -> String {
    let mut script = String::new();

    for (idx, statement) in result.statements().enumerate() {
        if idx > 0 {
            script.push_str(STATEMENT_SEPARATOR);
        }
        script.push_str(statement);
    }

    script
}

/// Sub-entities of the new and the old version of an object, matched up by name.
pub(crate) struct NamePartition<'a, T> {
    /// Only in the new version, in its order.
    pub added: Vec<&'a T>,
    /// Only in the old version, in its order.
    pub removed: Vec<&'a T>,
    /// In both versions, as `(new, old)`.
    pub common: Vec<(&'a T, &'a T)>,
}

impl<'a, T> NamePartition<'a, T> {
    pub fn new(new: &'a [T], old: &'a [T], name: impl Fn(&T) -> &str) -> Self {
        let new_names: HashSet<&str> = new.iter().map(&name).collect();

        let mut added = Vec::new();
        let mut common = Vec::new();

        for item in new {
            match old.iter().find(|o| name(*o) == name(item)) {
                Some(old_item) => common.push((item, old_item)),
                None => added.push(item),
            }
        }

        let removed = old.iter().filter(|o| !new_names.contains(name(*o))).collect();

        NamePartition {
            added,
            removed,
            common,
        }
    }
}
