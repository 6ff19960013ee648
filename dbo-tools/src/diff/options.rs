use std::fmt::{Debug, Formatter};

/// Called with the name of a constraint or index that is gone from the new table and the
/// name of the table it belonged to. Returning `true` keeps it in the database and returning
/// `false` drops it. Predicates written as "should this be dropped" must be negated.
pub type KeepRemovedPredicate = Box<dyn Fn(&str, &str) -> bool + Send + Sync>;

pub struct DiffOptions {
    /// Render added constraints and indices from their stored definitions rather than from
    /// their structured fields.
    pub simple: bool,
    /// Decides which removed constraints and indices should be left alone, for example the
    /// ones postgres created implicitly. Everything removed is dropped when not set.
    pub keep_removed: Option<KeepRemovedPredicate>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            simple: true,
            keep_removed: None,
        }
    }
}

impl Debug for DiffOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffOptions")
            .field("simple", &self.simple)
            .field("keep_removed", &self.keep_removed.is_some())
            .finish()
    }
}

impl DiffOptions {
    /// Options composing every constraint and index from its structured fields.
    pub fn full() -> Self {
        Self {
            simple: false,
            ..Self::default()
        }
    }

    pub fn with_keep_removed(mut self, keep: impl Fn(&str, &str) -> bool + Send + Sync + 'static) -> Self {
        self.keep_removed = Some(Box::new(keep));
        self
    }

    pub(crate) fn keeps_removed(&self, name: &str, table_name: &str) -> bool {
        self.keep_removed.as_ref().is_some_and(|keep| keep(name, table_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_simple_and_dropping_everything() {
        let options = DiffOptions::default();

        assert!(options.simple);
        assert!(!options.keeps_removed("people_pkey", "people"));
        assert!(!DiffOptions::full().simple);
    }

    #[test]
    fn keep_predicate_gets_name_and_table() {
        let options = DiffOptions::full().with_keep_removed(|name, table| table == "people" && name.ends_with("_key"));

        assert!(options.keeps_removed("people_email_key", "people"));
        assert!(!options.keeps_removed("people_email_key", "accounts"));
        assert!(!options.keeps_removed("people_idx", "people"));
        assert_eq!(format!("{:?}", options), "DiffOptions { simple: false, keep_removed: true }");
    }
}
