use std::fmt::{Display, Formatter};

/// A schema-qualified object name, rendered as `schema.name`.
///
/// Sub-entity builders take the owning table this way instead of carrying it on the
/// column, constraint or index itself.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct QualifiedName<'a> {
    pub schema: &'a str,
    pub name: &'a str,
}

impl<'a> QualifiedName<'a> {
    pub fn new(schema: &'a str, name: &'a str) -> Self {
        Self { schema, name }
    }
}

impl Display for QualifiedName<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}
