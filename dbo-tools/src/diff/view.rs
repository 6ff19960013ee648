use tracing::instrument;
use crate::diff::{Bucket, DiffResult};
use crate::models::ViewDescriptor;
use crate::Result;

/// Recreates the view. An existing view is dropped first, as `create or replace` cannot
/// change its columns.
#[instrument(skip_all, fields(view = %new.qualified_name()))]
pub fn diff_view(new: &ViewDescriptor, old: Option<&ViewDescriptor>) -> Result<DiffResult> {
    new.validate()?;

    let mut result = DiffResult::default();

    if let Some(old) = old {
        old.validate()?;
        result.push(Bucket::SafeDrop, old.get_drop_statement());
    }

    result.push(Bucket::Main, new.get_create_view_sql());
    result.extend(Bucket::Main, new.get_comment_statement());

    Ok(result)
}
