use tracing::{instrument, trace};
use crate::diff::{Bucket, DiffResult};
use crate::models::FunctionDescriptor;
use crate::Result;

/// Diffs a function against its old version. `create or replace` covers everything except a
/// changed signature, which needs the old function dropped first.
#[instrument(skip_all, fields(function = %new.qualified_name()))]
pub fn diff_function(new: &FunctionDescriptor, old: Option<&FunctionDescriptor>) -> Result<DiffResult> {
    new.validate()?;
    if let Some(old) = old {
        old.validate()?;
    }

    let mut result = DiffResult::default();

    if let Some(old) = old {
        if old == new {
            trace!("function is unchanged");
            return Ok(result);
        }

        if !new.has_same_signature(old) {
            trace!(old = %old.qualified_name(), "function signature changed");
            result.push(Bucket::SafeDrop, old.get_drop_statement());
        }
    }

    result.push(Bucket::Main, new.get_create_statement());
    result.extend(Bucket::Main, new.get_comment_statement());

    Ok(result)
}
