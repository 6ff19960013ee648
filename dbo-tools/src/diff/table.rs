use tracing::{debug, instrument, trace};
use crate::diff::{Bucket, DiffOptions, DiffResult, NamePartition};
use crate::models::{ConstraintDescriptor, ConstraintKind, ConstraintUpdate, QualifiedName, TableDescriptor};
use crate::Result;

/// Diffs a table against its old version. A table that does not exist yet is diffed
/// against an empty table of the same name, so everything it has gets added.
#[instrument(skip_all, fields(table = %new.qualified_name()))]
pub fn diff_table(new: &TableDescriptor, old: Option<&TableDescriptor>, options: &DiffOptions) -> Result<DiffResult> {
    new.validate(options.simple)?;
    if let Some(old) = old {
        old.validate(options.simple)?;
    }

    let mut result = DiffResult::default();

    let empty;
    let old = match old {
        Some(old) => {
            if old.name != new.name {
                result.push(Bucket::Main, new.get_rename_statement(old));
            }
            if old.comment != new.comment {
                result.push(Bucket::Main, new.get_comment_statement());
            }
            old
        }
        None => {
            trace!("table does not exist yet");
            result.extend(Bucket::Main, new.get_create_statements());
            empty = TableDescriptor::new(&new.schema, &new.name);
            &empty
        }
    };

    let table = new.qualified_name();
    let old_table = old.qualified_name();

    diff_columns(new, old, table, old_table, &mut result);
    diff_constraints(new, old, table, old_table, options, &mut result)?;
    diff_indices(new, old, table, old_table, options, &mut result)?;

    debug!(
        safedrop = result.safedrop.len(),
        unsafedrop = result.unsafedrop.len(),
        main = result.main.len(),
        pkey = result.pkey.len(),
        end = result.end.len(),
        "diffed table"
    );

    Ok(result)
}

fn diff_columns(new: &TableDescriptor, old: &TableDescriptor, table: QualifiedName, old_table: QualifiedName, result: &mut DiffResult) {
    let columns = NamePartition::new(&new.columns, &old.columns, |c| c.name.as_str());

    for column in columns.added {
        trace!(column = %column.name, "column added");
        let script = column.get_add_statements(table);
        result.push(Bucket::Main, script.add);
        result.extend(Bucket::End, script.set_not_null);
        result.extend(Bucket::End, script.comment);
    }

    for column in columns.removed {
        trace!(column = %column.name, "column removed");
        result.push(Bucket::UnsafeDrop, column.get_drop_statement(old_table));
    }

    for (new_column, old_column) in columns.common {
        if new_column == old_column {
            continue;
        }

        trace!(column = %new_column.name, "column changed");
        let script = new_column.get_update_statements(old_column, table);

        if script.data_type.is_some() {
            result.retyped_columns.push(new_column.name.clone());
        }

        result.extend(Bucket::Main, [script.rename, script.data_type, script.default_value, script.identity, script.drop_not_null].into_iter().flatten());
        result.extend(Bucket::End, [script.set_not_null, script.comment].into_iter().flatten());
    }
}

fn diff_constraints(new: &TableDescriptor, old: &TableDescriptor, table: QualifiedName, old_table: QualifiedName, options: &DiffOptions, result: &mut DiffResult) -> Result {
    let mut constraints = NamePartition::new(&new.constraints, &old.constraints, |c| c.name.as_str());

    if let Some((new_key, old_key)) = take_renamed_primary_key(&mut constraints.added, &mut constraints.removed) {
        trace!(from = %old_key.name, to = %new_key.name, "primary key renamed");
        push_constraint_update(new_key.get_update_statements(old_key, table, old_table, options.simple)?, new_key, result);
    }

    for constraint in constraints.added {
        trace!(constraint = %constraint.name, "constraint added");
        result.extend(constraint_bucket(constraint), constraint.get_add_statements(table, options.simple)?);
    }

    for constraint in constraints.removed {
        if options.keeps_removed(&constraint.name, &old.name) {
            debug!(constraint = %constraint.name, "keeping removed constraint");
            continue;
        }

        trace!(constraint = %constraint.name, "constraint removed");
        result.push(Bucket::SafeDrop, constraint.get_drop_statement(old_table));
    }

    for (new_constraint, old_constraint) in constraints.common {
        let changed = if options.simple {
            !new_constraint.eq_ignoring_condition(old_constraint)
        } else {
            new_constraint != old_constraint
        };

        if changed {
            trace!(constraint = %new_constraint.name, "constraint changed");
            push_constraint_update(new_constraint.get_update_statements(old_constraint, table, old_table, options.simple)?, new_constraint, result);
        }
    }

    Ok(())
}

/// Name matching sees a renamed primary key as one key removed and another added. When the
/// two are the same apart from the name, they are taken out of the partition and paired up.
fn take_renamed_primary_key<'a>(added: &mut Vec<&'a ConstraintDescriptor>, removed: &mut Vec<&'a ConstraintDescriptor>) -> Option<(&'a ConstraintDescriptor, &'a ConstraintDescriptor)> {
    let new_idx = added.iter().position(|c| c.kind == ConstraintKind::Primary)?;
    let old_idx = removed.iter().position(|c| c.kind == ConstraintKind::Primary)?;

    let (new_key, old_key) = (added[new_idx], removed[old_idx]);

    let renamed_old = ConstraintDescriptor {
        name: new_key.name.clone(),
        ..old_key.clone()
    };
    if renamed_old != *new_key {
        return None;
    }

    added.remove(new_idx);
    removed.remove(old_idx);

    Some((new_key, old_key))
}

fn push_constraint_update(update: ConstraintUpdate, constraint: &ConstraintDescriptor, result: &mut DiffResult) {
    match update {
        ConstraintUpdate::Rename(rename) => result.push(Bucket::PKey, rename),
        ConstraintUpdate::Replace { drop, add } => {
            result.push(Bucket::SafeDrop, drop);
            result.extend(constraint_bucket(constraint), add);
        }
    }
}

fn constraint_bucket(constraint: &ConstraintDescriptor) -> Bucket {
    if constraint.is_key() {
        Bucket::PKey
    } else {
        Bucket::End
    }
}

fn diff_indices(new: &TableDescriptor, old: &TableDescriptor, table: QualifiedName, old_table: QualifiedName, options: &DiffOptions, result: &mut DiffResult) -> Result {
    let indices = NamePartition::new(&new.indices, &old.indices, |i| i.name.as_str());

    let index_bucket = |is_unique: bool| if is_unique { Bucket::PKey } else { Bucket::End };

    for index in indices.added {
        trace!(index = %index.name, "index added");
        result.push(index_bucket(index.is_unique), index.get_create_statement(table, options.simple)?);
    }

    for index in indices.removed {
        if options.keeps_removed(&index.name, &old.name) {
            debug!(index = %index.name, "keeping removed index");
            continue;
        }

        trace!(index = %index.name, "index removed");
        result.push(Bucket::SafeDrop, index.get_drop_statement(old_table.schema));
    }

    for (new_index, old_index) in indices.common {
        if new_index == old_index {
            continue;
        }

        trace!(index = %new_index.name, "index changed");
        let (drop, create) = new_index.get_update_statements(old_index, table, old_table, options.simple)?;
        result.push(Bucket::SafeDrop, drop);
        result.push(index_bucket(new_index.is_unique), create);
    }

    Ok(())
}
