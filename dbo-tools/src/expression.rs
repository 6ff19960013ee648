//! Renders the expression fragments shared by the table script builders: the body of a
//! constraint after `add constraint <name>`, and the column list of an index.

use itertools::Itertools;
use crate::helpers::StringExt;
use crate::models::{ConstraintDescriptor, ConstraintKind, Deferrable, ForeignKeyAction, IndexColumn, IndexColumnDirection, IndexNullsOrder, QualifiedName};
use crate::{DboKind, DboToolsError, Result};

/// Builds the constraint expression from its structured fields, e.g.
/// `foreign key (customer_id) references shop.customers(id) on delete cascade`.
pub fn constraint_expression(constraint: &ConstraintDescriptor, table: QualifiedName) -> Result<String> {
    let columns = constraint.columns.iter().join(",");

    let mut expr = match &constraint.kind {
        ConstraintKind::Check { condition: Some(condition) } => format!("check ({})", condition),
        ConstraintKind::Check { condition: None } => {
            return Err(DboToolsError::invalid(DboKind::Table, &table.to_string(), format!("check constraint '{}' has no condition", constraint.name)));
        }
        ConstraintKind::Primary => format!("primary key ({})", columns),
        ConstraintKind::Unique => format!("unique ({})", columns),
        ConstraintKind::Foreign(reference) => {
            let mut expr = format!(
                "foreign key ({}) references {}.{}({})",
                columns,
                reference.referenced_schema,
                reference.referenced_table,
                reference.referenced_columns.iter().join(",")
            );

            if reference.on_update != ForeignKeyAction::NoAction {
                expr.push_str(" on update ");
                expr.push_str(reference.on_update.as_sql());
            }

            if reference.on_delete != ForeignKeyAction::NoAction {
                expr.push_str(" on delete ");
                expr.push_str(reference.on_delete.as_sql());
            }

            expr
        }
        ConstraintKind::Exclude(exclusion) => {
            let mut expr = format!("exclude using {} (", exclusion.method);
            expr.push_join(",", exclusion.elements.iter().map(|e| format!("{} with {}", e.column, e.operator)));
            expr.push(')');

            if let Some(predicate) = &exclusion.predicate {
                expr.push_str(" where (");
                expr.push_str(predicate);
                expr.push(')');
            }

            expr
        }
    };

    match constraint.deferrable {
        Deferrable::None => {}
        Deferrable::InitiallyImmediate => expr.push_str(" deferrable initially immediate"),
        Deferrable::InitiallyDeferred => expr.push_str(" deferrable initially deferred"),
    }

    Ok(expr)
}

/// Renders index columns as `name[ collate c][ asc|desc][ nulls first|last]`, comma separated.
pub fn index_columns_clause(columns: &[IndexColumn]) -> String {
    columns
        .iter()
        .map(|column| {
            let mut s = column.name.clone();

            if let Some(collation) = &column.collation {
                s.push_str(" collate ");
                s.push_str(collation);
            }

            match column.direction {
                Some(IndexColumnDirection::Ascending) => s.push_str(" asc"),
                Some(IndexColumnDirection::Descending) => s.push_str(" desc"),
                None => {}
            }

            match column.nulls_order {
                Some(IndexNullsOrder::First) => s.push_str(" nulls first"),
                Some(IndexNullsOrder::Last) => s.push_str(" nulls last"),
                None => {}
            }

            s
        })
        .join(",")
}
