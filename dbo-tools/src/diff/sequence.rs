use tracing::{instrument, trace};
use crate::diff::{Bucket, DiffResult};
use crate::models::SequenceDescriptor;
use crate::Result;

/// Diffs a sequence against its old version. Sequences are always altered in place.
#[instrument(skip_all, fields(sequence = %new.qualified_name()))]
pub fn diff_sequence(new: &SequenceDescriptor, old: Option<&SequenceDescriptor>) -> Result<DiffResult> {
    new.validate()?;

    let mut result = DiffResult::default();

    let Some(old) = old else {
        trace!("sequence does not exist yet");
        result.push(Bucket::Main, new.get_create_statement());
        return Ok(result);
    };

    old.validate()?;

    if old.schema != new.schema {
        result.push(Bucket::Main, new.get_set_schema_statement(old));
    }
    if old.name != new.name {
        result.push(Bucket::Main, new.get_rename_statement(old));
    }
    result.extend(Bucket::Main, new.get_alter_statement(old));

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice_numbers() -> SequenceDescriptor {
        SequenceDescriptor {
            schema: "billing".to_string(),
            name: "invoice_numbers".to_string(),
            increment: 1,
            min_value: 1,
            max_value: 999999,
            start_value: 1000,
            cycle: false,
            cache_size: 1,
        }
    }

    #[test]
    fn create_from_absent() {
        let result = diff_sequence(&invoice_numbers(), None).unwrap();

        assert_eq!(result.main, vec!["create sequence if not exists billing.invoice_numbers increment 1 minvalue 1 maxvalue 999999 start 1000 cache 1;"]);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn unchanged_sequence_produces_nothing() {
        assert!(diff_sequence(&invoice_numbers(), Some(&invoice_numbers())).unwrap().is_empty());
    }

    #[test]
    fn attribute_changes_share_one_statement() {
        let new = SequenceDescriptor {
            max_value: 9999999,
            increment: 10,
            cycle: true,
            ..invoice_numbers()
        };

        let result = diff_sequence(&new, Some(&invoice_numbers())).unwrap();

        assert_eq!(result.main, vec!["alter sequence if exists billing.invoice_numbers maxvalue 9999999 increment 10 cycle;"]);
    }

    #[test]
    fn moved_and_renamed_sequence() {
        let new = SequenceDescriptor {
            schema: "accounting".to_string(),
            name: "invoice_ids".to_string(),
            start_value: 1,
            ..invoice_numbers()
        };

        let result = diff_sequence(&new, Some(&invoice_numbers())).unwrap();

        assert_eq!(result.to_script().split("\r\n").collect::<Vec<_>>(), vec![
            "alter sequence if exists billing.invoice_numbers set schema accounting;",
            "alter sequence if exists accounting.invoice_numbers rename to invoice_ids;",
            "alter sequence if exists accounting.invoice_ids start 1;",
        ]);
        assert!(result.safedrop.is_empty());
    }
}
