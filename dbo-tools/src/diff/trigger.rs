use tracing::instrument;
use crate::diff::{Bucket, DiffResult};
use crate::models::TriggerDescriptor;
use crate::Result;

/// Triggers cannot be altered, so the old one is dropped and the new one created.
#[instrument(skip_all, fields(trigger = %new.name, table = %new.table()))]
pub fn diff_trigger(new: &TriggerDescriptor, old: Option<&TriggerDescriptor>) -> Result<DiffResult> {
    new.validate()?;

    let mut result = DiffResult::default();

    if let Some(old) = old {
        old.validate()?;
        result.push(Bucket::SafeDrop, old.get_drop_statement());
    }

    result.push(Bucket::Main, new.get_create_statement());
    result.extend(Bucket::Main, new.get_comment_statement());

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default;
    use crate::models::{TriggerEvents, TriggerLevel, TriggerTiming};

    fn touch_updated_at() -> TriggerDescriptor {
        TriggerDescriptor {
            name: "touch_updated_at".to_string(),
            schema: "public".to_string(),
            table_name: "documents".to_string(),
            timing: TriggerTiming::Before,
            events: TriggerEvents {
                update: true,
                ..default()
            },
            level: TriggerLevel::Row,
            function_schema: "public".to_string(),
            function_name: "set_updated_at".to_string(),
            ..default()
        }
    }

    #[test]
    fn create_from_absent() {
        let result = diff_trigger(&touch_updated_at(), None).unwrap();

        assert_eq!(result, DiffResult {
            main: vec!["create trigger touch_updated_at before update on public.documents for each row execute procedure public.set_updated_at();".to_string()],
            ..DiffResult::default()
        });
    }

    #[test]
    fn added_condition_recreates_trigger() {
        let new = TriggerDescriptor {
            condition: Some("old.* is distinct from new.*".to_string()),
            ..touch_updated_at()
        };

        let result = diff_trigger(&new, Some(&touch_updated_at())).unwrap();

        assert_eq!(result.safedrop, vec!["drop trigger if exists touch_updated_at on public.documents;"]);
        assert_eq!(result.main, vec![
            "create trigger touch_updated_at before update on public.documents for each row when (old.* is distinct from new.*) execute procedure public.set_updated_at();"
        ]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn unchanged_trigger_is_still_recreated() {
        let result = diff_trigger(&touch_updated_at(), Some(&touch_updated_at())).unwrap();

        assert_eq!(result.safedrop, vec![touch_updated_at().get_drop_statement()]);
        assert_eq!(result.main, vec![touch_updated_at().get_create_statement()]);
    }

    #[test]
    fn comment_follows_create() {
        let new = TriggerDescriptor {
            comment: Some("Maintains updated_at".to_string()),
            ..touch_updated_at()
        };

        let result = diff_trigger(&new, None).unwrap();

        assert_eq!(result.main[1], "comment on trigger touch_updated_at on public.documents is 'Maintains updated_at';");
    }

    #[test]
    fn trigger_moved_to_other_table_drops_from_old_table() {
        let new = TriggerDescriptor {
            table_name: "pages".to_string(),
            ..touch_updated_at()
        };

        let result = diff_trigger(&new, Some(&touch_updated_at())).unwrap();

        assert_eq!(result.safedrop, vec!["drop trigger if exists touch_updated_at on public.documents;"]);
        assert!(result.main[0].contains("on public.pages"));
    }
}
