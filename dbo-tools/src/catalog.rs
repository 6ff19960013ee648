//! Turns raw `pg_proc` style catalog rows into descriptors.

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use crate::models::{ArgumentMode, FunctionArgument, FunctionDescriptor, FunctionReturn, Parallel, ReturnColumn, ReturnType, Volatility};
use crate::{DboToolsError, Result};

/// Decodes the single character codes postgres uses in its catalogs.
pub(crate) trait FromPgChar: Sized {
    fn from_pg_char(c: char) -> Result<Self>;
}

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct CatalogType {
    pub name: String,
    #[serde(default)]
    pub is_array: bool,
}

impl CatalogType {
    pub fn new(name: &str, is_array: bool) -> Self {
        CatalogType {
            name: name.to_string(),
            is_array,
        }
    }
}

/// A function as read from the catalog. The argument data comes as parallel arrays:
/// `argument_names` and `argument_modes` are absent when postgres stores none, and
/// `argument_defaults` is the comma separated text of the defaults of the trailing inputs.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct FunctionCatalogRow {
    pub schema: String,
    pub name: String,
    pub language: String,
    pub body: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub returns_set: bool,
    pub result_type: CatalogType,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub security_definer: bool,
    pub volatility: char,
    pub parallel: char,
    #[serde(default)]
    pub estimated_cost: f32,
    #[serde(default)]
    pub estimated_rows: f32,
    #[serde(default)]
    pub leak_proof: bool,
    #[serde(default)]
    pub argument_names: Option<Vec<String>>,
    #[serde(default)]
    pub argument_modes: Option<Vec<char>>,
    #[serde(default)]
    pub argument_defaults: Option<String>,
    #[serde(default)]
    pub argument_types: Vec<CatalogType>,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
enum CatalogArgumentMode {
    Argument(ArgumentMode),
    /// An output column of a `returns table (...)` function.
    TableColumn,
}

impl FromPgChar for CatalogArgumentMode {
    fn from_pg_char(c: char) -> Result<Self> {
        match c {
            'i' => Ok(CatalogArgumentMode::Argument(ArgumentMode::In)),
            'o' => Ok(CatalogArgumentMode::Argument(ArgumentMode::Out)),
            'b' => Ok(CatalogArgumentMode::Argument(ArgumentMode::InOut)),
            'v' => Ok(CatalogArgumentMode::Argument(ArgumentMode::Variadic)),
            't' => Ok(CatalogArgumentMode::TableColumn),
            _ => Err(DboToolsError::UnknownArgumentMode(c.to_string())),
        }
    }
}

impl TryFrom<FunctionCatalogRow> for FunctionDescriptor {
    type Error = DboToolsError;

    fn try_from(row: FunctionCatalogRow) -> Result<Self> {
        let function = format!("{}.{}", row.schema, row.name);
        let arg_count = row.argument_types.len();

        let check_len = |array: &'static str, actual: usize| {
            if actual == arg_count {
                Ok(())
            } else {
                Err(DboToolsError::CatalogArrayMismatch {
                    function: function.clone(),
                    array,
                    expected: arg_count,
                    actual,
                })
            }
        };

        if let Some(names) = &row.argument_names {
            check_len("argument_names", names.len())?;
        }

        let modes = match &row.argument_modes {
            Some(modes) => {
                check_len("argument_modes", modes.len())?;
                modes.iter().map(|c| CatalogArgumentMode::from_pg_char(*c)).collect::<Result<Vec<_>>>()?
            }
            None => vec![CatalogArgumentMode::Argument(ArgumentMode::In); arg_count],
        };

        let mut arguments = Vec::with_capacity(arg_count);
        let mut table_columns = Vec::new();

        for (idx, (argument_type, mode)) in row.argument_types.into_iter().zip(modes).enumerate() {
            let name = row.argument_names.as_ref().map(|names| names[idx].clone()).unwrap_or_default();

            match mode {
                CatalogArgumentMode::Argument(mode) => arguments.push(FunctionArgument {
                    name,
                    mode,
                    type_name: argument_type.name,
                    is_array: argument_type.is_array,
                    default_value: None,
                }),
                CatalogArgumentMode::TableColumn => table_columns.push(ReturnColumn {
                    name,
                    type_name: argument_type.name,
                    is_array: argument_type.is_array,
                }),
            }
        }

        let defaults = row.argument_defaults.as_deref().map(split_defaults).unwrap_or_default();
        assign_trailing_defaults(&mut arguments, defaults);

        let result_type = ReturnType {
            type_name: row.result_type.name,
            is_array: row.result_type.is_array,
        };

        let returns = if !table_columns.is_empty() {
            FunctionReturn::Table { columns: table_columns }
        } else if row.returns_set {
            FunctionReturn::Set(result_type)
        } else if result_type.type_name == "void" {
            FunctionReturn::Void
        } else if result_type.type_name == "trigger" {
            FunctionReturn::Trigger
        } else {
            FunctionReturn::Single(result_type)
        };

        Ok(FunctionDescriptor {
            schema: row.schema,
            name: row.name,
            language: row.language,
            body: row.body.into(),
            description: row.description,
            arguments,
            returns,
            strict: row.strict,
            security_definer: row.security_definer,
            volatility: Volatility::from_pg_char(row.volatility)?,
            parallel: Parallel::from_pg_char(row.parallel)?,
            estimated_cost: NotNan::new(row.estimated_cost).unwrap_or_default(),
            estimated_rows: NotNan::new(row.estimated_rows).unwrap_or_default(),
            leak_proof: row.leak_proof,
        })
    }
}

/// Defaults belong to the last input arguments, so the input at position `i` takes default
/// `i - (inputs - defaults)`, and none when that is negative.
fn assign_trailing_defaults(arguments: &mut [FunctionArgument], defaults: Vec<String>) {
    let input_count = arguments.iter().filter(|a| a.mode.is_input()).count();
    let without_default = input_count as isize - defaults.len() as isize;

    for (idx, argument) in arguments.iter_mut().filter(|a| a.mode.is_input()).enumerate() {
        let offset = idx as isize - without_default;
        argument.default_value = usize::try_from(offset).ok().and_then(|o| defaults.get(o).cloned());
    }
}

/// Splits the catalog's default text on the commas that separate expressions, leaving commas
/// inside parentheses, brackets and quoted literals alone.
fn split_defaults(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in raw.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                '(' | '[' => {
                    depth += 1;
                    current.push(c);
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                ',' if depth == 0 => {
                    parts.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }

    if !parts.is_empty() || !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default;

    fn row(argument_types: Vec<CatalogType>) -> FunctionCatalogRow {
        FunctionCatalogRow {
            schema: "public".to_string(),
            name: "f".to_string(),
            language: "sql".to_string(),
            body: "select 1".to_string(),
            result_type: CatalogType::new("int4", false),
            volatility: 'v',
            parallel: 'u',
            estimated_cost: 100.0,
            argument_types,
            ..default()
        }
    }

    fn int_args(count: usize) -> Vec<CatalogType> {
        (0..count).map(|_| CatalogType::new("int4", false)).collect()
    }

    fn defaults_of(function: &FunctionDescriptor) -> Vec<Option<&str>> {
        function.arguments.iter().map(|a| a.default_value.as_deref()).collect()
    }

    #[test]
    fn fractional_planner_estimates_are_read() {
        let parsed: FunctionCatalogRow = serde_json::from_str(r#"{
            "schema": "public", "name": "f", "language": "sql", "body": "select 1",
            "result_type": { "name": "int4" }, "volatility": "v", "parallel": "u",
            "estimated_cost": 0.25, "estimated_rows": 12.5,
            "argument_types": [{ "name": "int4" }, { "name": "int4" }]
        }"#).unwrap();

        let expected = FunctionCatalogRow {
            estimated_cost: 0.25,
            estimated_rows: 12.5,
            ..row(int_args(2))
        };
        assert_eq!(parsed, expected);

        let function = FunctionDescriptor::try_from(parsed).unwrap();
        assert_eq!(function.estimated_cost.into_inner(), 0.25);
        assert_eq!(function.estimated_rows.into_inner(), 12.5);
    }

    #[test]
    fn defaults_align_to_trailing_arguments() {
        let row = FunctionCatalogRow {
            argument_names: Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]),
            argument_defaults: Some("1,2".to_string()),
            ..row(int_args(3))
        };

        let function = FunctionDescriptor::try_from(row).unwrap();

        assert_eq!(defaults_of(&function), vec![None, Some("1"), Some("2")]);
        assert!(function.arguments.iter().all(|a| a.mode == ArgumentMode::In));
        assert_eq!(function.arguments.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn defaults_containing_commas_stay_whole() {
        let row = FunctionCatalogRow {
            argument_names: Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]),
            argument_defaults: Some("'x, y'::text, coalesce(null, 2)".to_string()),
            ..row(int_args(3))
        };

        let function = FunctionDescriptor::try_from(row).unwrap();

        assert_eq!(defaults_of(&function), vec![None, Some("'x, y'::text"), Some("coalesce(null, 2)")]);
    }

    #[test]
    fn output_arguments_take_no_defaults() {
        let row = FunctionCatalogRow {
            argument_names: Some(vec!["a".to_string(), "b".to_string(), "total".to_string()]),
            argument_modes: Some(vec!['i', 'i', 'o']),
            argument_defaults: Some("5".to_string()),
            ..row(int_args(3))
        };

        let function = FunctionDescriptor::try_from(row).unwrap();

        assert_eq!(defaults_of(&function), vec![None, Some("5"), None]);
        assert_eq!(function.arguments[2].mode, ArgumentMode::Out);
    }

    #[test]
    fn table_arguments_become_return_columns() {
        let row = FunctionCatalogRow {
            returns_set: true,
            result_type: CatalogType::new("record", false),
            argument_names: Some(vec!["since".to_string(), "id".to_string(), "tags".to_string()]),
            argument_modes: Some(vec!['i', 't', 't']),
            argument_types: vec![
                CatalogType::new("date", false),
                CatalogType::new("int8", false),
                CatalogType::new("text", true),
            ],
            ..row(vec![])
        };

        let function = FunctionDescriptor::try_from(row).unwrap();

        assert_eq!(function.arguments, vec![FunctionArgument::new("since", "date")]);
        assert_eq!(function.returns, FunctionReturn::Table {
            columns: vec![
                ReturnColumn { name: "id".to_string(), type_name: "int8".to_string(), is_array: false },
                ReturnColumn { name: "tags".to_string(), type_name: "text".to_string(), is_array: true },
            ],
        });
    }

    #[test]
    fn return_kinds() {
        let returns = |returns_set: bool, type_name: &str| {
            FunctionDescriptor::try_from(FunctionCatalogRow {
                returns_set,
                result_type: CatalogType::new(type_name, false),
                ..row(vec![])
            }).unwrap().returns
        };

        assert_eq!(returns(false, "int4"), FunctionReturn::Single(ReturnType { type_name: "int4".to_string(), is_array: false }));
        assert_eq!(returns(true, "int4"), FunctionReturn::Set(ReturnType { type_name: "int4".to_string(), is_array: false }));
        assert_eq!(returns(false, "void"), FunctionReturn::Void);
        assert_eq!(returns(false, "trigger"), FunctionReturn::Trigger);
    }

    #[test]
    fn catalog_codes_are_decoded() {
        let function = FunctionDescriptor::try_from(FunctionCatalogRow {
            volatility: 'i',
            parallel: 's',
            ..row(vec![])
        }).unwrap();

        assert_eq!(function.volatility, Volatility::Immutable);
        assert_eq!(function.parallel, Parallel::Safe);
        assert_eq!(function.estimated_cost.into_inner(), 100.0);

        let err = FunctionDescriptor::try_from(FunctionCatalogRow {
            argument_modes: Some(vec!['x']),
            ..row(int_args(1))
        }).unwrap_err();
        assert!(matches!(err, DboToolsError::UnknownArgumentMode(m) if m == "x"));
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let row = FunctionCatalogRow {
            argument_names: Some(vec!["a".to_string()]),
            ..row(int_args(2))
        };

        let err = FunctionDescriptor::try_from(row).unwrap_err();

        assert_eq!(err.to_string(), "Catalog row for function `public.f` has 1 entries in `argument_names`, expected 2");
    }

    #[test]
    fn splits_defaults() {
        assert_eq!(split_defaults(""), Vec::<String>::new());
        assert_eq!(split_defaults(" 1 , 2 "), vec!["1", "2"]);
        assert_eq!(split_defaults("'it''s, fine'::text, array[1,2]"), vec!["'it''s, fine'::text", "array[1,2]"]);
    }
}
