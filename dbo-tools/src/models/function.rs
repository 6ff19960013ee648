use itertools::Itertools;
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use crate::catalog::FromPgChar;
use crate::helpers::{comment_value, is_blank};
use crate::models::QualifiedName;
use crate::sql_text::SqlText;
use crate::{DboKind, DboToolsError, Result};

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Immutable,
    Stable,
    #[default]
    Volatile,
}

impl Volatility {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Volatility::Immutable => "immutable",
            Volatility::Stable => "stable",
            Volatility::Volatile => "volatile",
        }
    }
}

impl FromPgChar for Volatility {
    fn from_pg_char(c: char) -> Result<Self> {
        match c {
            'i' => Ok(Volatility::Immutable),
            's' => Ok(Volatility::Stable),
            'v' => Ok(Volatility::Volatile),
            _ => Err(DboToolsError::UnknownVolatility(c.to_string()))
        }
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parallel {
    Safe,
    Restricted,
    #[default]
    Unsafe,
}

impl Parallel {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Parallel::Safe => "safe",
            Parallel::Restricted => "restricted",
            Parallel::Unsafe => "unsafe",
        }
    }
}

impl FromPgChar for Parallel {
    fn from_pg_char(c: char) -> Result<Self> {
        match c {
            's' => Ok(Parallel::Safe),
            'r' => Ok(Parallel::Restricted),
            'u' => Ok(Parallel::Unsafe),
            _ => Err(DboToolsError::UnknownParallel(c.to_string()))
        }
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentMode {
    #[default]
    In,
    Out,
    InOut,
    Variadic,
}

impl ArgumentMode {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ArgumentMode::In => "in",
            ArgumentMode::Out => "out",
            ArgumentMode::InOut => "inout",
            ArgumentMode::Variadic => "variadic",
        }
    }

    /// Whether the argument is passed by the caller, and so can carry a default.
    pub fn is_input(&self) -> bool {
        !matches!(self, ArgumentMode::Out)
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct FunctionArgument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mode: ArgumentMode,
    pub type_name: String,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl FunctionArgument {
    pub fn new(name: &str, type_name: &str) -> Self {
        FunctionArgument {
            name: name.to_string(),
            type_name: type_name.to_string(),
            ..crate::default()
        }
    }

    fn full_type(&self) -> String {
        array_type(&self.type_name, self.is_array)
    }

    /// `mode type`, as used to identify the function in drop and comment statements.
    fn signature_type(&self) -> String {
        format!("{} {}", self.mode.as_sql(), self.full_type())
    }

    fn is_same_definition(&self, other: &FunctionArgument) -> bool {
        self.name == other.name
            && self.type_name == other.type_name
            && self.is_array == other.is_array
            && self.mode == other.mode
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct ReturnType {
    pub type_name: String,
    #[serde(default)]
    pub is_array: bool,
}

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct ReturnColumn {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub is_array: bool,
}

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionReturn {
    Single(ReturnType),
    Set(ReturnType),
    #[default]
    Void,
    Table {
        columns: Vec<ReturnColumn>,
    },
    Trigger,
}

impl FunctionReturn {
    fn get_returns_clause(&self) -> String {
        match self {
            FunctionReturn::Single(t) => array_type(&t.type_name, t.is_array),
            FunctionReturn::Set(t) => format!("setof {}", array_type(&t.type_name, t.is_array)),
            FunctionReturn::Table { columns } => format!(
                "table ({})",
                columns.iter().map(|c| format!("{} {}", c.name, array_type(&c.type_name, c.is_array))).join(", ")
            ),
            FunctionReturn::Void => "void".to_string(),
            FunctionReturn::Trigger => "trigger".to_string(),
        }
    }
}

fn array_type(type_name: &str, is_array: bool) -> String {
    if is_array {
        format!("{}[]", type_name)
    } else {
        type_name.to_string()
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub schema: String,
    pub name: String,
    pub language: String,
    pub body: SqlText,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub arguments: Vec<FunctionArgument>,
    #[serde(default)]
    pub returns: FunctionReturn,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub security_definer: bool,
    #[serde(default)]
    pub volatility: Volatility,
    #[serde(default)]
    pub parallel: Parallel,
    #[serde(default)]
    pub estimated_cost: NotNan<f32>,
    #[serde(default)]
    pub estimated_rows: NotNan<f32>,
    #[serde(default)]
    pub leak_proof: bool,
}

impl FunctionDescriptor {
    pub fn qualified_name(&self) -> QualifiedName<'_> {
        QualifiedName::new(&self.schema, &self.name)
    }

    pub fn validate(&self) -> Result {
        let fail = |reason: &str| Err(DboToolsError::invalid(DboKind::Function, &self.qualified_name().to_string(), reason));

        if is_blank(&self.schema) || is_blank(&self.name) {
            return fail("schema and name are required");
        }
        if is_blank(&self.language) {
            return fail("language is required");
        }
        if self.arguments.iter().any(|a| is_blank(&a.type_name)) {
            return fail("every argument needs a type");
        }
        match &self.returns {
            FunctionReturn::Single(t) | FunctionReturn::Set(t) if is_blank(&t.type_name) => fail("return type is required"),
            FunctionReturn::Table { columns } if columns.is_empty() => fail("a function returning a table needs columns"),
            _ => Ok(()),
        }
    }

    /// Whether the two functions can be swapped by `create or replace`, which can change
    /// anything but the name, the return type and the arguments.
    pub fn has_same_signature(&self, other: &FunctionDescriptor) -> bool {
        self.schema == other.schema
            && self.name == other.name
            && self.returns == other.returns
            && self.arguments.len() == other.arguments.len()
            && self.arguments.iter().zip(&other.arguments).all(|(a, b)| a.is_same_definition(b))
    }

    /// The argument list identifying this function, e.g. `(in int4, in text[])`.
    fn get_signature(&self) -> String {
        format!("{}({})", self.qualified_name(), self.arguments.iter().map(|a| a.signature_type()).join(", "))
    }

    pub fn get_create_statement(&self) -> String {
        let mut sql = format!("create or replace function {}(", self.qualified_name());

        let arguments = self.arguments.iter().map(|a| {
            let mut s = a.mode.as_sql().to_string();
            if !is_blank(&a.name) {
                s.push(' ');
                s.push_str(&a.name);
            }
            s.push(' ');
            s.push_str(&a.full_type());
            if let Some(default_value) = &a.default_value {
                s.push_str(" = ");
                s.push_str(default_value);
            }
            s
        }).join(", ");

        sql.push_str(&arguments);
        sql.push_str(") returns ");
        sql.push_str(&self.returns.get_returns_clause());

        sql.push_str(" as $body$");
        sql.push_str(&self.body);
        sql.push_str("$body$ language ");
        sql.push_str(&self.language);

        sql.push_str(if self.security_definer { " security definer" } else { " security invoker" });
        sql.push_str(if self.strict { " returns null on null input" } else { " called on null input" });

        sql.push(' ');
        sql.push_str(self.volatility.as_sql());
        sql.push_str(" parallel ");
        sql.push_str(self.parallel.as_sql());

        if self.leak_proof {
            sql.push_str(" leakproof");
        }

        if self.estimated_cost.into_inner() > 0. {
            sql.push_str(" cost ");
            sql.push_str(&self.estimated_cost.to_string());
        }

        if self.estimated_rows.into_inner() > 0. {
            sql.push_str(" rows ");
            sql.push_str(&self.estimated_rows.to_string());
        }

        sql.push(';');

        sql
    }

    pub fn get_comment_statement(&self) -> Option<String> {
        self.description.as_ref().map(|d| format!("comment on function {} is {};", self.get_signature(), comment_value(Some(d))))
    }

    /// Drops the function by its argument types, names are not part of its identity.
    pub fn get_drop_statement(&self) -> String {
        format!("drop function if exists {};", self.get_signature())
    }
}
