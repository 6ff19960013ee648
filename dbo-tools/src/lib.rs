mod catalog;
mod diff;
mod error;
mod expression;
mod helpers;
mod models;
mod provider;
mod sql_text;

pub use catalog::{CatalogType, FunctionCatalogRow};
pub use diff::*;
pub use error::*;
pub use expression::*;
pub use models::*;
pub use provider::*;
pub use sql_text::*;

pub(crate) fn default<T: Default>() -> T {
    T::default()
}
