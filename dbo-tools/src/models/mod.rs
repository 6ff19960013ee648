mod column;
mod constraint;
mod function;
mod index;
mod object;
mod qualified_name;
mod sequence;
mod table;
mod trigger;
mod view;

pub use column::*;
pub use constraint::*;
pub use function::*;
pub use index::*;
pub use object::*;
pub use qualified_name::*;
pub use sequence::*;
pub use table::*;
pub use trigger::*;
pub use view::*;
