mod definition;
mod errors;
pub mod special;
mod table;

pub use self::definition::{DefineKind, Definition};
pub use self::errors::DefineError;
pub use self::special::SpecialMacros;
pub use self::table::DefineTable;
