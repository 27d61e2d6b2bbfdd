pub mod models;
pub mod enums;
pub mod string_list;

pub use models::*;
pub use enums::*;
pub use string_list::StringList;
