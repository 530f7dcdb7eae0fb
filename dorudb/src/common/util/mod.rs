mod document_utils;
mod name_utils;
mod value_utils;

pub use document_utils::*;
pub use name_utils::*;
pub use value_utils::*;
