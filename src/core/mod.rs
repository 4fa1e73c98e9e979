pub mod document;
pub mod key;
pub mod row;
