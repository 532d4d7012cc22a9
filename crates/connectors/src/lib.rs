pub mod error;
pub mod file;
pub mod query;
pub mod table;
