pub mod assembly;
pub mod resolver;

pub use resolver::resolve_duplicates;
