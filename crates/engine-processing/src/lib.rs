pub mod dedup;
pub mod error;
pub mod onstart;
pub mod retry;
pub mod setup;
