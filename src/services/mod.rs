pub mod catalog;
pub mod client;
pub mod query;
pub mod sort;
