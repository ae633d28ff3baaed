pub mod failure;
pub mod query;
pub mod ticket;
