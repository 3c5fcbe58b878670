//! Order submission, lifecycle, and refund services over pluggable
//! storage, payment, and identity collaborators.

pub mod config;
pub mod context;
pub mod gateway;
pub mod identity;
pub mod memory;
pub mod orders;
pub mod refunds;
pub mod store;

#[cfg(test)]
mod test;

mod uuids;
