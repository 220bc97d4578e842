pub mod kafka;
pub mod memory;
pub mod models;
pub mod order_repo;
