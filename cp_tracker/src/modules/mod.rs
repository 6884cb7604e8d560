pub mod auth;
pub mod handlers;
pub mod migration;
pub mod repository;
pub mod state;
pub mod stats;
pub mod sync;
#[cfg(test)]
pub mod testing;
