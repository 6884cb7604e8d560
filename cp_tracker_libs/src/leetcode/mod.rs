pub mod client;
pub mod model;

pub use client::{LeetCodeApi, LeetCodeClient};
pub use model::LeetCodeStats;
