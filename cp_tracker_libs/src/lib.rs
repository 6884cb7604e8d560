pub mod api;
pub mod codeforces;
pub mod leetcode;
pub mod platform;

pub use platform::{FetchError, Platform};
