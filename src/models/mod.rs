pub mod category;
#[cfg(feature = "server")]
pub mod config;
pub mod page;
pub mod user;
