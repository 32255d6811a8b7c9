pub mod category;
pub mod page;
pub mod types;
pub mod user;
pub mod visit;
