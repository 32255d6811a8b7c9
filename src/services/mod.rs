pub use errors::{ServiceError, ServiceResult};

pub mod auth;
pub mod categories;
pub mod errors;
pub mod main;
pub mod pages;
pub mod visits;
