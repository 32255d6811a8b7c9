//! Core library exports for the Rango tutorial catalog.
//!
//! This crate exposes the domain types, Diesel models and repositories used to
//! store categories, pages and accounts, plus the forms, services and routes
//! of the Rango web application.

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;

#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

/// Number of categories and pages shown on the landing page.
pub const TOP_N: usize = 5;
