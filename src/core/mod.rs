//! Core business logic, independent of the HTTP layer.
//!
//! Functions take a database connection and plain inputs and return
//! [`crate::errors::Result`]. Handlers in [`crate::api`] only authenticate,
//! call into here and shape the response.

pub mod analytics;
pub mod application;
pub mod connection;
pub mod dashboard;
pub mod forms;
pub mod goal;
pub mod notification;
pub mod scholarship;
pub mod seed;
pub mod session;
pub mod user;
