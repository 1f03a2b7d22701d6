//! HTTP handlers for resource CRUD and config echo.

pub mod config;
pub mod resource;
