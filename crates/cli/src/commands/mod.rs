pub mod analyze;
pub mod catalog;
pub mod config;
pub mod forecast;
pub mod health;
pub mod summary;
