//! Analysis service: axum host for the cost efficiency engine

pub mod api;
pub mod config;
