pub mod api;
pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod planner;
pub mod services;
pub mod state;
