pub mod app;
pub mod bootstrap;
pub mod config;
pub mod routes;
pub mod services;
pub mod sheet;
pub mod state;
pub mod telemetry;
