pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infra;
pub mod logging;
pub mod ports;
