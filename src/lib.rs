pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod services;
pub mod workers;
