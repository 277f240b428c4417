pub mod client;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod export;
pub mod format;
pub mod logging;
pub mod models;
pub mod navigator;
pub mod render;
pub mod sanitize;
pub mod tui;
