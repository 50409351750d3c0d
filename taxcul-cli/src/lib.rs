pub mod app;
pub mod cli;
pub mod config;
pub mod forms;
pub mod logging;
pub mod output;
