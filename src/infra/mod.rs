pub mod commands;
pub mod config;
pub mod console;
pub mod main_program;
pub mod tokio_scheduler;
