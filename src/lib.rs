#![forbid(unsafe_code)]

pub mod commands;
pub mod config;
pub mod render;
pub mod runner;
