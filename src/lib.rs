pub mod cli;
pub mod components;
pub mod config;
pub mod logging;
pub mod motion;
pub mod profile;
