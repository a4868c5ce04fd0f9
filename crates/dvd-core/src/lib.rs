pub mod config;
pub mod logging;

pub mod control;
pub mod downloader;
pub mod har;
pub mod orchestrator;
pub mod quality;
pub mod router;
pub mod session;
pub mod url_model;
