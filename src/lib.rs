pub mod classifier;
pub mod config;
pub mod consts;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod params;
pub mod registry;
pub mod render;
pub mod task;
