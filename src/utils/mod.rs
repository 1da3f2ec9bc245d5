pub mod config;

pub use config::{RunConfig, VideoMode};
