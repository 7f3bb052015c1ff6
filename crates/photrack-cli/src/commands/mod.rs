pub mod config;
pub mod coords;
pub mod info;
pub mod pipeline;
