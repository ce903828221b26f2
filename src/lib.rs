pub mod config;
pub mod decode;
pub mod error;
pub mod frames;
pub mod player;
pub mod sink;
