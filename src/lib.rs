pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod platform;
pub mod session;
pub mod spawner;
