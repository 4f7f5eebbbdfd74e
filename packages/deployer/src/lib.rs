pub mod config;
pub mod deploy;
pub mod pause;
pub mod verify;
