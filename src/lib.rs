pub mod assets;
pub mod config;
pub mod gate;
pub mod validation;
