pub mod compute;
pub mod config;
pub mod display;
pub mod entities;
pub mod error;
pub mod indicator;
pub mod input;
pub mod round;
pub mod timing;
