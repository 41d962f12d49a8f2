#![forbid(unsafe_code)]

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod formats;
pub mod logging;
pub mod markup;
pub mod mraid;
pub mod simulator;
