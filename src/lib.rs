#![allow(clippy::uninlined_format_args)]

pub mod apod;
pub mod app;
pub mod config;
pub mod data;
pub mod facts;
pub mod fetch;
pub mod format;
pub mod gallery;
pub mod logging;
pub mod modal;
pub mod page;
pub mod ui;
pub mod video;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
