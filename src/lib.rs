pub mod app;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod inference;
pub mod logging;
pub mod pipeline;
pub mod sanitizer;
pub mod writer;
