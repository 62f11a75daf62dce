pub mod batch;
pub mod config;
pub mod error;
pub mod linking;
pub mod merge;
pub mod model;
pub mod parsing;
pub mod program;
pub mod resolution;
pub mod session;
pub mod stats;
pub mod tagging;

pub use session::Analyzer;

#[cfg(test)]
mod tests;
