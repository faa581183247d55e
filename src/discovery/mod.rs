//! Source discovery and output layout

pub mod layout;
pub mod scanner;

pub use scanner::{scan, SourceDirectory};
