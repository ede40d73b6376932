//! Site Wizard — guided Q&A that turns a few answers into a generated website.

pub mod channels;
pub mod config;
pub mod error;
pub mod export;
pub mod llm;
pub mod wizard;
