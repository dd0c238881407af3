//! Prompt templates and backend implementations

pub mod backend_impl;
pub mod prompts;
