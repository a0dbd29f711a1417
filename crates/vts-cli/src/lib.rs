//! CLI library components for variable token sync.

#![allow(missing_docs)]

pub mod logging;
pub mod pipeline;
pub mod settings;
