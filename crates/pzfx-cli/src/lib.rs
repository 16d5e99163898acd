//! CLI library components for the `pzfx` converter.

pub mod logging;
pub mod pipeline;
pub mod types;
