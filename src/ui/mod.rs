//! Terminal-facing UI: the rendering contract and line input.
//!
//! The control loop depends on the [`render::RenderSink`] and
//! [`input::LineSource`] traits only, so tests can drive it without a
//! terminal.

pub mod input;
pub mod render;
