//! HTTP handlers: the generic model dispatcher and the panel pages.

pub mod model;
pub mod panel;
