//! Console UI layer: text rendering of backend events.

pub mod render;
