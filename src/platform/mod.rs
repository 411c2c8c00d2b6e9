//! Platform abstraction layer
//!
//! Translates raw host events into game state changes. The host owns the
//! event sources (pointer, touch, focus) and calls in here synchronously.

pub mod input;

pub use input::{InputController, PointerAction};
