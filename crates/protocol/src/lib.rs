//! Shared wire types for lightdeck
//!
//! Defines the REST payloads and the event-channel frames exchanged between
//! the browser UI and the host.

pub mod events;
pub mod frame;
pub mod lights;

pub use events::*;
pub use frame::*;
pub use lights::*;
