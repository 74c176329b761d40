//! Controller layer: UI-facing state, intent dispatch and change notification.

pub mod controller;

pub use controller::{Controller, Outcome};
pub use shared::protocol::{Intent, RenderState};
