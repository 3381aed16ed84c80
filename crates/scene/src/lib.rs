//! Scene ownership and the per-frame driver.
//!
//! [`SceneController`] is the only writer of [`SceneState`]; the
//! [`RenderLoop`] reads it once per tick and issues a single draw.

pub mod controller;
pub mod controls;
pub mod render_loop;
pub mod state;

pub use controller::*;
pub use controls::*;
pub use render_loop::*;
pub use state::*;
