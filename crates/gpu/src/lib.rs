pub mod chart;
pub mod renderer;

pub use chart::*;
pub use renderer::*;
