pub mod analysis;
pub mod chart;

pub use analysis::*;
pub use chart::*;
