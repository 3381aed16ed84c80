pub mod arcs;
pub mod labels;
pub mod layer;
pub mod points;
pub mod symbology;
pub mod transform;

pub use arcs::*;
pub use labels::*;
pub use layer::*;
pub use points::*;
pub use symbology::*;
pub use transform::*;
