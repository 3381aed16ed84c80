pub mod source;
pub mod sync;

pub use source::*;
pub use sync::*;
