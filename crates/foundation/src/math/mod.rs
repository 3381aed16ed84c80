pub mod geodesy;
pub mod pose;
pub mod vec;

pub use geodesy::*;
pub use pose::*;
pub use vec::*;
