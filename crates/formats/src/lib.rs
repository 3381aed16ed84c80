pub mod documents;
pub mod records;

pub use documents::*;
pub use records::*;
