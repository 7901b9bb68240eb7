pub mod catalog;
pub mod detail;

pub use catalog::*;
pub use detail::*;
