pub mod alert;
pub mod geo;

pub use alert::*;
pub use geo::*;
