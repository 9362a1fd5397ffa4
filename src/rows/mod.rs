pub mod model;
pub mod record;

pub use model::*;
pub use record::*;
