pub mod executor;
pub mod naming;
pub mod schema_gen;

pub use executor::*;
pub use naming::*;
pub use schema_gen::*;
