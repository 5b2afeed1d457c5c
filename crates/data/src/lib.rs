//! Card dataset and deck configuration loading.

pub mod load;
pub mod schema;

pub use load::*;
pub use schema::*;
