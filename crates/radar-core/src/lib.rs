pub mod error;
pub mod fields;
pub mod types;

pub use error::*;
pub use fields::*;
pub use types::*;
