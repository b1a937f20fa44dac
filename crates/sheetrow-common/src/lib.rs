pub mod classify;
pub mod error;
pub mod slot;
pub mod value;

pub use classify::*;
pub use error::*;
pub use slot::*;
pub use value::*;
