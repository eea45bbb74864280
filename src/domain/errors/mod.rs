//! Domain error types.

mod meme_error;
mod store_error;

pub use meme_error::{MemeError, MemeResult};
pub use store_error::{StoreError, StoreResult};
