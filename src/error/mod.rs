mod types;

pub use types::{GridnoteError, Result};
