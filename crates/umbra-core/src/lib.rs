#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Umbra core: canonical types, the note descriptor, and Pedersen
//! commitment arithmetic over secp256k1.

pub mod constants;
pub mod note;
pub mod pedersen;
pub mod types;

pub use constants::*;
pub use note::*;
pub use pedersen::*;
pub use types::*;
