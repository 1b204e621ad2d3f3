//! Request authentication material: HMAC signing, replay nonces, CSRF tokens.

pub mod csrf;
pub mod nonce;
pub mod signer;

pub use csrf::*;
pub use nonce::*;
pub use signer::*;

pub(crate) mod base36;
