//! Session token stored alongside each archive

use rand::Rng;

/// Random bytes behind a token
pub const TOKEN_BYTES: usize = 32;

/// Fresh token of the form `0.<64 lowercase hex>` from the thread-local CSPRNG
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    format!("0.{}", hex::encode(bytes))
}
