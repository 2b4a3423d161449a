/// Minimum RSA modulus size accepted for a player's public key, in bits.
pub const RSA_MIN_BITS: usize = 1024;

/// Size of a single AES block, and of a padded card's plaintext/ciphertext.
pub const AES_BLOCK: usize = 16;

/// Card strings longer than this (in UTF-8 bytes) are rejected.
pub const CARD_LENGTH: usize = AES_BLOCK;

/// Largest deck size a deal file can describe (fits a 2-byte little-endian card id).
pub const MAX_CARDS: usize = 65_536;

/// Largest number of players a deal file can describe. Chosen so a player number
/// fits in a single base64 byte in the state vector, with 0 reserved for "undrawn".
pub const MAX_PLAYERS: usize = 191;

/// The `TrustDraw/vX.Y` header this crate reads and writes.
pub const VERSION: &str = "1.0";
