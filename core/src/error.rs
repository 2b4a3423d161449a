use thiserror::Error;

/// Errors produced by the TrustDraw protocol engine.
///
/// Variants are grouped the way spec §7 groups them (input validation,
/// format, cryptographic, state, I/O) even though they all live in one
/// enum — callers match on kind, not on a taxonomy of nested error types.
#[derive(Debug, Error)]
pub enum Error {
    // -- input validation --
    #[error("card {card:?} is {len} bytes, longer than the {max}-byte limit")]
    CardTooLong { card: String, len: usize, max: usize },

    #[error("deck has {count} cards, more than the {max} limit")]
    TooManyCards { count: usize, max: usize },

    #[error("{count} players given; need between 2 and {max}")]
    PlayerCountOutOfRange { count: usize, max: usize },

    #[error("player {player} is not in this game (it has {players} players)")]
    PlayerNotInGame { player: u8, players: usize },

    #[error("player {index}'s key is {bits} bits, must be at least {min_bits}")]
    PlayerKeyTooSmall {
        index: usize,
        bits: usize,
        min_bits: usize,
    },

    // -- format --
    #[error("not a TrustDraw deal file (bad header {found:?})")]
    BadVersion { found: String },

    #[error("deal file has {found} stanzas, expected 4")]
    MalformedStanzas { found: usize },

    #[error("invalid base64 in deal file: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("deal file has no cards")]
    NoCards,

    #[error("card {index} decodes to {len} bytes, expected 16")]
    InvalidCiphertextLength { index: usize, len: usize },

    #[error("allow-key is malformed")]
    BadAllowKey,

    #[error("allow-keys do not all reference the same card")]
    InconsistentShares,

    #[error("wrong number of allow-keys ({expected} needed, {got} given)")]
    WrongShareCount { expected: usize, got: usize },

    // -- cryptographic --
    #[error("deal file signature does not verify against the dealer's key")]
    BadSignature,

    #[error("the deal file was not made for the given player key")]
    WrongPlayerKey,

    #[error("random number generator failed: {0}")]
    RandomnessFailure(String),

    #[error("cryptographic operation failed: {0}")]
    Crypto(String),

    // -- state --
    #[error("state byte {byte} names a player outside the game (max is {max_player})")]
    BadState { byte: u8, max_player: u8 },

    #[error("no cards left to draw")]
    NoCardsLeft,

    // -- I/O --
    #[error("could not read deal data: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("could not write deal data: {0}")]
    WriteFailed(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
