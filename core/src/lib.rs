//! TrustDraw: a trust-minimized card dealing protocol for mutually
//! suspicious players.
//!
//! A dealer shuffles a deck, encrypts each card under a key that is XOR-split
//! into one share per player, wraps every player's shares in an RSA/AES
//! envelope addressed to them, and signs the whole file with an Ed25519 key.
//! No single party — dealer included, once the file is published — can
//! determine a card's identity alone: reconstructing a card's key requires
//! every player's share, which only they control.
//!
//! ```text
//! deal()        -- dealer: shuffle + encrypt + wrap + sign
//! verify_deal()  -- anyone: check the dealer's signature
//! Game::open()   -- a player: find their own envelope, decrypt their shares
//! Game::allow_draw() -- release a share to the intended drawer
//! Game::draw()       -- combine shares, decrypt one card
//! Game::verify_draw() -- audit a claimed draw without mutating state
//! ```

#![forbid(unsafe_code)]

mod allow_key;
mod consts;
mod deal;
mod error;
mod game;
mod parse;
mod primitives;
mod stanza;
mod state;

pub use allow_key::{from_allow_key, to_allow_key};
pub use consts::{AES_BLOCK, CARD_LENGTH, MAX_CARDS, MAX_PLAYERS, RSA_MIN_BITS, VERSION};
pub use deal::deal;
pub use error::{Error, Result};
pub use game::Game;
pub use parse::{parse, verify_deal, ParsedDeal};
pub use state::{encode_state, load_state};

pub use ed25519_dalek::{SigningKey, VerifyingKey};
pub use rsa::{RsaPrivateKey, RsaPublicKey};
