//! The 4-stanza `\n\n`-separated text framing shared by `deal`, `parse` and `game`.
//!
//! A deal file is exactly: header, blank line, card block, blank line,
//! player block, blank line, signature — see spec §6.1. This module owns
//! splitting and rejoining that shape; it knows nothing about what the
//! stanzas contain.

use crate::consts::VERSION;
use crate::error::{Error, Result};

pub const SEPARATOR: &str = "\n\n";

/// The four stanzas of a parsed deal file, borrowed from the original bytes.
pub struct Stanzas<'a> {
    pub header: &'a str,
    pub cards: &'a str,
    pub players: &'a str,
    pub signature: &'a str,
}

/// Splits `data` into exactly 4 stanzas on the literal byte sequence `\n\n`.
///
/// This is deliberately strict: a CRLF-converted file (`\r\n\r\n`) will not
/// split correctly and fails downstream as `MalformedStanzas` or a base64
/// decode error, rather than being silently accepted. See DESIGN.md.
pub fn split(data: &str) -> Result<Stanzas<'_>> {
    let parts: Vec<&str> = data.split(SEPARATOR).collect();
    if parts.len() != 4 {
        return Err(Error::MalformedStanzas { found: parts.len() });
    }
    Ok(Stanzas {
        header: parts[0],
        cards: parts[1],
        players: parts[2],
        signature: parts[3],
    })
}

/// Validates the `TrustDraw/vX.Y` header, returning the version string.
pub fn parse_header(header: &str) -> Result<&str> {
    let mut parts = header.splitn(2, '/');
    let name = parts.next().unwrap_or_default();
    let version = parts.next().ok_or_else(|| Error::BadVersion {
        found: header.to_owned(),
    })?;
    if name != "TrustDraw" || version != format!("v{VERSION}") {
        return Err(Error::BadVersion {
            found: header.to_owned(),
        });
    }
    Ok(version)
}

/// Reconstructs the exact byte range the dealer signs: the header, card
/// block and player block, each still separated by `\n\n`, followed by a
/// single trailing newline (but no trailing blank-line separator, and no
/// signature stanza).
pub fn signed_range(header: &str, cards: &str, players: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(header.len() + cards.len() + players.len() + 5);
    buf.extend_from_slice(header.as_bytes());
    buf.extend_from_slice(SEPARATOR.as_bytes());
    buf.extend_from_slice(cards.as_bytes());
    buf.extend_from_slice(SEPARATOR.as_bytes());
    buf.extend_from_slice(players.as_bytes());
    buf.push(b'\n');
    buf
}
