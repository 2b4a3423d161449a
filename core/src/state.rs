//! Game-state vector codec (spec §4.3.5, §6.4).
//!
//! `state[i] == 0` means card `i` is still in the deck; `1..=player_count`
//! means it was drawn by that player. The vector is base64-raw-std encoded,
//! one byte per card.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};

use crate::error::{Error, Result};

/// Encodes a state vector as a base64 string.
pub fn encode_state(state: &[u8]) -> String {
    STANDARD_NO_PAD.encode(state)
}

/// Decodes a state string into a vector of exactly `card_count` bytes.
///
/// An empty string means a fresh game: all-zero, length `card_count`. A
/// shorter-than-`card_count` decoded vector is zero-extended (a missing
/// tail means "those cards are still undrawn"). Any byte greater than
/// `player_count` is rejected.
pub fn load_state(encoded: &str, card_count: usize, player_count: usize) -> Result<Vec<u8>> {
    if encoded.is_empty() {
        return Ok(vec![0u8; card_count]);
    }

    let mut decoded = STANDARD_NO_PAD.decode(encoded)?;
    for &byte in &decoded {
        if byte as usize > player_count {
            return Err(Error::BadState {
                byte,
                max_player: player_count as u8,
            });
        }
    }
    decoded.resize(card_count, 0);
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_a_fresh_state() {
        let state = load_state("", 4, 2).unwrap();
        assert_eq!(state, vec![0, 0, 0, 0]);
    }

    #[test]
    fn round_trips() {
        let state = vec![0u8, 2, 1, 0];
        let encoded = encode_state(&state);
        let decoded = load_state(&encoded, 4, 2).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn zero_extends_short_state() {
        let encoded = encode_state(&[1u8]);
        let decoded = load_state(&encoded, 3, 2).unwrap();
        assert_eq!(decoded, vec![1, 0, 0]);
    }

    #[test]
    fn rejects_player_out_of_range() {
        let encoded = encode_state(&[3u8]);
        assert!(load_state(&encoded, 1, 2).is_err());
    }
}
