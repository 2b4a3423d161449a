//! Allow-key codec (spec §4.4, §6.3).
//!
//! An allow-key is the public release of one player's 16-byte share for one
//! specific card: `base64-raw-std( u16-LE(card_id) ‖ share(16) )`, always
//! 24 base64 characters.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};

use crate::error::{Error, Result};

/// Encodes a card id and the caller's share of that card's key into an allow-key string.
pub fn to_allow_key(card_id: u16, share: &[u8; 16]) -> String {
    let mut bytes = Vec::with_capacity(18);
    bytes.extend_from_slice(&card_id.to_le_bytes());
    bytes.extend_from_slice(share);
    STANDARD_NO_PAD.encode(bytes)
}

/// Decodes an allow-key string back into a card id and 16-byte share.
pub fn from_allow_key(allow_key: &str) -> Result<(u16, [u8; 16])> {
    let bytes = STANDARD_NO_PAD
        .decode(allow_key)
        .map_err(|_| Error::BadAllowKey)?;
    if bytes.len() < 18 {
        return Err(Error::BadAllowKey);
    }
    let card_id = u16::from_le_bytes([bytes[0], bytes[1]]);
    let mut share = [0u8; 16];
    share.copy_from_slice(&bytes[2..18]);
    Ok((card_id, share))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let share = [7u8; 16];
        let key = to_allow_key(1234, &share);
        assert_eq!(key.len(), 24);
        let (id, decoded) = from_allow_key(&key).unwrap();
        assert_eq!(id, 1234);
        assert_eq!(decoded, share);
    }

    #[test]
    fn rejects_short_input() {
        let short = STANDARD_NO_PAD.encode([0u8; 10]);
        assert!(from_allow_key(&short).is_err());
    }

    #[test]
    fn rejects_non_base64() {
        assert!(from_allow_key("not valid base64!!").is_err());
    }
}
