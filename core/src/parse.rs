//! Deal parser & verifier (spec §4.2).

use std::io::Read;

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use ed25519_dalek::{Signature, VerifyingKey};

use crate::consts::AES_BLOCK;
use crate::error::{Error, Result};
use crate::primitives::ed25519_verify;
use crate::stanza::{self, signed_range};

/// The structural contents of a deal file, before any signature check.
pub struct ParsedDeal {
    pub card_ciphertexts: Vec<[u8; AES_BLOCK]>,
    pub player_envelopes: Vec<Vec<u8>>,
    pub header: String,
    pub cards_block: String,
    pub players_block: String,
    pub signature_b64: String,
}

impl ParsedDeal {
    pub fn card_count(&self) -> usize {
        self.card_ciphertexts.len()
    }

    pub fn player_count(&self) -> usize {
        self.player_envelopes.len()
    }
}

/// Parses a deal file's structure without checking the dealer signature.
/// `verify_deal` wraps this and additionally checks the signature; `open_game`
/// uses this directly since it identifies the player without the dealer's
/// public key (see spec §4.3.1).
pub fn parse(reader: &mut impl Read) -> Result<ParsedDeal> {
    let mut data = String::new();
    reader.read_to_string(&mut data).map_err(Error::ReadFailed)?;

    let stanzas = stanza::split(&data)?;
    stanza::parse_header(stanzas.header)?;

    let card_ciphertexts = parse_cards(stanzas.cards)?;
    let player_envelopes = parse_players(stanzas.players)?;

    Ok(ParsedDeal {
        card_ciphertexts,
        player_envelopes,
        header: stanzas.header.to_owned(),
        cards_block: stanzas.cards.to_owned(),
        players_block: stanzas.players.to_owned(),
        signature_b64: stanzas.signature.to_owned(),
    })
}

fn parse_cards(block: &str) -> Result<Vec<[u8; AES_BLOCK]>> {
    if block.is_empty() {
        return Err(Error::NoCards);
    }
    block
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            let bytes = STANDARD_NO_PAD.decode(line)?;
            if bytes.len() != AES_BLOCK {
                return Err(Error::InvalidCiphertextLength {
                    index: i,
                    len: bytes.len(),
                });
            }
            let mut block = [0u8; AES_BLOCK];
            block.copy_from_slice(&bytes);
            Ok(block)
        })
        .collect()
}

fn parse_players(block: &str) -> Result<Vec<Vec<u8>>> {
    block
        .split('\n')
        .map(|line| STANDARD_NO_PAD.decode(line).map_err(Error::from))
        .collect()
}

/// Parses and verifies a deal file's dealer signature, returning `(card_count, player_count)`.
///
/// Verification is pure: it doesn't touch any player key.
pub fn verify_deal(reader: &mut impl Read, dealer_pub: &VerifyingKey) -> Result<(usize, usize)> {
    let parsed = parse(reader)?;
    verify_signature(&parsed, dealer_pub)?;
    Ok((parsed.card_count(), parsed.player_count()))
}

fn verify_signature(parsed: &ParsedDeal, dealer_pub: &VerifyingKey) -> Result<()> {
    let signed = signed_range(&parsed.header, &parsed.cards_block, &parsed.players_block);
    let sig_bytes = STANDARD_NO_PAD.decode(&parsed.signature_b64)?;
    let sig_bytes: [u8; 64] = sig_bytes
        .as_slice()
        .try_into()
        .map_err(|_| Error::BadSignature)?;
    let signature = Signature::from_bytes(&sig_bytes);

    if !ed25519_verify(dealer_pub, &signed, &signature) {
        return Err(Error::BadSignature);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::deal;
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;
    use rsa::RsaPrivateKey;

    fn make_deal(n_cards: usize, n_players: usize) -> (Vec<u8>, SigningKey) {
        let signing_key = SigningKey::generate(&mut OsRng);
        let player_keys: Vec<_> = (0..n_players)
            .map(|_| RsaPrivateKey::new(&mut OsRng, 1024).unwrap())
            .collect();
        let pubs: Vec<_> = player_keys.iter().map(|k| k.to_public_key()).collect();
        let mut cards: Vec<String> = (0..n_cards).map(|i| format!("C{i}")).collect();
        let mut out = Vec::new();
        deal(&mut out, &mut cards, &signing_key, &pubs).unwrap();
        (out, signing_key)
    }

    #[test]
    fn round_trips() {
        let (out, signing_key) = make_deal(4, 2);
        let (cards, players) = verify_deal(&mut out.as_slice(), &signing_key.verifying_key()).unwrap();
        assert_eq!(cards, 4);
        assert_eq!(players, 2);
    }

    #[test]
    fn tampered_card_byte_fails_signature() {
        let (mut out, signing_key) = make_deal(4, 2);
        // Flip a bit inside the card block (well past the header's first blank line).
        let flip_at = out.iter().position(|&b| b == b'\n').unwrap() + 2;
        out[flip_at] ^= 0x01;
        let err = verify_deal(&mut out.as_slice(), &signing_key.verifying_key()).unwrap_err();
        assert!(matches!(err, Error::BadSignature));
    }

    #[test]
    fn bad_header_is_rejected() {
        let data = b"NotTrustDraw\n\nAAAA\n\nAAAA\n\nAAAA".to_vec();
        let (_, signing_key) = make_deal(1, 2);
        let err = verify_deal(&mut data.as_slice(), &signing_key.verifying_key()).unwrap_err();
        assert!(matches!(err, Error::BadVersion { .. }));
    }
}
