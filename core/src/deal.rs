//! Deal builder (spec §4.1).

use std::io::Write;

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use ed25519_dalek::SigningKey;
use rsa::RsaPublicKey;

use crate::consts::{AES_BLOCK, CARD_LENGTH, MAX_CARDS, MAX_PLAYERS, RSA_MIN_BITS, VERSION};
use crate::error::{Error, Result};
use crate::primitives::{
    aes_ecb_encrypt_block, aes_ctr_encrypt, ed25519_sign, fill_random, random_block,
    rsa_oaep_encrypt, shuffle, xor_into,
};
use crate::stanza::signed_range;

/// Shuffles `cards`, encrypts each under a fresh XOR-shared key, wraps the
/// shares into one RSA/AES envelope per player, and writes the signed deal
/// file to `out`.
///
/// `cards` is consumed and shuffled in place; the published card order is
/// the shuffled order, never the order the caller supplied.
pub fn deal(
    out: &mut impl Write,
    cards: &mut Vec<String>,
    dealer_signing_key: &SigningKey,
    player_pubs: &[RsaPublicKey],
) -> Result<()> {
    validate_deal_args(cards, player_pubs)?;

    shuffle(cards);

    let players = player_pubs.len();
    let per_card = encrypt_cards(cards, players)?;

    // all_shares[p][i] is player p's 16-byte share of card i's key.
    let mut all_shares: Vec<Vec<[u8; 16]>> = vec![Vec::with_capacity(cards.len()); players];
    let mut card_ciphertexts: Vec<[u8; AES_BLOCK]> = Vec::with_capacity(cards.len());
    for (ciphertext, shares) in per_card {
        card_ciphertexts.push(ciphertext);
        for (p, share) in shares.into_iter().enumerate() {
            all_shares[p].push(share);
        }
    }

    let mut envelopes = Vec::with_capacity(players);
    for (p, pub_key) in player_pubs.iter().enumerate() {
        envelopes.push(build_envelope(&all_shares[p], pub_key)?);
    }

    write_deal_file(out, &card_ciphertexts, &envelopes, dealer_signing_key)
}

/// Encrypts each card under a fresh XOR-shared key. Independent per card, so
/// with the `parallel` feature this fans out across `rayon`'s thread pool;
/// serially otherwise.
#[cfg(not(feature = "parallel"))]
fn encrypt_cards(cards: &[String], players: usize) -> Result<Vec<([u8; AES_BLOCK], Vec<[u8; 16]>)>> {
    cards.iter().map(|card| encrypt_one_card(card, players)).collect()
}

#[cfg(feature = "parallel")]
fn encrypt_cards(cards: &[String], players: usize) -> Result<Vec<([u8; AES_BLOCK], Vec<[u8; 16]>)>> {
    use rayon::prelude::*;
    cards.par_iter().map(|card| encrypt_one_card(card, players)).collect()
}

fn encrypt_one_card(card: &str, players: usize) -> Result<([u8; AES_BLOCK], Vec<[u8; 16]>)> {
    let mut shares = Vec::with_capacity(players);
    for _ in 0..players {
        shares.push(random_block()?);
    }
    let card_key = xor_shares(&shares);
    let padded = pad_card(card)?;
    let ciphertext = aes_ecb_encrypt_block(&card_key, &padded);
    Ok((ciphertext, shares))
}

fn validate_deal_args(cards: &[String], player_pubs: &[RsaPublicKey]) -> Result<()> {
    if cards.len() > MAX_CARDS {
        return Err(Error::TooManyCards {
            count: cards.len(),
            max: MAX_CARDS,
        });
    }
    for card in cards {
        let len = card.as_bytes().len();
        if len > CARD_LENGTH {
            return Err(Error::CardTooLong {
                card: card.clone(),
                len,
                max: CARD_LENGTH,
            });
        }
    }
    if player_pubs.len() < 2 || player_pubs.len() > MAX_PLAYERS {
        return Err(Error::PlayerCountOutOfRange {
            count: player_pubs.len(),
            max: MAX_PLAYERS,
        });
    }
    for (i, pub_key) in player_pubs.iter().enumerate() {
        use rsa::traits::PublicKeyParts;
        let bits = pub_key.n().bits();
        if bits < RSA_MIN_BITS {
            return Err(Error::PlayerKeyTooSmall {
                index: i,
                bits,
                min_bits: RSA_MIN_BITS,
            });
        }
    }
    Ok(())
}

fn xor_shares(shares: &[[u8; 16]]) -> [u8; 16] {
    let refs: Vec<&[u8]> = shares[1..].iter().map(|s| s.as_slice()).collect();
    let combined = xor_into(&shares[0], &refs);
    let mut key = [0u8; 16];
    key.copy_from_slice(&combined);
    key
}

fn pad_card(card: &str) -> Result<[u8; AES_BLOCK]> {
    let bytes = card.as_bytes();
    if bytes.len() > CARD_LENGTH {
        return Err(Error::CardTooLong {
            card: card.to_owned(),
            len: bytes.len(),
            max: CARD_LENGTH,
        });
    }
    let mut padded = [0u8; AES_BLOCK];
    padded[..bytes.len()].copy_from_slice(bytes);
    Ok(padded)
}

/// Builds one player's envelope: `rsa_oaep(envelope_key) ‖ iv(16) ‖ aes_ctr(shares)`.
fn build_envelope(shares: &[[u8; 16]], pub_key: &RsaPublicKey) -> Result<Vec<u8>> {
    let concatenated: Vec<u8> = shares.iter().flat_map(|s| s.iter().copied()).collect();

    let envelope_key = random_block()?;
    let mut iv = [0u8; AES_BLOCK];
    fill_random(&mut iv)?;

    let ctr_ciphertext = aes_ctr_encrypt(&envelope_key, &iv, &concatenated);
    let rsa_ciphertext = rsa_oaep_encrypt(pub_key, &envelope_key)?;

    let mut envelope = Vec::with_capacity(rsa_ciphertext.len() + AES_BLOCK + ctr_ciphertext.len());
    envelope.extend_from_slice(&rsa_ciphertext);
    envelope.extend_from_slice(&iv);
    envelope.extend_from_slice(&ctr_ciphertext);
    Ok(envelope)
}

fn write_deal_file(
    out: &mut impl Write,
    card_ciphertexts: &[[u8; AES_BLOCK]],
    envelopes: &[Vec<u8>],
    dealer_signing_key: &SigningKey,
) -> Result<()> {
    let header = format!("TrustDraw/v{VERSION}");

    let cards_block = card_ciphertexts
        .iter()
        .map(|ct| STANDARD_NO_PAD.encode(ct))
        .collect::<Vec<_>>()
        .join("\n");

    let players_block = envelopes
        .iter()
        .map(|env| STANDARD_NO_PAD.encode(env))
        .collect::<Vec<_>>()
        .join("\n");

    let signed = signed_range(&header, &cards_block, &players_block);
    let signature = ed25519_sign(dealer_signing_key, &signed);
    let signature_b64 = STANDARD_NO_PAD.encode(signature.to_bytes());

    out.write_all(&signed).map_err(Error::WriteFailed)?;
    write!(out, "\n{signature_b64}").map_err(Error::WriteFailed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;
    use rsa::RsaPrivateKey;

    pub(crate) fn make_player_keys(n: usize) -> Vec<RsaPrivateKey> {
        (0..n)
            .map(|_| RsaPrivateKey::new(&mut OsRng, 1024).unwrap())
            .collect()
    }

    #[test]
    fn rejects_oversize_card() {
        let player_keys = make_player_keys(2);
        let pubs: Vec<_> = player_keys.iter().map(|k| k.to_public_key()).collect();
        let signing_key = SigningKey::generate(&mut OsRng);
        let mut cards = vec!["this card name is far too long to fit".to_owned()];
        let mut out = Vec::new();
        let err = deal(&mut out, &mut cards, &signing_key, &pubs).unwrap_err();
        assert!(matches!(err, Error::CardTooLong { .. }));
    }

    #[test]
    fn rejects_too_few_players() {
        let player_keys = make_player_keys(1);
        let pubs: Vec<_> = player_keys.iter().map(|k| k.to_public_key()).collect();
        let signing_key = SigningKey::generate(&mut OsRng);
        let mut cards = vec!["A".to_owned(), "B".to_owned()];
        let mut out = Vec::new();
        let err = deal(&mut out, &mut cards, &signing_key, &pubs).unwrap_err();
        assert!(matches!(err, Error::PlayerCountOutOfRange { .. }));
    }

    #[test]
    fn produces_four_stanzas() {
        let player_keys = make_player_keys(2);
        let pubs: Vec<_> = player_keys.iter().map(|k| k.to_public_key()).collect();
        let signing_key = SigningKey::generate(&mut OsRng);
        let mut cards = vec!["A".to_owned(), "B".to_owned(), "C".to_owned()];
        let mut out = Vec::new();
        deal(&mut out, &mut cards, &signing_key, &pubs).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.split("\n\n").count(), 4);
    }
}
