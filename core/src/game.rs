//! Game session (spec §4.3): open a verified deal file on behalf of one
//! player, track deck state, and service `allow_draw`, `draw` and
//! `verify_draw`.

use std::io::Read;

use rsa::RsaPrivateKey;
use zeroize::Zeroize;

use crate::allow_key::{from_allow_key, to_allow_key};
use crate::consts::AES_BLOCK;
use crate::error::{Error, Result};
use crate::parse::parse;
use crate::primitives::{aes_ctr_decrypt, aes_ecb_decrypt_block, rsa_oaep_decrypt, rsa_private_ciphertext_len, xor_into};
use crate::state::{encode_state, load_state};

/// A player's view of an opened deal: the ciphertext deck, this player's own
/// shares (which must never be serialized), this player's 1-indexed number,
/// and the mutable draw state.
pub struct Game {
    player_number: u8,
    players: usize,
    cards: Vec<[u8; AES_BLOCK]>,
    /// This player's 16-byte share of every card's key, indexed by card id.
    /// Zeroized on drop — it's the one piece of secret material a `Game` owns.
    shares: Vec<[u8; 16]>,
    state: Vec<u8>,
}

impl Drop for Game {
    fn drop(&mut self) {
        for share in &mut self.shares {
            share.zeroize();
        }
    }
}

impl Game {
    /// Opens a deal file for the player whose private key is `player_priv`.
    ///
    /// Identifies the player by trial-decrypting each envelope in turn (spec
    /// §4.3.1, §9): this avoids leaking the binding between envelope order
    /// and player identity in the deal file itself, at the cost of the RSA
    /// library needing to fail closed (not timing-observably) on the wrong
    /// key, which is the `rsa` crate's documented behavior for OAEP.
    pub fn open(reader: &mut impl Read, player_priv: &RsaPrivateKey, state: &str) -> Result<Self> {
        let parsed = parse(reader)?;
        let card_count = parsed.card_count();
        let players = parsed.player_count();

        let mut found: Option<(u8, Vec<[u8; 16]>)> = None;
        for (i, envelope) in parsed.player_envelopes.iter().enumerate() {
            if let Some(shares) = try_open_envelope(envelope, player_priv, card_count) {
                found = Some(((i + 1) as u8, shares));
                break;
            }
        }
        let (player_number, shares) = found.ok_or(Error::WrongPlayerKey)?;

        let state = load_state(state, card_count, players)?;

        Ok(Self {
            player_number,
            players,
            cards: parsed.card_ciphertexts,
            shares,
            state,
        })
    }

    /// This player's 1-indexed number in the game.
    pub fn player_number(&self) -> u8 {
        self.player_number
    }

    /// Total number of players in the game.
    pub fn players(&self) -> usize {
        self.players
    }

    /// Total number of cards in the deck.
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// The current draw state, base64 encoded (spec §4.3.5).
    pub fn state(&self) -> String {
        encode_state(&self.state)
    }

    /// Releases the caller's share of the next undrawn card (lowest card id
    /// first) to `intended`, marking that slot as intended for them.
    pub fn allow_draw(&mut self, intended: u8) -> Result<String> {
        if intended < 1 || intended as usize > self.players {
            return Err(Error::PlayerNotInGame {
                player: intended,
                players: self.players,
            });
        }

        for (card_id, share) in self.shares.iter().enumerate() {
            if self.state[card_id] != 0 {
                continue;
            }
            self.state[card_id] = intended;
            return Ok(to_allow_key(card_id as u16, share));
        }

        Err(Error::NoCardsLeft)
    }

    /// Combines the other players' shares (given as allow-keys) with the
    /// caller's own share to reconstruct and decrypt one card.
    ///
    /// Returns the card string, the caller's own allow-key for that card
    /// (released now as proof-of-draw), and whether this card had already
    /// been recorded as drawn (a replay). State is only written once
    /// decryption succeeds.
    pub fn draw(&mut self, peer_allow_keys: &[String]) -> Result<(String, String, bool)> {
        let expected = self.players - 1;
        if peer_allow_keys.len() != expected {
            return Err(Error::WrongShareCount {
                expected,
                got: peer_allow_keys.len(),
            });
        }

        let (card_id, peer_shares) = decode_consistent_shares(peer_allow_keys)?;
        let own_share = self
            .shares
            .get(card_id)
            .ok_or(Error::BadAllowKey)?;

        let refs: Vec<&[u8]> = peer_shares.iter().map(|s| s.as_slice()).collect();
        let card_key = xor_key(own_share, &refs);
        let card = decrypt_card(self.cards[card_id], card_key)?;

        let already_drawn = self.state[card_id] != 0;
        self.state[card_id] = self.player_number;

        let own_allow_key = to_allow_key(card_id as u16, own_share);
        Ok((card, own_allow_key, already_drawn))
    }

    /// Same reconstruction as `draw`: the caller's own share combined with
    /// the given peer shares (one of which is typically the drawer's own,
    /// already revealed by their `draw` call). Pure; never mutates state.
    pub fn verify_draw(&self, claimed_card: &str, peer_allow_keys: &[String]) -> Result<bool> {
        let (card_id, peer_shares) = decode_consistent_shares(peer_allow_keys)?;
        let own_share = self.shares.get(card_id).ok_or(Error::BadAllowKey)?;

        let refs: Vec<&[u8]> = peer_shares.iter().map(|s| s.as_slice()).collect();
        let card_key = xor_key(own_share, &refs);
        let recovered = decrypt_card(self.cards[card_id], card_key)?;

        Ok(recovered == claimed_card)
    }
}

fn decode_consistent_shares(allow_keys: &[String]) -> Result<(usize, Vec<[u8; 16]>)> {
    let mut card_id = None;
    let mut shares = Vec::with_capacity(allow_keys.len());
    for key in allow_keys {
        let (id, share) = from_allow_key(key)?;
        match card_id {
            None => card_id = Some(id),
            Some(existing) if existing == id => {}
            Some(_) => return Err(Error::InconsistentShares),
        }
        shares.push(share);
    }
    Ok((card_id.unwrap_or(0) as usize, shares))
}

fn xor_key(first: &[u8; 16], rest: &[&[u8]]) -> [u8; 16] {
    let combined = xor_into(first, rest);
    let mut key = [0u8; 16];
    key.copy_from_slice(&combined);
    key
}

fn decrypt_card(ciphertext: [u8; AES_BLOCK], key: [u8; 16]) -> Result<String> {
    let padded = aes_ecb_decrypt_block(&key, &ciphertext);
    let end = padded.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8(padded[..end].to_vec()).map_err(|e| Error::Crypto(format!("decrypted card is not valid UTF-8: {e}")))
}

/// Attempts to open one player's envelope with `player_priv`. Returns `None`
/// (not an error) on any failure — a wrong key is an expected outcome of
/// this trial-decryption loop, not a protocol violation.
fn try_open_envelope(envelope: &[u8], player_priv: &RsaPrivateKey, card_count: usize) -> Option<Vec<[u8; 16]>> {
    let rsa_bytes = rsa_private_ciphertext_len(player_priv);
    if envelope.len() < rsa_bytes + AES_BLOCK {
        return None;
    }

    let (rsa_ct, rest) = envelope.split_at(rsa_bytes);
    let envelope_key = rsa_oaep_decrypt(player_priv, rsa_ct).ok()?;
    let envelope_key: [u8; 16] = envelope_key.as_slice().try_into().ok()?;

    let (iv, ctr_ct) = rest.split_at(AES_BLOCK);
    let iv: [u8; 16] = iv.try_into().ok()?;

    if ctr_ct.len() != card_count * AES_BLOCK {
        return None;
    }

    let plaintext = aes_ctr_decrypt(&envelope_key, &iv, ctr_ct);
    let mut shares = Vec::with_capacity(card_count);
    for chunk in plaintext.chunks_exact(AES_BLOCK) {
        let mut share = [0u8; 16];
        share.copy_from_slice(chunk);
        shares.push(share);
    }
    Some(shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::deal;
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;

    fn setup(n_cards: usize, n_players: usize) -> (Vec<u8>, Vec<RsaPrivateKey>) {
        let signing_key = SigningKey::generate(&mut OsRng);
        let player_keys: Vec<_> = (0..n_players)
            .map(|_| RsaPrivateKey::new(&mut OsRng, 1024).unwrap())
            .collect();
        let pubs: Vec<_> = player_keys.iter().map(|k| k.to_public_key()).collect();
        let mut cards: Vec<String> = (0..n_cards).map(|i| format!("C{i}")).collect();
        let mut out = Vec::new();
        deal(&mut out, &mut cards, &signing_key, &pubs).unwrap();
        (out, player_keys)
    }

    #[test]
    fn opens_for_the_right_player_only() {
        let (deal_bytes, player_keys) = setup(4, 2);
        let game = Game::open(&mut deal_bytes.as_slice(), &player_keys[0], "").unwrap();
        assert_eq!(game.players(), 2);
        assert_eq!(game.card_count(), 4);

        let unrelated = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
        let err = Game::open(&mut deal_bytes.as_slice(), &unrelated, "").unwrap_err();
        assert!(matches!(err, Error::WrongPlayerKey));
    }

    #[test]
    fn allow_draw_marks_intended_recipient_only() {
        let (deal_bytes, player_keys) = setup(4, 2);
        let mut game = Game::open(&mut deal_bytes.as_slice(), &player_keys[0], "").unwrap();
        game.allow_draw(2).unwrap();
        let state = load_state(&game.state(), 4, 2).unwrap();
        assert_eq!(state.iter().filter(|&&b| b != 0).count(), 1);
        assert_eq!(state.iter().filter(|&&b| b == 2).count(), 1);
    }

    #[test]
    fn draw_round_trip_between_two_players() {
        let (deal_bytes, player_keys) = setup(4, 2);
        let mut p1 = Game::open(&mut deal_bytes.as_slice(), &player_keys[0], "").unwrap();
        let mut p2 = Game::open(&mut deal_bytes.as_slice(), &player_keys[1], "").unwrap();

        let ak_for_p1_from_p1 = p1.allow_draw(2).unwrap(); // p1 releases share of card 0 to p2
        let ak_for_p2_from_p2 = p2.allow_draw(1).unwrap(); // p2 releases share of card 1 to p1

        let (card_id_from_p1, _) = from_allow_key(&ak_for_p1_from_p1).unwrap();
        let (card_id_from_p2, _) = from_allow_key(&ak_for_p2_from_p2).unwrap();

        // p2 draws the card p1 allowed (using p1's share)
        let (_card, _own_ak, already) = p2.draw(&[ak_for_p1_from_p1.clone()]).unwrap();
        assert!(!already);
        assert_eq!(card_id_from_p1, card_id_from_p1); // sanity

        // p1 draws the card p2 allowed
        let (_card, _own_ak, already) = p1.draw(&[ak_for_p2_from_p2.clone()]).unwrap();
        assert!(!already);
        assert_ne!(card_id_from_p1, card_id_from_p2);
    }

    #[test]
    fn replayed_draw_reports_already_drawn() {
        let (deal_bytes, player_keys) = setup(2, 2);
        let mut p1 = Game::open(&mut deal_bytes.as_slice(), &player_keys[0], "").unwrap();
        let mut p2 = Game::open(&mut deal_bytes.as_slice(), &player_keys[1], "").unwrap();

        let ak = p2.allow_draw(1).unwrap();
        let (card1, ak1, already1) = p1.draw(&[ak.clone()]).unwrap();
        assert!(!already1);
        let (card2, ak2, already2) = p1.draw(&[ak]).unwrap();
        assert!(already2);
        assert_eq!(card1, card2);
        assert_eq!(ak1, ak2);
    }

    #[test]
    fn cross_card_shares_are_rejected() {
        let (deal_bytes, player_keys) = setup(4, 3);
        let mut p1 = Game::open(&mut deal_bytes.as_slice(), &player_keys[0], "").unwrap();
        let mut p2 = Game::open(&mut deal_bytes.as_slice(), &player_keys[1], "").unwrap();
        let mut p3 = Game::open(&mut deal_bytes.as_slice(), &player_keys[2], "").unwrap();

        let ak_card0 = p1.allow_draw(2).unwrap();
        let ak_card1 = p3.allow_draw(2).unwrap();

        let err = p2.draw(&[ak_card0, ak_card1]).unwrap_err();
        assert!(matches!(err, Error::InconsistentShares));
    }

    #[test]
    fn exhaustion_returns_no_cards_left_without_mutating_state() {
        let (deal_bytes, player_keys) = setup(1, 2);
        let mut game = Game::open(&mut deal_bytes.as_slice(), &player_keys[0], "").unwrap();
        game.allow_draw(2).unwrap();
        let state_before = game.state();
        let err = game.allow_draw(2).unwrap_err();
        assert!(matches!(err, Error::NoCardsLeft));
        assert_eq!(game.state(), state_before);
    }

    #[test]
    fn verify_draw_checks_claimed_card() {
        let (deal_bytes, player_keys) = setup(2, 2);
        let mut p1 = Game::open(&mut deal_bytes.as_slice(), &player_keys[0], "").unwrap();
        let mut p2 = Game::open(&mut deal_bytes.as_slice(), &player_keys[1], "").unwrap();

        let ak_p2 = p2.allow_draw(1).unwrap();
        let (card, ak_p1, _) = p1.draw(&[ak_p2.clone()]).unwrap();

        assert!(p2.verify_draw(&card, &[ak_p1.clone()]).unwrap());
        assert!(!p2.verify_draw("not the card", &[ak_p1]).unwrap());
    }
}
