//! Cryptographic primitives layer: the one part of this crate that talks
//! directly to a vetted crypto library instead of the TrustDraw protocol.
//!
//! Nothing here is TrustDraw-specific. `deal.rs`, `parse.rs` and `game.rs`
//! are built entirely out of these functions plus plain byte-slice code.

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit, KeyIvInit, StreamCipher};
use aes::Aes128;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::{rngs::OsRng, RngCore};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::{Error, Result};

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// Fills `buf` with cryptographically secure random bytes.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| Error::RandomnessFailure(e.to_string()))
}

/// Draws a fresh 16-byte key/share.
pub fn random_block() -> Result<[u8; 16]> {
    let mut buf = [0u8; 16];
    fill_random(&mut buf)?;
    Ok(buf)
}

/// XORs `rest` into `first`, in place, returning the combined key.
/// `first` and every slice in `rest` must be the same length.
pub fn xor_into(first: &[u8], rest: &[&[u8]]) -> Vec<u8> {
    let mut out = first.to_vec();
    for key in rest {
        for (o, b) in out.iter_mut().zip(key.iter()) {
            *o ^= b;
        }
    }
    out
}

/// Encrypts a single 16-byte block with AES-128 in ECB mode (i.e. raw block encryption).
pub fn aes_ecb_encrypt_block(key: &[u8; 16], plaintext: &[u8; 16]) -> [u8; 16] {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut block = GenericArray::clone_from_slice(plaintext);
    cipher.encrypt_block(&mut block);
    block.into()
}

/// Decrypts a single 16-byte block with AES-128 in ECB mode.
pub fn aes_ecb_decrypt_block(key: &[u8; 16], ciphertext: &[u8; 16]) -> [u8; 16] {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut block = GenericArray::clone_from_slice(ciphertext);
    cipher.decrypt_block(&mut block);
    block.into()
}

/// Encrypts `plaintext` with AES-128-CTR under `key`/`iv`, returning the ciphertext.
pub fn aes_ctr_encrypt(key: &[u8; 16], iv: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
    let mut buf = plaintext.to_vec();
    let mut cipher = Aes128Ctr::new(key.into(), iv.into());
    cipher.apply_keystream(&mut buf);
    buf
}

/// Decrypts `ciphertext` with AES-128-CTR under `key`/`iv`. CTR is its own inverse.
pub fn aes_ctr_decrypt(key: &[u8; 16], iv: &[u8; 16], ciphertext: &[u8]) -> Vec<u8> {
    aes_ctr_encrypt(key, iv, ciphertext)
}

/// Encrypts `data` to `pub_key` with RSA-OAEP-SHA256, empty label.
pub fn rsa_oaep_encrypt(pub_key: &RsaPublicKey, data: &[u8]) -> Result<Vec<u8>> {
    pub_key
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), data)
        .map_err(|e| Error::Crypto(format!("RSA-OAEP encryption failed: {e}")))
}

/// Attempts to decrypt `data` with `priv_key` using RSA-OAEP-SHA256, empty label.
///
/// Returns `Err` for any reason the ciphertext doesn't belong to this key — callers
/// (notably `open_game`'s trial-decryption loop) treat that as "try the next envelope",
/// not as a hard protocol error.
pub fn rsa_oaep_decrypt(priv_key: &RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>> {
    priv_key
        .decrypt(Oaep::new::<Sha256>(), data)
        .map_err(|e| Error::Crypto(format!("RSA-OAEP decryption failed: {e}")))
}

/// Size in bytes of an RSA-OAEP ciphertext decryptable by this private key.
pub fn rsa_private_ciphertext_len(priv_key: &RsaPrivateKey) -> usize {
    use rsa::traits::PublicKeyParts;
    priv_key.size()
}

/// Signs `data` with the dealer's Ed25519 key.
pub fn ed25519_sign(signing_key: &SigningKey, data: &[u8]) -> Signature {
    signing_key.sign(data)
}

/// Verifies an Ed25519 signature over `data`.
pub fn ed25519_verify(verifying_key: &VerifyingKey, data: &[u8], signature: &Signature) -> bool {
    verifying_key.verify(data, signature).is_ok()
}

/// Fisher-Yates shuffle, in place, using a CSPRNG.
///
/// https://en.wikipedia.org/wiki/Fisher%E2%80%93Yates_shuffle
pub fn shuffle<T>(slice: &mut [T]) {
    let mut rng = OsRng;
    for i in (1..slice.len()).rev() {
        let j = (rng.next_u32() as usize) % (i + 1);
        slice.swap(i, j);
    }
}
