//! PEM key loading for the dealer's Ed25519 key and players' RSA keys.
//!
//! Mirrors the original tool's key conventions: the dealer key is a PKCS#8
//! Ed25519 private/public key pair (`openssl genpkey -algorithm ed25519`),
//! and player keys are PKCS#8/PKCS#1 RSA key pairs.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey as RsaDecodePrivateKey, DecodePublicKey as RsaDecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};

pub fn load_dealer_private_key(path: impl AsRef<Path>) -> Result<SigningKey> {
    let path = path.as_ref();
    let pem = fs::read_to_string(path).with_context(|| format!("could not read dealer key ({})", path.display()))?;
    SigningKey::from_pkcs8_pem(&pem)
        .with_context(|| format!("dealer PEM file ({}) is not a private Ed25519 key", path.display()))
}

pub fn load_dealer_public_key(path: impl AsRef<Path>) -> Result<VerifyingKey> {
    let path = path.as_ref();
    let pem = fs::read_to_string(path).with_context(|| format!("could not read dealer key ({})", path.display()))?;
    VerifyingKey::from_public_key_pem(&pem)
        .with_context(|| format!("dealer PEM file ({}) is not a public Ed25519 key", path.display()))
}

pub fn load_player_private_key(path: impl AsRef<Path>) -> Result<RsaPrivateKey> {
    let path = path.as_ref();
    let pem = fs::read_to_string(path).with_context(|| format!("could not read player key ({})", path.display()))?;
    RsaDecodePrivateKey::from_pkcs8_pem(&pem)
        .with_context(|| format!("player PEM file ({}) is not a private RSA key", path.display()))
}

pub fn load_player_public_key(path: impl AsRef<Path>) -> Result<RsaPublicKey> {
    let path = path.as_ref();
    let pem = fs::read_to_string(path).with_context(|| format!("could not read player key ({})", path.display()))?;
    RsaDecodePublicKey::from_public_key_pem(&pem)
        .with_context(|| format!("player PEM file ({}) is not a public RSA key", path.display()))
}
