//! Mints a demo dealer key and N player key pairs as PEM files, for trying
//! out the other commands without reaching for `openssl` by hand.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ed25519_dalek::SigningKey;
use pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;

#[derive(Parser)]
#[command(name = "trustdraw-gen-keys", about = "Generates demo TrustDraw key pairs")]
struct Cli {
    /// Directory to write the generated PEM files into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Number of player key pairs to generate
    #[arg(long, default_value_t = 2)]
    players: usize,

    /// RSA modulus size, in bits, for player keys
    #[arg(long, default_value_t = 2048)]
    rsa_bits: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    std::fs::create_dir_all(&cli.out_dir)?;

    let dealer_key = SigningKey::generate(&mut OsRng);
    write_pem(cli.out_dir.join("dealer.pem"), dealer_key.to_pkcs8_pem(LineEnding::LF)?.as_str())?;
    write_pem(
        cli.out_dir.join("dealer.pub.pem"),
        dealer_key.verifying_key().to_public_key_pem(LineEnding::LF)?.as_str(),
    )?;

    for i in 1..=cli.players {
        let player_key = RsaPrivateKey::new(&mut OsRng, cli.rsa_bits)?;
        write_pem(
            cli.out_dir.join(format!("player{i}.pem")),
            &player_key.to_pkcs8_pem(LineEnding::LF)?,
        )?;
        write_pem(
            cli.out_dir.join(format!("player{i}.pub.pem")),
            &player_key.to_public_key().to_public_key_pem(LineEnding::LF)?,
        )?;
    }

    eprintln!("Wrote dealer and {} player key pairs to {}", cli.players, cli.out_dir.display());
    Ok(())
}

fn write_pem(path: PathBuf, contents: &str) -> Result<()> {
    std::fs::write(&path, contents).with_context(|| format!("could not write {}", path.display()))
}
