//! CLI tools for the TrustDraw protocol: deal, verify, and play a
//! zero-trust shuffled deck of cards using RSA, AES and Ed25519.

mod decks;
mod keys;
mod state_file;

use std::fs;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

const DEAL_LONG_ABOUT: &str = "\
Produces a deal file that holds all the information needed to hold a trustless
game of cards for the players whose public keys are provided.

<deck>        One of the in-built decks (see below), or a path to a text file
              containing a list of 'card' names, one per line. They cannot be
              longer than 16 bytes.

<dealer-key>  Path to an Ed25519 private key in PEM format, used for signing
              the deal file.

<player-key>  Path to each player's RSA public key (at least 1024 bits) in PEM
              format. Two or more player keys must be given.

In-built decks:
  standard52-fr  A French-suited standard 52 card deck of cards: 3♣ 2♥ K♦ etc
  scrabble-en    An English Scrabble 100 tile set: 12×E 9×A 9×I 8×O etc
  scrabble-es    A Spanish Scrabble 100 tile set: 12×A 1×CH 1×Ñ etc
  escarbar       A Latin-American Scrabble 108 tile set: 12×E 3×LL 3×Ñ etc";

#[derive(Parser)]
#[command(
    name = "trustdraw",
    version,
    about = "CLI tools for TrustDraw zero-trust card dealing",
    long_about = "Tooling for the TrustDraw protocol, for dealing and playing with a shuffled deck of cards in the open, using RSA, AES and Ed25519 encryption."
)]
struct Cli {
    /// Path to the game state file to use
    #[arg(long, global = true, default_value = "")]
    state: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Produce a deal file for the specified players
    #[command(long_about = DEAL_LONG_ABOUT)]
    Deal {
        /// One of the in-built decks, or a path to a newline-separated deck file
        deck: String,
        /// Path to the dealer's Ed25519 private key (PEM)
        dealer_key: String,
        /// Paths to each player's RSA public key (PEM); at least two are required
        #[arg(required = true, num_args = 1..)]
        player_keys: Vec<String>,
    },
    /// Verifies a TrustDraw deal file
    Verify {
        deal_file: String,
        dealer_public_key: String,
    },
    /// Allows a specified player to draw a card
    AllowDraw {
        deal_file: String,
        player_private_key: String,
        player_number: u8,
    },
    /// Draws a card from the dealt deck
    Draw {
        deal_file: String,
        player_private_key: String,
        #[arg(required = true, num_args = 1..)]
        allow_keys: Vec<String>,
    },
    /// Verify another player's drawn card
    VerifyDraw {
        deal_file: String,
        player_private_key: String,
        drawn_card: String,
        #[arg(required = true, num_args = 1..)]
        allow_keys: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Deal {
            deck,
            dealer_key,
            player_keys,
        } => run_deal(&deck, &dealer_key, &player_keys),
        Command::Verify {
            deal_file,
            dealer_public_key,
        } => run_verify(&deal_file, &dealer_public_key),
        Command::AllowDraw {
            deal_file,
            player_private_key,
            player_number,
        } => run_allow_draw(&cli.state, &deal_file, &player_private_key, player_number),
        Command::Draw {
            deal_file,
            player_private_key,
            allow_keys,
        } => run_draw(&cli.state, &deal_file, &player_private_key, &allow_keys),
        Command::VerifyDraw {
            deal_file,
            player_private_key,
            drawn_card,
            allow_keys,
        } => run_verify_draw(&cli.state, &deal_file, &player_private_key, &drawn_card, &allow_keys),
    }
}

fn run_deal(deck: &str, dealer_key: &str, player_key_paths: &[String]) -> Result<()> {
    let mut cards = decks::load(deck)?;
    tracing::debug!(deck, cards = cards.len(), "loaded deck");
    let dealer_signing_key = keys::load_dealer_private_key(dealer_key)?;

    let player_pubs = player_key_paths
        .iter()
        .map(keys::load_player_public_key)
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(players = player_pubs.len(), "loaded player keys");

    let card_count = cards.len();
    let mut stdout = std::io::stdout().lock();
    trustdraw::deal(&mut stdout, &mut cards, &dealer_signing_key, &player_pubs)?;

    tracing::info!(card_count, players = player_pubs.len(), "dealt and signed deal file");
    eprintln!("\nDeal file with {card_count} shuffled cards written to stdout");
    Ok(())
}

fn run_verify(deal_file: &str, dealer_public_key: &str) -> Result<()> {
    let mut deal = fs::File::open(deal_file).with_context(|| format!("could not open {deal_file}"))?;
    let dealer_pub = keys::load_dealer_public_key(dealer_public_key)?;

    let result = trustdraw::verify_deal(&mut deal, &dealer_pub);
    if let Err(e) = &result {
        tracing::debug!(deal_file, error = %e, "deal file failed to parse or verify");
    }
    let (cards, players) = result.with_context(|| format!("{deal_file} is not a valid deal file"))?;

    tracing::info!(deal_file, cards, players, "deal file verified");
    eprintln!("{deal_file} is a valid deck of {cards} cards for {players} players");
    Ok(())
}

fn run_allow_draw(state_flag: &str, deal_file: &str, player_key: &str, player_number: u8) -> Result<()> {
    let mut deal = fs::File::open(deal_file).with_context(|| format!("could not open {deal_file}"))?;
    let player_priv = keys::load_player_private_key(player_key)?;

    let state_path = state_file::state_file_path(state_flag, deal_file, player_key);
    let state = state_file::read_or_make(&state_path)?;

    let mut game = trustdraw::Game::open(&mut deal, &player_priv, &state)?;
    tracing::debug!(player_number = game.player_number(), players = game.players(), "opened game");

    if player_number < 1 || player_number as usize > game.players() {
        bail!("player #{player_number} is not a part of this game (there are {} players)", game.players());
    }

    let allow_key = match game.allow_draw(player_number) {
        Ok(key) => Some(key),
        Err(trustdraw::Error::NoCardsLeft) => {
            tracing::debug!("no cards left to allow a draw for");
            eprintln!("There are no cards left to draw");
            None
        }
        Err(e) => return Err(e.into()),
    };

    state_file::save(&state_path, &game.state())?;

    tracing::info!(intended = player_number, allowed = allow_key.is_some(), "allow-draw complete");
    if let Some(key) = allow_key {
        print!("{key}");
    }
    Ok(())
}

fn run_draw(state_flag: &str, deal_file: &str, player_key: &str, allow_keys: &[String]) -> Result<()> {
    let mut deal = fs::File::open(deal_file).with_context(|| format!("could not open {deal_file}"))?;
    let player_priv = keys::load_player_private_key(player_key)?;

    let state_path = state_file::state_file_path(state_flag, deal_file, player_key);
    let state = state_file::read_or_make(&state_path)?;

    let mut game = trustdraw::Game::open(&mut deal, &player_priv, &state)?;
    tracing::debug!(player_number = game.player_number(), peer_shares = allow_keys.len(), "drawing card");
    let (card, allow_key, already_drawn) = game.draw(allow_keys)?;

    state_file::save(&state_path, &game.state())?;

    tracing::info!(already_drawn, "draw complete");
    let verb = if already_drawn { "previously drew" } else { "have drawn" };
    println!("You {verb}: {card}\nProve with: {allow_key}");
    Ok(())
}

fn run_verify_draw(
    state_flag: &str,
    deal_file: &str,
    player_key: &str,
    drawn_card: &str,
    allow_keys: &[String],
) -> Result<()> {
    let mut deal = fs::File::open(deal_file).with_context(|| format!("could not open {deal_file}"))?;
    let player_priv = keys::load_player_private_key(player_key)?;

    let state_path = state_file::state_file_path(state_flag, deal_file, player_key);
    let state = fs::read_to_string(&state_path)
        .with_context(|| format!("could not read state file at {}", state_path.display()))?;

    let game = trustdraw::Game::open(&mut deal, &player_priv, &state)?;
    let valid = game.verify_draw(drawn_card, allow_keys)?;

    tracing::info!(valid, "verify-draw complete");
    if valid {
        println!("This was a valid draw");
        Ok(())
    } else {
        eprintln!("This was not a valid draw");
        std::process::exit(1);
    }
}
