//! In-built card decks, embedded at compile time, plus loading a deck from
//! an arbitrary file path.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

const STANDARD52_FR: &str = include_str!("../decks/standard52-fr.txt");
const SCRABBLE_EN: &str = include_str!("../decks/scrabble-en.txt");
const SCRABBLE_ES: &str = include_str!("../decks/scrabble-es.txt");
const ESCARBAR: &str = include_str!("../decks/escarbar.txt");

/// Loads a deck by in-built name, falling back to treating `name` as a file
/// path of newline-separated card names.
pub fn load(name: &str) -> Result<Vec<String>> {
    if let Some(cards) = load_in_built(name) {
        return Ok(cards);
    }

    let data = fs::read_to_string(Path::new(name)).with_context(|| format!("cannot load deck {name}"))?;
    Ok(split_lines(&data))
}

fn load_in_built(name: &str) -> Option<Vec<String>> {
    let text = match name {
        "standard52-fr" => STANDARD52_FR,
        "scrabble-en" => SCRABBLE_EN,
        "scrabble-es" => SCRABBLE_ES,
        "escarbar" => ESCARBAR,
        _ => return None,
    };
    Some(split_lines(text))
}

fn split_lines(data: &str) -> Vec<String> {
    data.lines().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard52_has_52_cards() {
        assert_eq!(load_in_built("standard52-fr").unwrap().len(), 52);
    }

    #[test]
    fn scrabble_en_has_100_tiles() {
        assert_eq!(load_in_built("scrabble-en").unwrap().len(), 100);
    }

    #[test]
    fn unknown_name_is_not_in_built() {
        assert!(load_in_built("not-a-deck").is_none());
    }
}
