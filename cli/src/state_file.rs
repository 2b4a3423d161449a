//! On-disk game state file: where a player's draw progress for one deal is
//! persisted between CLI invocations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Picks the state file path: the explicit `--state` flag if given,
/// otherwise one derived from the deal file and the player's key path so
/// repeated invocations for the same game/player pair agree on a name.
pub fn state_file_path(explicit: &str, deal_path: &str, player_key_path: &str) -> PathBuf {
    if !explicit.is_empty() {
        return PathBuf::from(explicit);
    }

    let deal_name = Path::new(deal_path).file_name().and_then(|n| n.to_str()).unwrap_or("deal");
    let key_name = Path::new(player_key_path).file_name().and_then(|n| n.to_str()).unwrap_or("player");
    PathBuf::from(format!("{deal_name}.{key_name}.state"))
}

/// Reads a state file's contents, or an empty string (a fresh game) if it
/// doesn't exist yet.
pub fn read_or_make(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e).with_context(|| format!("could not read state file at {}", path.display())),
    }
}

/// Writes the game's current state back to its state file.
pub fn save(path: &Path, state: &str) -> Result<()> {
    fs::write(path, state).with_context(|| format!("could not save game state to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flag_wins() {
        let path = state_file_path("/tmp/mine.state", "deal.txt", "player.pem");
        assert_eq!(path, PathBuf::from("/tmp/mine.state"));
    }

    #[test]
    fn default_name_combines_deal_and_key() {
        let path = state_file_path("", "game.deal", "player1.pem");
        assert_eq!(path, PathBuf::from("game.deal.player1.pem.state"));
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent.state");
        assert_eq!(read_or_make(&path).unwrap(), "");
    }

    #[test]
    fn save_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.state");
        save(&path, "AQI").unwrap();
        assert_eq!(read_or_make(&path).unwrap(), "AQI");
    }
}
