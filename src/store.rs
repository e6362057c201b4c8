// src/store.rs
//! Storage collaborator.
//!
//! The engine only ever sees plain records; where they live is behind
//! [`Store`]. [`JsonStore`] keeps everything as pretty JSON under one root
//! directory (`.store` by default), [`MemoryStore`] keeps it in memory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::sanitize::sanitize_filename;
use crate::error::StoreError;
use crate::file::write_json;
use crate::model::{CompetitionGame, Game, GamePatch, Opponent, StandingsTable};

pub trait Store {
    fn fetch(&self, team_id: &str) -> Result<Vec<Game>, StoreError>;
    /// Insert or replace by id.
    fn insert(&mut self, games: &[Game]) -> Result<(), StoreError>;
    fn update(&mut self, id: &str, patch: &GamePatch) -> Result<Game, StoreError>;
    fn delete(&mut self, id: &str) -> Result<(), StoreError>;

    fn fetch_opponents(&self, team_id: &str) -> Result<Vec<Opponent>, StoreError>;
    fn insert_opponents(&mut self, team_id: &str, opponents: &[Opponent]) -> Result<(), StoreError>;

    fn fetch_competition_games(&self, competition_id: &str) -> Result<Vec<CompetitionGame>, StoreError>;
    fn insert_competition_games(&mut self, competition_id: &str, games: &[CompetitionGame]) -> Result<(), StoreError>;

    fn save_standings(&mut self, competition_id: &str, table: &StandingsTable) -> Result<(), StoreError>;
}

/* ---------------- shared record handling ---------------- */

fn upsert_by<T: Clone>(into: &mut Vec<T>, items: &[T], id: impl Fn(&T) -> &str) {
    for item in items {
        match into.iter().position(|x| id(x) == id(item)) {
            Some(i) => into[i] = item.clone(),
            None => into.push(item.clone()),
        }
    }
}

fn patch_game(games: &mut [Game], id: &str, patch: &GamePatch) -> Result<Game, StoreError> {
    let g = games.iter_mut().find(|g| g.id == id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    patch.apply(g);
    Ok(g.clone())
}

fn remove_game(games: &mut Vec<Game>, id: &str) -> Result<(), StoreError> {
    let before = games.len();
    games.retain(|g| g.id != id);
    if games.len() == before {
        return Err(StoreError::NotFound(id.to_string()));
    }
    Ok(())
}

/* ---------------- JSON files ---------------- */

const GAMES_FILE: &str = "games.json";
const OPPONENTS_FILE: &str = "opponents.json";
const COMPETITIONS_DIR: &str = "competitions";
const STANDINGS_DIR: &str = "standings";

/// `games.json`, `opponents.json` (keyed by team), `competitions/<id>.json`,
/// `standings/<id>.json`. Single writer; every write replaces a whole file.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path { &self.root }

    fn load<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T, StoreError> {
        if !path.exists() {
            return Ok(T::default());
        }
        let text = fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn save<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        write_json(path, value)?;
        Ok(())
    }

    fn games_path(&self) -> PathBuf { self.root.join(GAMES_FILE) }
    fn opponents_path(&self) -> PathBuf { self.root.join(OPPONENTS_FILE) }

    fn competition_path(&self, id: &str) -> PathBuf {
        self.root.join(COMPETITIONS_DIR).join(join!(&sanitize_filename(id, "competition"), ".json"))
    }

    fn standings_path(&self, id: &str) -> PathBuf {
        self.root.join(STANDINGS_DIR).join(join!(&sanitize_filename(id, "competition"), ".json"))
    }

    fn all_games(&self) -> Result<Vec<Game>, StoreError> {
        self.load(&self.games_path())
    }
}

impl Store for JsonStore {
    fn fetch(&self, team_id: &str) -> Result<Vec<Game>, StoreError> {
        Ok(self.all_games()?.into_iter().filter(|g| g.team_id == team_id).collect())
    }

    fn insert(&mut self, games: &[Game]) -> Result<(), StoreError> {
        let mut all = self.all_games()?;
        upsert_by(&mut all, games, |g| g.id.as_str());
        self.save(&self.games_path(), &all)
    }

    fn update(&mut self, id: &str, patch: &GamePatch) -> Result<Game, StoreError> {
        let mut all = self.all_games()?;
        let updated = patch_game(&mut all, id, patch)?;
        self.save(&self.games_path(), &all)?;
        Ok(updated)
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let mut all = self.all_games()?;
        remove_game(&mut all, id)?;
        self.save(&self.games_path(), &all)
    }

    fn fetch_opponents(&self, team_id: &str) -> Result<Vec<Opponent>, StoreError> {
        let mut by_team: BTreeMap<String, Vec<Opponent>> = self.load(&self.opponents_path())?;
        Ok(by_team.remove(team_id).unwrap_or_default())
    }

    fn insert_opponents(&mut self, team_id: &str, opponents: &[Opponent]) -> Result<(), StoreError> {
        let mut by_team: BTreeMap<String, Vec<Opponent>> = self.load(&self.opponents_path())?;
        upsert_by(by_team.entry(team_id.to_string()).or_default(), opponents, |o| o.id.as_str());
        self.save(&self.opponents_path(), &by_team)
    }

    fn fetch_competition_games(&self, competition_id: &str) -> Result<Vec<CompetitionGame>, StoreError> {
        self.load(&self.competition_path(competition_id))
    }

    fn insert_competition_games(&mut self, competition_id: &str, games: &[CompetitionGame]) -> Result<(), StoreError> {
        let path = self.competition_path(competition_id);
        let mut all: Vec<CompetitionGame> = self.load(&path)?;
        upsert_by(&mut all, games, |g| g.id.as_str());
        self.save(&path, &all)
    }

    fn save_standings(&mut self, competition_id: &str, table: &StandingsTable) -> Result<(), StoreError> {
        self.save(&self.standings_path(competition_id), table)
    }
}

/* ---------------- in memory ---------------- */

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub games: Vec<Game>,
    pub opponents: BTreeMap<String, Vec<Opponent>>,
    pub competition_games: BTreeMap<String, Vec<CompetitionGame>>,
    pub standings: BTreeMap<String, StandingsTable>,
}

impl Store for MemoryStore {
    fn fetch(&self, team_id: &str) -> Result<Vec<Game>, StoreError> {
        Ok(self.games.iter().filter(|g| g.team_id == team_id).cloned().collect())
    }

    fn insert(&mut self, games: &[Game]) -> Result<(), StoreError> {
        upsert_by(&mut self.games, games, |g| g.id.as_str());
        Ok(())
    }

    fn update(&mut self, id: &str, patch: &GamePatch) -> Result<Game, StoreError> {
        patch_game(&mut self.games, id, patch)
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        remove_game(&mut self.games, id)
    }

    fn fetch_opponents(&self, team_id: &str) -> Result<Vec<Opponent>, StoreError> {
        Ok(self.opponents.get(team_id).cloned().unwrap_or_default())
    }

    fn insert_opponents(&mut self, team_id: &str, opponents: &[Opponent]) -> Result<(), StoreError> {
        upsert_by(self.opponents.entry(team_id.to_string()).or_default(), opponents, |o| o.id.as_str());
        Ok(())
    }

    fn fetch_competition_games(&self, competition_id: &str) -> Result<Vec<CompetitionGame>, StoreError> {
        Ok(self.competition_games.get(competition_id).cloned().unwrap_or_default())
    }

    fn insert_competition_games(&mut self, competition_id: &str, games: &[CompetitionGame]) -> Result<(), StoreError> {
        upsert_by(self.competition_games.entry(competition_id.to_string()).or_default(), games, |g| g.id.as_str());
        Ok(())
    }

    fn save_standings(&mut self, competition_id: &str, table: &StandingsTable) -> Result<(), StoreError> {
        self.standings.insert(competition_id.to_string(), table.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::model::Source;

    #[test]
    fn memory_store_upserts_by_id() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let mut store = MemoryStore::default();
        let g = Game::new("t1", d, "Ice", Source::Owha, Some(s!("12")));
        store.insert(&[g.clone()]).unwrap();
        store.insert(&[g.with_score(1, 0)]).unwrap();
        assert_eq!(store.games.len(), 1);
        assert!(store.games[0].played());
        assert!(matches!(store.delete("nope"), Err(StoreError::NotFound(_))));
    }
}
