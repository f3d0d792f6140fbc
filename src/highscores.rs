//! Best score and leaderboard
//!
//! The personal best is a single integer in storage under `highScore`. The
//! leaderboard is built from the remote user list, with a canned sample when
//! the service can't be reached.

use serde::{Deserialize, Serialize};

use crate::api::{ApiError, UserSummary, UsersResponse};
use crate::persistence::{KeyValueStore, StorageError};

/// Maximum number of leaderboard rows shown
pub const MAX_LEADERBOARD_ENTRIES: usize = 10;

/// Personal best, backed by a key-value store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BestScore {
    pub value: u64,
}

impl BestScore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "highScore";

    /// Load from storage; missing or unreadable values count as zero
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        match store.get_parsed::<u64>(Self::STORAGE_KEY) {
            Ok(value) => Self {
                value: value.unwrap_or(0),
            },
            Err(err) => {
                log::warn!("Could not read best score: {err}");
                Self::default()
            }
        }
    }

    /// Would this score replace the stored best?
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.value
    }

    /// Store `score` if it beats the current best. Returns whether it did.
    pub fn record<S: KeyValueStore>(
        &mut self,
        store: &mut S,
        score: u64,
    ) -> Result<bool, StorageError> {
        if !self.qualifies(score) {
            return Ok(false);
        }
        store.set(Self::STORAGE_KEY, &score.to_string())?;
        log::info!("New best score {} (was {})", score, self.value);
        self.value = score;
        Ok(true)
    }
}

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-indexed
    pub rank: usize,
    pub username: String,
    pub score: u64,
}

/// Where the rows came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardSource {
    Remote,
    Sample,
}

/// Ranked leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    pub source: LeaderboardSource,
}

impl Leaderboard {
    /// Rank users by high score (ties by username), top entries only
    pub fn from_users(users: &[UserSummary]) -> Self {
        let mut sorted: Vec<&UserSummary> = users.iter().collect();
        sorted.sort_by(|a, b| {
            b.high_score
                .cmp(&a.high_score)
                .then_with(|| a.username.cmp(&b.username))
        });

        let entries = sorted
            .into_iter()
            .take(MAX_LEADERBOARD_ENTRIES)
            .enumerate()
            .map(|(i, user)| LeaderboardEntry {
                rank: i + 1,
                username: user.username.clone(),
                score: user.high_score,
            })
            .collect();

        Self {
            entries,
            source: LeaderboardSource::Remote,
        }
    }

    /// Offline stand-in shown when the service is unreachable
    pub fn sample() -> Self {
        let users: Vec<UserSummary> = [
            ("SkyHopper", 12_450),
            ("CloudJumper", 9_870),
            ("SpringKing", 7_320),
            ("PlatformPro", 5_140),
            ("DoodleFan", 2_980),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (name, score))| UserSummary {
            user_id: format!("sample-{}", i + 1),
            username: name.to_string(),
            high_score: score,
        })
        .collect();

        Self {
            source: LeaderboardSource::Sample,
            ..Self::from_users(&users)
        }
    }

    /// Use the fetched list, falling back to the sample on any error
    pub fn from_result(result: Result<UsersResponse, ApiError>) -> Self {
        match result {
            Ok(response) => Self::from_users(&response.users),
            Err(err) => {
                log::warn!("Leaderboard unavailable ({err}), showing sample data");
                Self::sample()
            }
        }
    }

    /// Get the rank a score would achieve (1-indexed, None if it wouldn't place)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let rank = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len())
            + 1;
        (rank <= MAX_LEADERBOARD_ENTRIES).then_some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}
