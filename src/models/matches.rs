use crate::constants::{DEFAULT_GAMES_AMOUNT, DEFAULT_SCORE};
use crate::models::team::Team;
use crate::osu_types::MatchInfo;
use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchStatus {
    /// later-round match whose feeder matches haven't decided yet
    Scheduled,
    /// teams assigned, not yet bound to a live lobby
    Pending,
    /// bound to a live multiplayer lobby
    #[serde(rename = "In Progress")]
    InProgress,
    /// winner decided
    Completed,
}

/// one completed game inside a match
#[derive(Debug, Clone, Serialize)]
pub struct Game {
    pub team1_score: i64,
    pub team2_score: i64,
    pub game_id: u64,
}

// telemetry identity only; a replayed batch carries the same id with the
// same scores
impl PartialEq for Game {
    fn eq(&self, other: &Self) -> bool {
        self.game_id == other.game_id
    }
}

impl Eq for Game {}

/// a bracket node. `next_match` is an index into the owning bracket's
/// flat match vector, assigned once at generation time.
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    /// round size: N/2 for the first round, halving down to 1 for the final
    pub stage: usize,
    /// 1-based position in the bracket's generation order
    pub number: usize,
    pub status: MatchStatus,
    pub team1: Option<Team>,
    pub team2: Option<Team>,
    pub winner: Option<Team>,
    pub score: String,
    /// external multiplayer lobby id, bound once the match goes live
    pub match_id: Option<u64>,
    pub next_match: Option<usize>,
    pub games: Vec<Game>,
    pub games_amount: usize,
}

impl Match {
    pub fn contains_discord_id(&self, discord_id: &str) -> bool {
        self.team1
            .as_ref()
            .map_or(false, |t| t.contains_discord_id(discord_id))
            || self
                .team2
                .as_ref()
                .map_or(false, |t| t.contains_discord_id(discord_id))
    }

    /// game wins needed to take the match
    pub fn majority_threshold(&self) -> usize {
        self.games_amount / 2 + 1
    }

    /// per-side tallies of recorded game wins; a drawn game counts
    /// toward neither side
    pub fn game_wins(&self) -> (usize, usize) {
        let mut team1 = 0;
        let mut team2 = 0;
        for game in &self.games {
            if game.team1_score > game.team2_score {
                team1 += 1;
            } else if game.team2_score > game.team1_score {
                team2 += 1;
            }
        }
        (team1, team2)
    }
}

/// Match-level scoring capability. One production implementation; swap it
/// out to score matches for a different game or ruleset.
pub trait MatchManager {
    fn create_match(
        &self,
        stage: usize,
        number: usize,
        status: MatchStatus,
        team1: Option<Team>,
        team2: Option<Team>,
    ) -> Match;

    /// folds one telemetry batch into the match: dedups games, tallies the
    /// match score and decides the winner once one side has a majority
    fn update_match(&self, m: &mut Match, info: &MatchInfo);
}

pub struct OsuMatchManager;

impl MatchManager for OsuMatchManager {
    fn create_match(
        &self,
        stage: usize,
        number: usize,
        status: MatchStatus,
        team1: Option<Team>,
        team2: Option<Team>,
    ) -> Match {
        Match {
            stage,
            number,
            status,
            team1,
            team2,
            winner: None,
            score: DEFAULT_SCORE.to_string(),
            match_id: None,
            next_match: None,
            games: Vec::new(),
            games_amount: DEFAULT_GAMES_AMOUNT,
        }
    }

    fn update_match(&self, m: &mut Match, info: &MatchInfo) {
        for event in &info.events {
            if m.games.len() >= m.games_amount {
                // at the best-of cap; a stalled 1:1 draw match must not
                // record an extra deciding game
                break;
            }
            let Some(game) = &event.game else {
                continue;
            };
            if game.scores.is_empty() {
                // still being played; nothing to tally yet
                continue;
            }

            let mut team1_score = 0;
            let mut team2_score = 0;
            for entry in &game.scores {
                if m.team1
                    .as_ref()
                    .map_or(false, |t| t.contains_user_id(entry.user_id))
                {
                    team1_score += entry.score;
                } else if m
                    .team2
                    .as_ref()
                    .map_or(false, |t| t.contains_user_id(entry.user_id))
                {
                    team2_score += entry.score;
                }
                // anyone else is a spectator or referee; their score is noise
            }

            let game = Game {
                team1_score,
                team2_score,
                game_id: event.id,
            };
            if m.games.contains(&game) {
                debug!(
                    "game {} already recorded for match {}, skipping",
                    event.id, m.number
                );
                continue;
            }
            m.games.push(game);
        }

        let (team1_wins, team2_wins) = m.game_wins();
        let score = format!("{team1_wins}:{team2_wins}");
        if m.score != score {
            m.score = score;
        }

        if m.winner.is_some() {
            // decided matches are never revisited
            return;
        }
        if team1_wins >= m.majority_threshold() {
            m.winner = m.team1.clone();
        } else if team2_wins >= m.majority_threshold() {
            m.winner = m.team2.clone();
        }
    }
}
