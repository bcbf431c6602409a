use crate::models::matches::{Game, Match, MatchStatus};
use crate::models::team::Team;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Sheets backend error: {0}")]
    Backend(String),
}

/// The presentation seam. A production implementation talks to a
/// spreadsheet backend; the engine only hands it flat records.
pub trait TournamentSheets {
    /// ordered signup rows, header already stripped:
    /// `[timestamp, user id, discord id, user id, discord id, ...]`
    fn get_signups(&self) -> Result<Vec<Vec<String>>, SheetsError>;

    fn update_teams_sheet(&mut self, rows: &[Vec<String>]) -> Result<(), SheetsError>;

    fn update_bracket_sheet(&mut self, matches: &[MatchRecord]) -> Result<(), SheetsError>;
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MemberRecord {
    pub username: String,
    pub user_id: u64,
    pub discord_id: String,
    pub avatar_url: String,
    pub country_emoji: String,
}

/// a team expanded to plain fields for display
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TeamRecord {
    pub name: String,
    pub avatar_url: String,
    pub country_emoji: String,
    pub members: Vec<MemberRecord>,
}

impl From<&Team> for TeamRecord {
    fn from(team: &Team) -> Self {
        Self {
            name: team.name.clone(),
            avatar_url: team.avatar_url.clone(),
            country_emoji: team.country_emoji.clone(),
            members: team
                .members
                .iter()
                .map(|m| MemberRecord {
                    username: m.username.clone(),
                    user_id: m.user_id,
                    discord_id: m.discord_id.clone(),
                    avatar_url: m.avatar_url.clone(),
                    country_emoji: m.country_emoji.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GameRecord {
    pub team1_score: i64,
    pub team2_score: i64,
    pub game_id: u64,
}

impl From<&Game> for GameRecord {
    fn from(game: &Game) -> Self {
        Self {
            team1_score: game.team1_score,
            team2_score: game.team2_score,
            game_id: game.game_id,
        }
    }
}

/// every Match field, nested teams expanded; what the bracket sheet
/// renders from
#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    pub stage: usize,
    pub number: usize,
    pub status: MatchStatus,
    pub team1: Option<TeamRecord>,
    pub team2: Option<TeamRecord>,
    pub winner: Option<TeamRecord>,
    pub score: String,
    pub match_id: Option<u64>,
    pub next_match: Option<usize>,
    pub games: Vec<GameRecord>,
    pub games_amount: usize,
}

impl From<&Match> for MatchRecord {
    fn from(m: &Match) -> Self {
        Self {
            stage: m.stage,
            number: m.number,
            status: m.status,
            team1: m.team1.as_ref().map(TeamRecord::from),
            team2: m.team2.as_ref().map(TeamRecord::from),
            winner: m.winner.as_ref().map(TeamRecord::from),
            score: m.score.clone(),
            match_id: m.match_id,
            next_match: m.next_match,
            games: m.games.iter().map(GameRecord::from).collect(),
            games_amount: m.games_amount,
        }
    }
}
