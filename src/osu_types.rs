use serde::Deserialize;

/// subset of an osu! v2 user payload that the roster cares about
#[derive(Deserialize, Debug, Clone)]
pub struct UserProfile {
    pub username: String,
    pub avatar_url: String,
    pub country_code: String,
}

#[derive(Deserialize, Debug)]
pub struct MatchSummary {
    pub id: u64,
}

#[derive(Deserialize, Debug)]
pub struct GameScore {
    pub user_id: u64,
    pub score: i64,
}

#[derive(Deserialize, Debug)]
pub struct EventGame {
    /// empty while the game is still being played
    pub scores: Vec<GameScore>,
}

/// one entry of a multiplayer lobby's event log. Most event kinds
/// (joins, leaves, host changes) carry no game at all.
#[derive(Deserialize, Debug)]
pub struct MatchEvent {
    pub id: u64,
    pub game: Option<EventGame>,
}

#[derive(Deserialize, Debug)]
pub struct MatchInfo {
    #[serde(rename = "match")]
    pub summary: MatchSummary,
    pub events: Vec<MatchEvent>,
}
