/// best-of count for a match unless set otherwise at creation
pub const DEFAULT_GAMES_AMOUNT: usize = 3;

/// members per team when a tournament is created without an explicit size
pub const DEFAULT_TEAM_LENGTH: usize = 1;

/// match scores are reported as "a:b"
pub const SCORE_FORMAT_LEN: usize = 3;

pub const DEFAULT_SCORE: &str = "0:0";
