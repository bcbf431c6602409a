use crate::models::brackets::{BracketError, BracketManager};
use crate::models::matches::{Match, MatchStatus};
use crate::models::team::{Team, TeamMember};
use crate::osu_api::{ApiError, GameApi};
use crate::utils::country_emoji;
use itertools::Itertools;
use log::{debug, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament already exists")]
    TournamentAlreadyExists,
    #[error("No tournament has been created yet")]
    NoTournament,
    #[error("No bracket has been generated yet")]
    NoBracket,
    #[error("Bracket error: {0}")]
    BracketError(#[from] BracketError),
    #[error("osu! API error: {0}")]
    ApiError(#[from] ApiError),
}

#[derive(Debug, Default)]
pub struct Tournament {
    /// members per team, fixed at creation
    pub team_length: usize,
    /// insertion order = registration order = seed order
    pub teams: Vec<Team>,
}

/// Roster-lifecycle capability: signup parsing, bracket coordination,
/// telemetry refresh. One production implementation.
pub trait TournamentManager {
    fn create_tournament(&mut self, team_length: usize) -> Result<(), TournamentError>;

    /// folds signup rows into the roster; returns whether any team was
    /// added
    fn update_teams(&mut self, signups: &[Vec<String>]) -> Result<bool, TournamentError>;

    /// binds the given bracket format and generates from the current
    /// roster
    fn generate_bracket(
        &mut self,
        bracket_manager: Box<dyn BracketManager>,
    ) -> Result<(), TournamentError>;

    /// refreshes every live match from the game API; returns whether any
    /// match was eligible this cycle
    fn update_bracket(&mut self) -> Result<bool, TournamentError>;

    fn enter_match_results(
        &mut self,
        match_number: usize,
        winner_number: usize,
        score: &str,
    ) -> Result<(), TournamentError>;

    fn connect_match_id(&mut self, match_id: u64, discord_id: &str)
        -> Result<(), TournamentError>;

    fn teams(&self) -> &[Team];

    fn matches(&self) -> &[Match];
}

pub struct OsuTournament<C: GameApi> {
    api: C,
    tournament: Option<Tournament>,
    bracket_manager: Option<Box<dyn BracketManager>>,
}

impl<C: GameApi> OsuTournament<C> {
    pub fn new(api: C) -> Self {
        Self {
            api,
            tournament: None,
            bracket_manager: None,
        }
    }
}

impl<C: GameApi> TournamentManager for OsuTournament<C> {
    fn create_tournament(&mut self, team_length: usize) -> Result<(), TournamentError> {
        if self.tournament.is_some() {
            return Err(TournamentError::TournamentAlreadyExists);
        }
        self.tournament = Some(Tournament {
            team_length,
            teams: vec![],
        });
        Ok(())
    }

    fn update_teams(&mut self, signups: &[Vec<String>]) -> Result<bool, TournamentError> {
        let tournament = self.tournament.as_mut().ok_or(TournamentError::NoTournament)?;
        let mut updated = false;

        'rows: for row in signups {
            // column 0 is the form timestamp; the rest is
            // (user id, discord id) pairs, one per member
            let mut members: Vec<TeamMember> = Vec::with_capacity(tournament.team_length);
            for (user_id, discord_id) in
                row.iter().skip(1).tuples().take(tournament.team_length)
            {
                let Ok(user_id) = user_id.parse::<u64>() else {
                    warn!("signup row with unparseable user id {user_id:?}, dropping row");
                    continue 'rows;
                };
                let profile = self.api.get_user_info(user_id)?;
                let member = TeamMember {
                    username: profile.username,
                    user_id,
                    discord_id: discord_id.clone(),
                    avatar_url: profile.avatar_url,
                    country_emoji: country_emoji(&profile.country_code),
                };
                if tournament.teams.iter().any(|t| t.contains_member(&member)) {
                    // whole-row rejection; members already resolved for
                    // this row are discarded with it
                    break;
                }
                members.push(member);
            }

            if members.len() != tournament.team_length {
                if !members.is_empty() {
                    warn!(
                        "dropping signup row: {} of {} members accepted",
                        members.len(),
                        tournament.team_length
                    );
                }
                continue;
            }

            let Some(team) = Team::new(members) else {
                continue;
            };
            debug!("registered team {:?}", team.name);
            tournament.teams.push(team);
            updated = true;
        }
        Ok(updated)
    }

    fn generate_bracket(
        &mut self,
        mut bracket_manager: Box<dyn BracketManager>,
    ) -> Result<(), TournamentError> {
        let tournament = self.tournament.as_ref().ok_or(TournamentError::NoTournament)?;
        bracket_manager.generate_bracket(&tournament.teams)?;
        self.bracket_manager = Some(bracket_manager);
        Ok(())
    }

    fn update_bracket(&mut self) -> Result<bool, TournamentError> {
        let bracket_manager = self
            .bracket_manager
            .as_mut()
            .ok_or(TournamentError::NoBracket)?;

        let mut infos = Vec::new();
        for m in bracket_manager.matches() {
            match (m.status, m.match_id) {
                (MatchStatus::Completed | MatchStatus::Scheduled, _) => continue,
                (MatchStatus::Pending, None) => continue,
                (_, Some(match_id)) => infos.push(self.api.get_match_info(match_id)?),
                // In Progress implies a bound lobby id
                (_, None) => continue,
            }
        }

        if infos.is_empty() {
            return Ok(false);
        }
        bracket_manager.update_matches(&infos)?;
        Ok(true)
    }

    fn enter_match_results(
        &mut self,
        match_number: usize,
        winner_number: usize,
        score: &str,
    ) -> Result<(), TournamentError> {
        let bracket_manager = self
            .bracket_manager
            .as_mut()
            .ok_or(TournamentError::NoBracket)?;
        bracket_manager.enter_match_results(match_number, winner_number, score)?;
        Ok(())
    }

    fn connect_match_id(
        &mut self,
        match_id: u64,
        discord_id: &str,
    ) -> Result<(), TournamentError> {
        let bracket_manager = self
            .bracket_manager
            .as_mut()
            .ok_or(TournamentError::NoBracket)?;
        bracket_manager.connect_match_id(match_id, discord_id)?;
        Ok(())
    }

    fn teams(&self) -> &[Team] {
        self.tournament
            .as_ref()
            .map(|t| t.teams.as_slice())
            .unwrap_or(&[])
    }

    fn matches(&self) -> &[Match] {
        self.bracket_manager
            .as_ref()
            .map(|b| b.matches())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::{OsuTournament, TournamentError, TournamentManager};
    use crate::models::brackets::SingleElimBracket;
    use crate::models::matches::{MatchStatus, OsuMatchManager};
    use crate::osu_api::MockGameApi;
    use crate::osu_types::{EventGame, GameScore, MatchEvent, MatchInfo, MatchSummary, UserProfile};

    fn profile(user_id: u64) -> UserProfile {
        UserProfile {
            username: format!("player{user_id}"),
            avatar_url: format!("https://a.ppy.sh/{user_id}"),
            country_code: "US".to_string(),
        }
    }

    fn signup(user_id: u64) -> Vec<String> {
        vec![
            "2024-01-01 10:00:00".to_string(),
            user_id.to_string(),
            format!("d{user_id}"),
        ]
    }

    fn solo_tournament(api: MockGameApi) -> OsuTournament<MockGameApi> {
        let mut t = OsuTournament::new(api);
        t.create_tournament(1).unwrap();
        t
    }

    #[test]
    fn test_duplicate_tournament_rejected() {
        let mut t = solo_tournament(MockGameApi::new());
        assert!(matches!(
            t.create_tournament(1),
            Err(TournamentError::TournamentAlreadyExists)
        ));
    }

    #[test]
    fn test_update_teams_registers_and_resolves_profiles() {
        let mut api = MockGameApi::new();
        api.expect_get_user_info()
            .returning(|user_id| Ok(profile(user_id)));
        let mut t = solo_tournament(api);

        let updated = t.update_teams(&[signup(1), signup(2)]).unwrap();
        assert!(updated);
        let teams = t.teams();
        assert_eq!(2, teams.len());
        assert_eq!("player1", teams[0].name);
        assert_eq!("🇺🇸", teams[0].country_emoji);
        assert_eq!("d2", teams[1].members[0].discord_id);
    }

    #[test]
    fn test_resubmitted_row_is_rejected_whole() {
        let mut api = MockGameApi::new();
        api.expect_get_user_info()
            .returning(|user_id| Ok(profile(user_id)));
        let mut t = solo_tournament(api);

        assert!(t.update_teams(&[signup(1)]).unwrap());
        assert!(!t.update_teams(&[signup(1)]).unwrap());
        assert_eq!(1, t.teams().len());
    }

    #[test]
    fn test_underfilled_row_dropped() {
        let mut api = MockGameApi::new();
        api.expect_get_user_info()
            .returning(|user_id| Ok(profile(user_id)));
        let mut t = OsuTournament::new(api);
        t.create_tournament(2).unwrap();

        // only one member's worth of columns for a two-member team
        let row = vec!["ts".to_string(), "1".to_string(), "d1".to_string()];
        assert!(!t.update_teams(&[row]).unwrap());
        assert!(t.teams().is_empty());
    }

    #[test]
    fn test_duos_parse_with_fixed_stride() {
        let mut api = MockGameApi::new();
        api.expect_get_user_info()
            .returning(|user_id| Ok(profile(user_id)));
        let mut t = OsuTournament::new(api);
        t.create_tournament(2).unwrap();

        let row = vec![
            "ts".to_string(),
            "1".to_string(),
            "d1".to_string(),
            "2".to_string(),
            "d2".to_string(),
        ];
        assert!(t.update_teams(&[row]).unwrap());
        let teams = t.teams();
        assert_eq!(1, teams.len());
        assert_eq!(2, teams[0].members.len());
        // the team borrows the first member's display identity
        assert_eq!("player1", teams[0].name);
    }

    #[test]
    fn test_member_collision_aborts_whole_row() {
        let mut api = MockGameApi::new();
        api.expect_get_user_info()
            .returning(|user_id| Ok(profile(user_id)));
        let mut t = OsuTournament::new(api);
        t.create_tournament(2).unwrap();

        let first = vec![
            "ts".to_string(),
            "1".to_string(),
            "d1".to_string(),
            "2".to_string(),
            "d2".to_string(),
        ];
        assert!(t.update_teams(&[first]).unwrap());

        // fresh partner, but member 2 is already rostered
        let second = vec![
            "ts".to_string(),
            "3".to_string(),
            "d3".to_string(),
            "2".to_string(),
            "d2".to_string(),
        ];
        assert!(!t.update_teams(&[second]).unwrap());
        assert_eq!(1, t.teams().len());
    }

    #[test]
    fn test_update_teams_requires_tournament() {
        let mut t = OsuTournament::new(MockGameApi::new());
        assert!(matches!(
            t.update_teams(&[signup(1)]),
            Err(TournamentError::NoTournament)
        ));
    }

    #[test]
    fn test_update_bracket_fetches_only_live_matches() {
        let mut api = MockGameApi::new();
        api.expect_get_user_info()
            .returning(|user_id| Ok(profile(user_id)));
        api.expect_get_match_info().times(1).returning(|match_id| {
            Ok(MatchInfo {
                summary: MatchSummary { id: match_id },
                events: vec![
                    MatchEvent {
                        id: 1,
                        game: Some(EventGame {
                            scores: vec![
                                GameScore {
                                    user_id: 1,
                                    score: 100,
                                },
                                GameScore {
                                    user_id: 4,
                                    score: 50,
                                },
                            ],
                        }),
                    },
                    MatchEvent {
                        id: 2,
                        game: Some(EventGame {
                            scores: vec![
                                GameScore {
                                    user_id: 1,
                                    score: 100,
                                },
                                GameScore {
                                    user_id: 4,
                                    score: 50,
                                },
                            ],
                        }),
                    },
                ],
            })
        });
        let mut t = solo_tournament(api);
        t.update_teams(&[signup(1), signup(2), signup(3), signup(4)])
            .unwrap();
        t.generate_bracket(Box::new(SingleElimBracket::new(OsuMatchManager)))
            .unwrap();

        // nothing live yet; no fetches happen and nothing was eligible
        assert!(!t.update_bracket().unwrap());

        t.connect_match_id(555, "d1").unwrap();
        assert!(t.update_bracket().unwrap());

        let matches = t.matches();
        assert_eq!(MatchStatus::Completed, matches[0].status);
        assert_eq!("2:0", matches[0].score);
        assert_eq!("player1", matches[2].team1.as_ref().unwrap().name);

        // completed matches drop out of the refresh set again
        assert!(!t.update_bracket().unwrap());
    }

    #[test]
    fn test_bracket_operations_require_bracket() {
        let mut t = solo_tournament(MockGameApi::new());
        assert!(matches!(
            t.update_bracket(),
            Err(TournamentError::NoBracket)
        ));
        assert!(matches!(
            t.enter_match_results(1, 1, "2:0"),
            Err(TournamentError::NoBracket)
        ));
        assert!(matches!(
            t.connect_match_id(1, "d1"),
            Err(TournamentError::NoBracket)
        ));
        assert!(t.matches().is_empty());
    }
}
