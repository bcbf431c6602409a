use crate::constants::SCORE_FORMAT_LEN;
use crate::models::brackets::BracketManager;
use crate::models::tournament::{TournamentError, TournamentManager};
use crate::sheets::{MatchRecord, SheetsError, TournamentSheets};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("wrong match number")]
    WrongMatchNumber(usize),
    #[error("wrong winner number")]
    WrongWinnerNumber(usize),
    #[error("wrong score format")]
    WrongScoreFormat(String),
    #[error("Tournament error: {0}")]
    TournamentError(#[from] TournamentError),
    #[error("Sheets error: {0}")]
    SheetsError(#[from] SheetsError),
}

/// The single entry point the bot layer calls. Owns one tournament cycle,
/// validates caller-supplied arguments before any engine mutation and
/// mirrors engine state out to the sheets collaborator.
pub struct TournamentService<T: TournamentManager, S: TournamentSheets> {
    tournament_manager: T,
    sheets: S,
}

impl<T: TournamentManager, S: TournamentSheets> TournamentService<T, S> {
    pub fn new(sheets: S, tournament_manager: T) -> Self {
        Self {
            tournament_manager,
            sheets,
        }
    }

    /// starts the registration phase
    pub fn create_tournament(&mut self, team_length: usize) -> Result<(), ServiceError> {
        self.tournament_manager.create_tournament(team_length)?;
        Ok(())
    }

    /// pulls fresh signups and republishes the teams sheet if the roster
    /// grew
    pub fn update_teams(&mut self) -> Result<(), ServiceError> {
        let signups = self.sheets.get_signups()?;
        let updated = self.tournament_manager.update_teams(&signups)?;
        if updated {
            let rows = self.team_rows();
            self.sheets.update_teams_sheet(&rows)?;
        }
        Ok(())
    }

    /// starts the match phase
    pub fn generate_bracket(
        &mut self,
        bracket_manager: Box<dyn BracketManager>,
    ) -> Result<(), ServiceError> {
        self.tournament_manager.generate_bracket(bracket_manager)?;
        Ok(())
    }

    /// refreshes live matches from telemetry and republishes the bracket
    /// sheet
    pub fn update_bracket(&mut self) -> Result<(), ServiceError> {
        self.tournament_manager.update_bracket()?;
        let records = self.match_records();
        self.sheets.update_bracket_sheet(&records)?;
        Ok(())
    }

    pub fn connect_match_id(
        &mut self,
        match_id: u64,
        discord_id: &str,
    ) -> Result<(), ServiceError> {
        self.tournament_manager.connect_match_id(match_id, discord_id)?;
        Ok(())
    }

    pub fn enter_match_results(
        &mut self,
        match_number: usize,
        winner_number: usize,
        score: &str,
    ) -> Result<(), ServiceError> {
        if match_number > self.tournament_manager.matches().len() {
            return Err(ServiceError::WrongMatchNumber(match_number));
        }
        if winner_number != 1 && winner_number != 2 {
            return Err(ServiceError::WrongWinnerNumber(winner_number));
        }
        if score.len() != SCORE_FORMAT_LEN {
            return Err(ServiceError::WrongScoreFormat(score.to_string()));
        }
        self.tournament_manager
            .enter_match_results(match_number, winner_number, score)?;
        Ok(())
    }

    pub fn match_records(&self) -> Vec<MatchRecord> {
        self.tournament_manager
            .matches()
            .iter()
            .map(MatchRecord::from)
            .collect()
    }

    /// teams sheet layout: a header row, then
    /// `counter, =IMAGE(avatar), country emoji, name, @discord` per team
    fn team_rows(&self) -> Vec<Vec<String>> {
        let mut rows = vec![vec![
            String::new(),
            String::new(),
            String::new(),
            "Name".to_string(),
            "Discord".to_string(),
        ]];
        for (counter, team) in self.tournament_manager.teams().iter().enumerate() {
            let Some(member) = team.members.first() else {
                continue;
            };
            rows.push(vec![
                (counter + 1).to_string(),
                format!("=IMAGE(\"{}\")", member.avatar_url),
                member.country_emoji.clone(),
                member.username.clone(),
                format!("@{}", member.discord_id),
            ]);
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::{ServiceError, TournamentService};
    use crate::models::brackets::SingleElimBracket;
    use crate::models::matches::OsuMatchManager;
    use crate::models::tournament::OsuTournament;
    use crate::osu_api::MockGameApi;
    use crate::osu_types::UserProfile;
    use crate::sheets::{MatchRecord, SheetsError, TournamentSheets};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct SheetLog {
        team_pushes: Vec<Vec<Vec<String>>>,
        bracket_pushes: usize,
    }

    struct FakeSheets {
        signups: Vec<Vec<String>>,
        log: Rc<RefCell<SheetLog>>,
    }

    impl TournamentSheets for FakeSheets {
        fn get_signups(&self) -> Result<Vec<Vec<String>>, SheetsError> {
            Ok(self.signups.clone())
        }

        fn update_teams_sheet(&mut self, rows: &[Vec<String>]) -> Result<(), SheetsError> {
            self.log.borrow_mut().team_pushes.push(rows.to_vec());
            Ok(())
        }

        fn update_bracket_sheet(&mut self, _matches: &[MatchRecord]) -> Result<(), SheetsError> {
            self.log.borrow_mut().bracket_pushes += 1;
            Ok(())
        }
    }

    fn signup(user_id: u64) -> Vec<String> {
        vec![
            "ts".to_string(),
            user_id.to_string(),
            format!("d{user_id}"),
        ]
    }

    fn service(
        signups: Vec<Vec<String>>,
    ) -> (
        TournamentService<OsuTournament<MockGameApi>, FakeSheets>,
        Rc<RefCell<SheetLog>>,
    ) {
        let mut api = MockGameApi::new();
        api.expect_get_user_info().returning(|user_id| {
            Ok(UserProfile {
                username: format!("player{user_id}"),
                avatar_url: format!("https://a.ppy.sh/{user_id}"),
                country_code: "US".to_string(),
            })
        });
        let log = Rc::new(RefCell::new(SheetLog::default()));
        let sheets = FakeSheets {
            signups,
            log: log.clone(),
        };
        (
            TournamentService::new(sheets, OsuTournament::new(api)),
            log,
        )
    }

    fn bracket_service() -> TournamentService<OsuTournament<MockGameApi>, FakeSheets> {
        let (mut svc, _log) = service(vec![signup(1), signup(2), signup(3), signup(4)]);
        svc.create_tournament(1).unwrap();
        svc.update_teams().unwrap();
        svc.generate_bracket(Box::new(SingleElimBracket::new(OsuMatchManager)))
            .unwrap();
        svc
    }

    #[test]
    fn test_update_teams_pushes_sheet_rows() {
        let (mut svc, log) = service(vec![signup(1), signup(2)]);
        svc.create_tournament(1).unwrap();
        svc.update_teams().unwrap();

        let log = log.borrow();
        assert_eq!(1, log.team_pushes.len());
        let rows = &log.team_pushes[0];
        assert_eq!(3, rows.len());
        assert_eq!(vec!["", "", "", "Name", "Discord"], rows[0]);
        assert_eq!(
            vec![
                "1",
                "=IMAGE(\"https://a.ppy.sh/1\")",
                "🇺🇸",
                "player1",
                "@d1"
            ],
            rows[1]
        );
    }

    #[test]
    fn test_update_teams_skips_push_without_growth() {
        let (mut svc, log) = service(vec![signup(1)]);
        svc.create_tournament(1).unwrap();
        svc.update_teams().unwrap();
        // same signups again: roster unchanged, sheet untouched
        svc.update_teams().unwrap();
        assert_eq!(1, log.borrow().team_pushes.len());
    }

    #[test]
    fn test_enter_match_results_out_of_range() {
        let mut svc = bracket_service();
        assert!(matches!(
            svc.enter_match_results(99, 1, "2:0"),
            Err(ServiceError::WrongMatchNumber(99))
        ));
        // rejected call must not have touched any match
        assert!(svc.match_records().iter().all(|m| m.winner.is_none()));
    }

    #[test]
    fn test_enter_match_results_bad_winner_and_score() {
        let mut svc = bracket_service();
        assert!(matches!(
            svc.enter_match_results(1, 3, "2:0"),
            Err(ServiceError::WrongWinnerNumber(3))
        ));
        assert!(matches!(
            svc.enter_match_results(1, 1, "2-0-1"),
            Err(ServiceError::WrongScoreFormat(_))
        ));
        assert!(svc.match_records().iter().all(|m| m.winner.is_none()));
    }

    #[test]
    fn test_enter_match_results_happy_path() {
        let mut svc = bracket_service();
        svc.enter_match_results(1, 2, "0:2").unwrap();
        let records = svc.match_records();
        assert_eq!("0:2", records[0].score);
        assert_eq!(
            "player4",
            records[0].winner.as_ref().unwrap().name
        );
        assert_eq!(
            "player4",
            records[2].team1.as_ref().unwrap().name
        );
    }
}
