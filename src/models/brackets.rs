use crate::models::matches::{Match, MatchManager, MatchStatus};
use crate::models::team::Team;
use crate::osu_types::MatchInfo;
use log::debug;
use serde::Serialize;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BracketError {
    #[error("Cannot seed a bracket with an odd or empty team count")]
    OddTeamCount,
    #[error("Seed {0} appeared in two pairings")]
    DuplicateSeed(usize),
    #[error("Bracket already exists")]
    BracketAlreadyExists,
    #[error("No bracket has been generated yet")]
    NoBracket,
    #[error("Match {0} already has a winner")]
    MatchAlreadyCompleted(usize),
    #[error("Match {0} does not have both teams assigned yet")]
    MatchNotReady(usize),
    #[error("Wrong winner number: {0}")]
    WrongWinnerNumber(usize),
}

/// an ordered seed -> seed mapping; order is match-number order
type SeedPairing = Vec<(usize, usize)>;

/// naive first-round list: [(1, N)], [(2, N-1)], ..., [(N/2, N/2+1)]
fn naive_pairs(team_count: usize) -> Result<VecDeque<SeedPairing>, BracketError> {
    if team_count < 2 || team_count % 2 != 0 {
        return Err(BracketError::OddTeamCount);
    }
    Ok((1..=team_count / 2)
        .map(|i| vec![(i, team_count - i + 1)])
        .collect())
}

/// appends `tail` onto `head`, rejecting any key that is already present.
/// Order is preserved; nothing is ever overwritten.
fn merge_disjoint(head: &mut SeedPairing, tail: SeedPairing) -> Result<(), BracketError> {
    for (seed1, seed2) in tail {
        if head.iter().any(|(s, _)| *s == seed1) {
            return Err(BracketError::DuplicateSeed(seed1));
        }
        head.push((seed1, seed2));
    }
    Ok(())
}

/// repeatedly merges the first and last remaining pairings until one is
/// left. Each level doubles the bracket distance between adjacent-strength
/// seeds, so seeds 1 and 2 can only meet in the final.
fn balance_pairs(mut pairs: VecDeque<SeedPairing>) -> Result<SeedPairing, BracketError> {
    while pairs.len() > 1 {
        let mut merged_level = VecDeque::with_capacity(pairs.len() / 2 + 1);
        while let Some(mut head) = pairs.pop_front() {
            if let Some(tail) = pairs.pop_back() {
                merge_disjoint(&mut head, tail)?;
            }
            merged_level.push_back(head);
        }
        pairs = merged_level;
    }
    pairs.pop_front().ok_or(BracketError::OddTeamCount)
}

/// balanced first-round seed order for `team_count` teams, 1-indexed by
/// registration order
fn balanced_seed_order(team_count: usize) -> Result<SeedPairing, BracketError> {
    balance_pairs(naive_pairs(team_count)?)
}

#[derive(Debug, Default, Serialize)]
pub struct Bracket {
    /// insertion order = generation order; never removed or reordered
    pub matches: Vec<Match>,
    /// eliminated teams; reserved for a future losers-side display
    pub losers: Vec<Team>,
}

/// Bracket-format capability. One production implementation (single
/// elimination); a double-elimination format would be a second implementor.
pub trait BracketManager {
    fn generate_bracket(&mut self, teams: &[Team]) -> Result<(), BracketError>;

    /// folds a batch of telemetry records into the bracket. Records whose
    /// match id is unknown are skipped.
    fn update_matches(&mut self, infos: &[MatchInfo]) -> Result<(), BracketError>;

    /// manual override path: decide a match by hand, bypassing any
    /// recorded games
    fn enter_match_results(
        &mut self,
        match_number: usize,
        winner_number: usize,
        score: &str,
    ) -> Result<(), BracketError>;

    /// binds a live lobby id to the first unbound match containing the
    /// given discord participant and flips it to In Progress
    fn connect_match_id(&mut self, match_id: u64, discord_id: &str) -> Result<(), BracketError>;

    fn matches(&self) -> &[Match];
}

pub struct SingleElimBracket<M: MatchManager> {
    bracket: Option<Bracket>,
    match_manager: M,
}

impl<M: MatchManager> SingleElimBracket<M> {
    pub fn new(match_manager: M) -> Self {
        Self {
            bracket: None,
            match_manager,
        }
    }

    /// copies the winner of `idx` into its successor's slot. Odd match
    /// numbers feed team1, even feed team2; this parity rule is the single
    /// source of the bracket tree's shape.
    fn propagate_winner(bracket: &mut Bracket, idx: usize) {
        let Some(m) = bracket.matches.get(idx) else {
            return;
        };
        let Some(next_idx) = m.next_match else {
            return;
        };
        let winner = m.winner.clone();
        let feeds_team1 = m.number % 2 != 0;
        let Some(next) = bracket.matches.get_mut(next_idx) else {
            return;
        };
        if feeds_team1 {
            next.team1 = winner;
        } else {
            next.team2 = winner;
        }
        // playable as soon as one slot is filled
        next.status = MatchStatus::Pending;
    }
}

impl<M: MatchManager> BracketManager for SingleElimBracket<M> {
    fn generate_bracket(&mut self, teams: &[Team]) -> Result<(), BracketError> {
        if self.bracket.is_some() {
            return Err(BracketError::BracketAlreadyExists);
        }
        // validates the team count before any mutation
        let seed_order = balanced_seed_order(teams.len())?;

        let mut bracket = Bracket::default();
        let first_round_stage = teams.len() / 2;
        for (offset, (seed1, seed2)) in seed_order.into_iter().enumerate() {
            let team1 = teams.get(seed1 - 1).cloned();
            let team2 = teams.get(seed2 - 1).cloned();
            bracket.matches.push(self.match_manager.create_match(
                first_round_stage,
                offset + 1,
                MatchStatus::Pending,
                team1,
                team2,
            ));
        }

        // later rounds are empty shells; matches i and i+1 feed the shell
        // created for them
        let mut number = teams.len() / 2 + 1;
        for i in (0..teams.len().saturating_sub(2)).step_by(2) {
            let stage = bracket.matches.get(i).map_or(1, |m| m.stage / 2);
            bracket.matches.push(self.match_manager.create_match(
                stage,
                number,
                MatchStatus::Scheduled,
                None,
                None,
            ));
            let next_idx = bracket.matches.len() - 1;
            if let Some(feeder) = bracket.matches.get_mut(i) {
                feeder.next_match = Some(next_idx);
            }
            if let Some(feeder) = bracket.matches.get_mut(i + 1) {
                feeder.next_match = Some(next_idx);
            }
            number += 1;
        }

        debug!(
            "generated {} matches for {} teams",
            bracket.matches.len(),
            teams.len()
        );
        self.bracket = Some(bracket);
        Ok(())
    }

    fn update_matches(&mut self, infos: &[MatchInfo]) -> Result<(), BracketError> {
        let bracket = self.bracket.as_mut().ok_or(BracketError::NoBracket)?;
        for info in infos {
            let Some(idx) = bracket
                .matches
                .iter()
                .position(|m| m.match_id == Some(info.summary.id))
            else {
                debug!("telemetry for unknown match id {}, ignoring", info.summary.id);
                continue;
            };
            let decided = match bracket.matches.get_mut(idx) {
                Some(m) => {
                    self.match_manager.update_match(m, info);
                    if m.winner.is_some() {
                        m.status = MatchStatus::Completed;
                        true
                    } else {
                        false
                    }
                }
                None => false,
            };
            if decided {
                Self::propagate_winner(bracket, idx);
            }
        }
        Ok(())
    }

    fn enter_match_results(
        &mut self,
        match_number: usize,
        winner_number: usize,
        score: &str,
    ) -> Result<(), BracketError> {
        let bracket = self.bracket.as_mut().ok_or(BracketError::NoBracket)?;
        let Some(idx) = bracket.matches.iter().position(|m| m.number == match_number) else {
            // the facade range-checks; number 0 legitimately matches nothing
            return Ok(());
        };
        if let Some(m) = bracket.matches.get_mut(idx) {
            if m.winner.is_some() {
                return Err(BracketError::MatchAlreadyCompleted(match_number));
            }
            let winner = match winner_number {
                1 => m.team1.clone(),
                2 => m.team2.clone(),
                n => return Err(BracketError::WrongWinnerNumber(n)),
            };
            if winner.is_none() {
                return Err(BracketError::MatchNotReady(match_number));
            }
            m.winner = winner;
            m.status = MatchStatus::Completed;
            m.score = score.to_string();
        }
        Self::propagate_winner(bracket, idx);
        Ok(())
    }

    fn connect_match_id(&mut self, match_id: u64, discord_id: &str) -> Result<(), BracketError> {
        let bracket = self.bracket.as_mut().ok_or(BracketError::NoBracket)?;
        for m in bracket.matches.iter_mut() {
            if m.team1.is_none() || m.team2.is_none() || m.match_id.is_some() {
                continue;
            }
            if m.status == MatchStatus::Completed {
                // a decided match never goes live again
                continue;
            }
            if m.contains_discord_id(discord_id) {
                debug!("binding lobby {match_id} to match {}", m.number);
                m.match_id = Some(match_id);
                m.status = MatchStatus::InProgress;
                break;
            }
        }
        Ok(())
    }

    fn matches(&self) -> &[Match] {
        self.bracket
            .as_ref()
            .map(|b| b.matches.as_slice())
            .unwrap_or(&[])
    }
}
