pub mod brackets;
pub mod matches;
pub mod team;
pub mod tournament;
