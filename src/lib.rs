use crate::models::brackets::BracketError;
use crate::models::tournament::TournamentError;
use crate::osu_api::ApiError;
use crate::service::ServiceError;
use crate::sheets::SheetsError;
use thiserror::Error;

pub mod constants;
pub mod models;
pub mod osu_api;
pub mod osu_types;
pub mod service;
pub mod sheets;
pub mod utils;

#[derive(Error, Debug)]
pub enum OsuTourneyBotError {
    #[error("Bracket error: {0}")]
    BracketError(#[from] BracketError),

    #[error("Tournament error: {0}")]
    TournamentError(#[from] TournamentError),

    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("osu! API error: {0}")]
    ApiError(#[from] ApiError),

    #[error("Sheets error: {0}")]
    SheetsError(#[from] SheetsError),
}
