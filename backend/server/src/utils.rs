use std::sync::LazyLock;

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use chrono::NaiveDate;
use rand::Rng;
use regex::Regex;
use tracing::warn;

use crate::error::AppError;

const INVITE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const INVITE_LENGTH: usize = 6;

static DATE_FORMAT: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$"));

/// JSON body whose rejection answers with [`AppError::MalformedPayload`].
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => {
                warn!("Rejected payload: {}", rejection.body_text());
                Err(AppError::MalformedPayload)
            }
        }
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    let invalid = || AppError::bad_request("Date must be in YYYY-MM-DD format");

    if !DATE_FORMAT
        .as_ref()
        .is_ok_and(|pattern| pattern.is_match(raw))
    {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())
}

pub fn generate_invite_code() -> String {
    let mut rng = rand::rng();

    (0..INVITE_LENGTH)
        .map(|_| INVITE_ALPHABET[rng.random_range(0..INVITE_ALPHABET.len())] as char)
        .collect()
}
