use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use serde::Deserialize;

use crate::types::Verdict;

/// What a successful (2xx) prediction response turned out to contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictResponse {
    Results(Vec<Verdict>),
    NoData,
}

#[derive(Deserialize)]
struct Envelope {
    results: Option<Vec<Verdict>>,
}

/// Reads a 2xx response body. Anything without a usable `results` array is `NoData`, never an error.
pub fn parse_predict_response(body: &str) -> PredictResponse {
    match serde_json::from_str::<Envelope>(body) {
        Ok(Envelope {
            results: Some(results),
        }) => PredictResponse::Results(results),
        Ok(Envelope { results: None }) => {
            tracing::debug!("Prediction response has no results field");
            PredictResponse::NoData
        }
        Err(e) => {
            tracing::debug!(error = %e, "Prediction response is not a results object");
            PredictResponse::NoData
        }
    }
}

pub fn format_created_at<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%H:%M:%S %d/%m/%Y").to_string()
}
