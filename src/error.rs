use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, status::Custom};
use rocket::serde::{Serialize, json::Json};
use thiserror::Error;

use crate::leveling::LevelError;

// Todas las respuestas de error tienen la misma forma: {"detail": "..."}
#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorBody {
	pub detail: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
	#[error("{0}")]
	NotFound(&'static str),
	#[error("Missing API key")]
	MissingApiKey,
	#[error("Invalid API key")]
	InvalidApiKey,
	#[error("{0}")]
	InvalidUuid(&'static str),
	#[error("{0}")]
	Upstream(&'static str),
	#[error("upstream request failed: {0}")]
	Transport(#[from] reqwest::Error),
	#[error(transparent)]
	Level(#[from] LevelError),
}

impl ApiError {
	pub fn status(&self) -> Status {
		match self {
			ApiError::NotFound(_) => Status::NotFound,
			ApiError::MissingApiKey | ApiError::InvalidApiKey => Status::Unauthorized,
			ApiError::InvalidUuid(_) => Status::UnprocessableEntity,
			ApiError::Upstream(_) | ApiError::Transport(_) => Status::InternalServerError,
			ApiError::Level(LevelError::NegativeExperience(_)) => Status::BadGateway,
			ApiError::Level(_) => Status::InternalServerError,
		}
	}

	// Lo que ve el cliente, sin detalles internos de reqwest
	pub fn detail(&self) -> String {
		match self {
			ApiError::Transport(_) => "Upstream request failed".to_string(),
			ApiError::Level(LevelError::NegativeExperience(_)) => {
				"Hypixel API returned invalid BedWars experience".to_string()
			}
			other => other.to_string(),
		}
	}
}

impl<'r> Responder<'r, 'static> for ApiError {
	fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
		let status = self.status();
		if status.code >= 500 {
			log::error!("{} {} failed: {}", request.method(), request.uri(), self);
		} else {
			log::warn!("{} {} rejected: {}", request.method(), request.uri(), self);
		}

		Custom(status, Json(ErrorBody { detail: self.detail() })).respond_to(request)
	}
}
