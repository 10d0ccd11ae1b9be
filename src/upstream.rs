use std::time::Duration;

use reqwest::Client;
use rocket::serde::Deserialize;
use rocket::serde::json::Value;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::utils::strip_uuid_dashes;

#[derive(Debug, Clone, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct MojangProfile {
	pub id: String,
	pub name: String,
}

/*
 * Cliente para las dos APIs de afuera: Mojang (nombres/uuid) y Hypixel (stats).
 * Un solo reqwest::Client para todo el proceso, se arma al despegar Rocket.
 */
pub struct Upstream {
	client: Client,
	mojang_api: String,
	session_api: String,
	hypixel_api: String,
}

impl Upstream {
	pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
		let client = Client::builder()
			.timeout(Duration::from_secs(config.request_timeout_secs))
			.user_agent(concat!("hypixel-proxy/", env!("CARGO_PKG_VERSION")))
			.build()?;

		Ok(Upstream {
			client,
			mojang_api: config.mojang_api.trim_end_matches('/').to_string(),
			session_api: config.session_api.trim_end_matches('/').to_string(),
			hypixel_api: config.hypixel_api.trim_end_matches('/').to_string(),
		})
	}

	pub async fn uuid_for_username(&self, username: &str) -> Result<MojangProfile, ApiError> {
		let url = format!("{}/users/profiles/minecraft/{}", self.mojang_api, username);
		log::debug!("Mojang lookup for username {}", username);

		let response = self.client.get(&url).send().await?;
		check_mojang_status(response.status().as_u16(), MojangLookup::ByUsername)?;
		Ok(response.json::<MojangProfile>().await?)
	}

	pub async fn username_for_uuid(&self, uuid: &str) -> Result<String, ApiError> {
		let uuid = strip_uuid_dashes(uuid);
		let url = format!("{}/session/minecraft/profile/{}", self.session_api, uuid);
		log::debug!("Mojang lookup for uuid {}", uuid);

		let response = self.client.get(&url).send().await?;
		check_mojang_status(response.status().as_u16(), MojangLookup::ByUuid)?;
		let body: Value = response.json().await?;
		Ok(body.get("name").and_then(Value::as_str).unwrap_or("not found").to_string())
	}

	pub async fn player(&self, uuid: &str, api_key: &str) -> Result<Value, ApiError> {
		self.hypixel_get("/v2/player", ("uuid", uuid), api_key).await
	}

	pub async fn guild_for_player(&self, uuid: &str, api_key: &str) -> Result<Value, ApiError> {
		self.hypixel_get("/v2/guild", ("player", uuid), api_key).await
	}

	async fn hypixel_get(&self, path: &str, query: (&str, &str), api_key: &str) -> Result<Value, ApiError> {
		let url = format!("{}{}", self.hypixel_api, path);
		log::debug!("Hypixel request {}?{}={}", path, query.0, query.1);

		let response = self
			.client
			.get(&url)
			.query(&[query])
			.header("API-Key", api_key)
			.send()
			.await?;

		let status = response.status().as_u16();
		// En los errores Hypixel igual manda JSON, pero si no es JSON nos quedamos con el status
		let body = response.json::<Value>().await.unwrap_or(Value::Null);
		check_hypixel_response(status, &body)?;
		Ok(body)
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MojangLookup {
	ByUsername,
	ByUuid,
}

pub fn check_mojang_status(status: u16, lookup: MojangLookup) -> Result<(), ApiError> {
	match (status, lookup) {
		(200, _) => Ok(()),
		(204 | 404, _) => Err(ApiError::NotFound("Player not found")),
		(400, MojangLookup::ByUuid) => Err(ApiError::InvalidUuid("Invalid UUID format")),
		(400, MojangLookup::ByUsername) => Err(ApiError::NotFound("Player not found")),
		_ => Err(ApiError::Upstream("Mojang API error")),
	}
}

pub fn check_hypixel_response(status: u16, body: &Value) -> Result<(), ApiError> {
	let failed = body.get("success").and_then(Value::as_bool) == Some(false);
	let cause = body.get("cause").and_then(Value::as_str);

	if status == 401 || status == 403 || (failed && cause == Some("Invalid API key")) {
		return Err(ApiError::InvalidApiKey);
	}
	if status == 422 || (failed && cause == Some("Malformed UUID")) {
		return Err(ApiError::InvalidUuid("Invalid UUID"));
	}
	if status != 200 || body.is_null() {
		return Err(ApiError::Upstream("Hypixel API error"));
	}
	Ok(())
}
