use rocket::serde::Deserialize;

use crate::error::ApiError;

/*
 * Configuracion que se saca del figment de Rocket (Rocket.toml o variables ROCKET_*),
 * por ejemplo ROCKET_HYPIXEL_API_KEY=... para no tener que mandar la key en cada request
 */
#[derive(Debug, Clone, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct AppConfig {
	#[serde(default = "default_mojang_api")]
	pub mojang_api: String,
	#[serde(default = "default_session_api")]
	pub session_api: String,
	#[serde(default = "default_hypixel_api")]
	pub hypixel_api: String,
	#[serde(default)]
	pub hypixel_api_key: Option<String>,
	#[serde(default = "default_timeout")]
	pub request_timeout_secs: u64,
	#[serde(default = "default_concurrency")]
	pub member_lookup_concurrency: usize,
}

fn default_mojang_api() -> String {
	"https://api.mojang.com".to_string()
}

fn default_session_api() -> String {
	"https://sessionserver.mojang.com".to_string()
}

fn default_hypixel_api() -> String {
	"https://api.hypixel.net".to_string()
}

fn default_timeout() -> u64 {
	10
}

fn default_concurrency() -> usize {
	8
}

impl Default for AppConfig {
	fn default() -> Self {
		AppConfig {
			mojang_api: default_mojang_api(),
			session_api: default_session_api(),
			hypixel_api: default_hypixel_api(),
			hypixel_api_key: None,
			request_timeout_secs: default_timeout(),
			member_lookup_concurrency: default_concurrency(),
		}
	}
}

impl AppConfig {
	/// La key del query gana, si no viene se usa la configurada. Vacia cuenta como que no hay.
	pub fn resolve_api_key(&self, from_query: Option<String>) -> Result<String, ApiError> {
		from_query
			.filter(|key| !key.trim().is_empty())
			.or_else(|| self.hypixel_api_key.clone().filter(|key| !key.trim().is_empty()))
			.ok_or(ApiError::MissingApiKey)
	}
}
