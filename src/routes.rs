use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use rocket::response::Redirect;
use rocket::serde::json::{Json, Value};
use rocket::{Request, State, catch, get, uri};

use crate::config::AppConfig;
use crate::error::{ApiError, ErrorBody};
use crate::leveling::LevelSystem;
use crate::models::{
	BedwarsData, Envelope, GuildData, GuildView, PlayerProfileData, PlayerUuidData, bedwars_experience, bedwars_stats,
	guild_member_uuids, player_document,
};
use crate::upstream::Upstream;
use crate::utils::strip_uuid_dashes;

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

#[get("/")]
pub fn index() -> Redirect {
	Redirect::to(uri!(health))
}

#[get("/health")]
pub fn health() -> Json<Value> {
	Json(rocket::serde::json::json!({ "status": "healthy" }))
}

//API - nombre de usuario a uuid
#[get("/api/uuid/<username>")]
pub async fn player_uuid(username: &str, upstream: &State<Upstream>) -> ApiResult<PlayerUuidData> {
	let profile = upstream.uuid_for_username(username).await?;

	Ok(Json(Envelope::ok(PlayerUuidData { uuid: profile.id, username: profile.name })))
}

//API - perfil general de Hypixel
#[get("/api/profile/<uuid>?<api_key>")]
pub async fn player_profile(
	uuid: &str,
	api_key: Option<String>,
	upstream: &State<Upstream>,
	config: &State<AppConfig>,
) -> ApiResult<PlayerProfileData> {
	let uuid = strip_uuid_dashes(uuid);
	let api_key = config.resolve_api_key(api_key)?;

	let body = upstream.player(&uuid, &api_key).await?;
	let player = player_document(&body)?;
	let username = upstream.username_for_uuid(&uuid).await?;

	Ok(Json(Envelope::ok(PlayerProfileData::build(&uuid, username, player))))
}

//API - gremio del jugador, con los nombres de todos los miembros
#[get("/api/guild/<uuid>?<api_key>")]
pub async fn player_guild(
	uuid: &str,
	api_key: Option<String>,
	upstream: &State<Upstream>,
	config: &State<AppConfig>,
) -> ApiResult<GuildView> {
	let uuid = strip_uuid_dashes(uuid);
	let api_key = config.resolve_api_key(api_key)?;

	let body = upstream.guild_for_player(&uuid, &api_key).await?;
	let guild = match body.get("guild") {
		Some(guild) if !guild.is_null() => guild,
		_ => return Ok(Json(Envelope::ok(GuildView::NotInGuild { in_guild: false }))),
	};

	let username = upstream.username_for_uuid(&uuid).await?;
	let member_uuids = guild_member_uuids(guild);
	log::info!("Resolving {} guild member names for {}", member_uuids.len(), uuid);

	/*
	 * Los nombres se buscan en paralelo pero con un tope (member_lookup_concurrency),
	 * un gremio tiene hasta 125 miembros y Mojang limita las peticiones
	 */
	let upstream = upstream.inner();
	let names: HashMap<String, String> = stream::iter(member_uuids)
		.map(|member| async move {
			let name = match upstream.username_for_uuid(&member).await {
				Ok(name) => name,
				Err(err) => {
					log::warn!("Could not resolve guild member {}: {}", member, err);
					"Unknown".to_string()
				}
			};
			(member, name)
		})
		.buffer_unordered(config.member_lookup_concurrency.max(1))
		.collect()
		.await;

	let data = GuildData::build(&uuid, username, guild, &names);
	Ok(Json(Envelope::ok(GuildView::Member(Box::new(data)))))
}

//API - BedWars, aqui se usa el sistema de niveles
#[get("/api/bedwars/<uuid>?<api_key>")]
pub async fn player_bedwars(
	uuid: &str,
	api_key: Option<String>,
	upstream: &State<Upstream>,
	config: &State<AppConfig>,
) -> ApiResult<BedwarsData> {
	let uuid = strip_uuid_dashes(uuid);
	let api_key = config.resolve_api_key(api_key)?;

	let body = upstream.player(&uuid, &api_key).await?;
	let player = player_document(&body)?;
	let stats = bedwars_stats(player);

	let info = LevelSystem.level_info(bedwars_experience(&stats))?;
	log::info!("BedWars level for {}: {} (prestige {})", uuid, info.level, info.prestige);

	let username = upstream.username_for_uuid(&uuid).await?;
	Ok(Json(Envelope::ok(BedwarsData::build(&uuid, username, &stats, info))))
}

#[catch(404)]
pub fn not_found() -> Json<ErrorBody> {
	Json(ErrorBody { detail: "Not Found".to_string() })
}

// Query invalida, por ejemplo un api_key repetido
#[catch(422)]
pub fn unprocessable(request: &Request<'_>) -> Json<ErrorBody> {
	log::warn!("Unprocessable request {}", request.uri());
	Json(ErrorBody { detail: "Unprocessable request".to_string() })
}

#[catch(500)]
pub fn internal_error() -> Json<ErrorBody> {
	Json(ErrorBody { detail: "Internal Server Error".to_string() })
}
