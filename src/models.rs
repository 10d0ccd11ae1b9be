use std::collections::HashMap;

use rocket::serde::json::Value;
use rocket::serde::ser::SerializeMap;
use rocket::serde::{Serialize, Serializer};

use crate::error::ApiError;
use crate::leveling::{LevelInfo, network_level};
use crate::utils::{as_int, format_timestamp, int_field, player_rank, ratio, str_field};

// Tope de tickets de slumber, Hypixel no lo manda en el documento
pub const SLUMBER_TICKETS_MAX: i64 = 100_000;

// Envoltorio de todas las respuestas buenas: {"success": true, "data": {...}}
#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Envelope<T> {
	pub success: bool,
	pub data: T,
}

impl<T> Envelope<T> {
	pub fn ok(data: T) -> Self {
		Envelope { success: true, data }
	}
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PlayerUuidData {
	pub uuid: String,
	pub username: String,
}

/// Saca el objeto `player` de la respuesta de /v2/player, o 404 si no esta
pub fn player_document(body: &Value) -> Result<&Value, ApiError> {
	if body.get("success").and_then(Value::as_bool) != Some(true) {
		return Err(ApiError::NotFound("Player not found"));
	}

	match body.get("player") {
		Some(player) if player.as_object().is_some_and(|p| !p.is_empty()) => Ok(player),
		_ => Err(ApiError::NotFound("Player data not found")),
	}
}

/*
 * Perfil
 */

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PlayerImages {
	pub full_skin_image: String,
	#[serde(rename = "3d_head_image")]
	pub three_d_head_image: String,
	#[serde(rename = "2d_head_image")]
	pub two_d_head_image: String,
	pub network_level_image: String,
}

impl PlayerImages {
	fn new(uuid: &str, username: &str) -> Self {
		PlayerImages {
			full_skin_image: format!("https://crafatar.com/renders/body/{}", uuid),
			three_d_head_image: format!("https://crafatar.com/renders/head/{}", uuid),
			two_d_head_image: format!("https://crafatar.com/avatars/{}", uuid),
			network_level_image: format!("https://gen.plancke.io/exp/{}.png", username),
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PlayerProfileData {
	pub uuid: String,
	pub username: String,
	pub rank: String,
	pub first_login: i64,
	pub first_login_pretty: String,
	pub last_login: i64,
	pub last_login_pretty: String,
	pub last_logout: i64,
	pub last_logout_pretty: String,
	pub exp: i64,
	pub network_level: f64,
	pub karma: i64,
	pub achievement_points: i64,
	pub total_rewards: i64,
	pub total_daily_rewards: i64,
	pub reward_streak: i64,
	pub reward_score: i64,
	pub reward_high_score: i64,
	pub most_recent_game: String,
	pub online: bool,
	pub images: PlayerImages,
}

impl PlayerProfileData {
	pub fn build(uuid: &str, username: String, player: &Value) -> Self {
		let first_login = int_field(player, "firstLogin");
		let last_login = int_field(player, "lastLogin");
		let last_logout = int_field(player, "lastLogout");
		let exp = int_field(player, "networkExp");

		PlayerProfileData {
			uuid: uuid.to_string(),
			rank: player_rank(player),
			first_login,
			first_login_pretty: format_timestamp(first_login),
			last_login,
			last_login_pretty: format_timestamp(last_login),
			last_logout,
			last_logout_pretty: format_timestamp(last_logout),
			exp,
			network_level: network_level(exp as f64),
			karma: int_field(player, "karma"),
			achievement_points: int_field(player, "achievementPoints"),
			total_rewards: int_field(player, "totalRewards"),
			total_daily_rewards: int_field(player, "totalDailyRewards"),
			reward_streak: int_field(player, "rewardStreak"),
			reward_score: int_field(player, "rewardScore"),
			reward_high_score: int_field(player, "rewardHighScore"),
			most_recent_game: str_field(player, "mostRecentGameType", "unknown"),
			online: last_login > last_logout,
			images: PlayerImages::new(uuid, &username),
			username,
		}
	}
}

/*
 * Guild
 */

#[derive(Debug, Clone, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct GuildMemberInfo {
	pub uuid: String,
	pub username: String,
	pub joined: i64,
	pub joined_pretty: String,
	pub quests: i64,
	pub rank: String,
	pub weekly_exp: i64,
	pub daily_exp: i64,
	pub role: String,
}

impl GuildMemberInfo {
	fn build(uuid: &str, username: String, member: &Value) -> Self {
		let joined = int_field(member, "joined");
		let (weekly_exp, daily_exp) = exp_history(member);
		let rank = str_field(member, "rank", "not found");

		GuildMemberInfo {
			uuid: uuid.to_string(),
			username,
			joined,
			joined_pretty: format_timestamp(joined),
			quests: int_field(member, "questParticipation"),
			// Hypixel no manda "role", el rango del gremio es lo mas parecido
			role: member.get("role").and_then(Value::as_str).map(str::to_string).unwrap_or_else(|| rank.clone()),
			rank,
			weekly_exp,
			daily_exp,
		}
	}
}

// expHistory es {"2024-06-22": 120, ...} con los ultimos 7 dias; semanal = suma, diario = el dia mas reciente
fn exp_history(member: &Value) -> (i64, i64) {
	let Some(history) = member.get("expHistory").and_then(Value::as_object) else {
		return (0, 0);
	};

	let weekly = history.values().map(as_int).fold(0i64, i64::saturating_add);
	let daily = history.iter().max_by(|a, b| a.0.cmp(b.0)).map(|(_, exp)| as_int(exp)).unwrap_or(0);
	(weekly, daily)
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct GuildData {
	pub uuid: String,
	pub username: String,
	pub in_guild: bool,
	pub name: String,
	pub tag: String,
	pub tag_color: String,
	pub exp: i64,
	pub created: i64,
	pub created_pretty: String,
	pub quests: i64,
	pub joined: i64,
	pub joined_pretty: String,
	pub weekly_exp: i64,
	pub daily_exp: i64,
	pub role: String,
	pub members: Vec<GuildMemberInfo>,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde", untagged)]
pub enum GuildView {
	Member(Box<GuildData>),
	NotInGuild { in_guild: bool },
}

/// Uuids de los miembros para ir a buscar sus nombres
pub fn guild_member_uuids(guild: &Value) -> Vec<String> {
	guild
		.get("members")
		.and_then(Value::as_array)
		.map(|members| {
			members
				.iter()
				.filter_map(|member| member.get("uuid").and_then(Value::as_str))
				.map(str::to_string)
				.collect()
		})
		.unwrap_or_default()
}

impl GuildData {
	/// `names` viene de la busqueda en Mojang; el que falta queda como "Unknown"
	pub fn build(uuid: &str, username: String, guild: &Value, names: &HashMap<String, String>) -> Self {
		let created = int_field(guild, "created");
		let raw_members = guild.get("members").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();

		let mut members = Vec::with_capacity(raw_members.len());
		let mut current: Option<GuildMemberInfo> = None;

		for member in raw_members {
			let Some(member_uuid) = member.get("uuid").and_then(Value::as_str) else {
				continue;
			};
			let member_name = names.get(member_uuid).cloned().unwrap_or_else(|| "Unknown".to_string());
			let info = GuildMemberInfo::build(member_uuid, member_name, member);

			if member_uuid == uuid {
				current = Some(info.clone());
			}
			members.push(info);
		}

		let current = current.unwrap_or_else(|| GuildMemberInfo::build(uuid, String::new(), &Value::Null));

		GuildData {
			uuid: uuid.to_string(),
			username,
			in_guild: true,
			name: str_field(guild, "name", "not found"),
			tag: str_field(guild, "tag", "not found"),
			tag_color: str_field(guild, "tagColor", "not found"),
			exp: int_field(guild, "exp"),
			created,
			created_pretty: format_timestamp(created),
			quests: current.quests,
			joined: current.joined,
			joined_pretty: current.joined_pretty,
			weekly_exp: current.weekly_exp,
			daily_exp: current.daily_exp,
			role: current.role,
			members,
		}
	}
}

/*
 * BedWars
 */

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct BedwarsResources {
	pub tokens: i64,
	pub slumber_tickets: i64,
	pub slumber_tickets_max: i64,
	pub slumber_tickets_total: i64,
}

impl BedwarsResources {
	fn build(stats: &Value) -> Self {
		let slumber = stats.get("slumber").cloned().unwrap_or(Value::Null);
		BedwarsResources {
			tokens: int_field(stats, "coins"),
			slumber_tickets: int_field(&slumber, "tickets"),
			slumber_tickets_max: SLUMBER_TICKETS_MAX,
			slumber_tickets_total: int_field(&slumber, "total_tickets"),
		}
	}
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct BedwarsModeStats {
	pub emeralds: i64,
	pub diamonds: i64,
	pub gold: i64,
	pub iron: i64,
	pub wins: i64,
	pub losses: i64,
	pub final_kills: i64,
	pub final_deaths: i64,
	pub kills: i64,
	pub deaths: i64,
	pub beds_broken: i64,
	pub beds_lost: i64,
	pub wlr: f64,
	pub kdr: f64,
	pub fkdr: f64,
	pub bblr: f64,
}

const COUNTERS: [&str; 12] = [
	"emerald_resources_collected_bedwars",
	"diamond_resources_collected_bedwars",
	"gold_resources_collected_bedwars",
	"iron_resources_collected_bedwars",
	"wins_bedwars",
	"losses_bedwars",
	"final_kills_bedwars",
	"final_deaths_bedwars",
	"kills_bedwars",
	"deaths_bedwars",
	"beds_broken_bedwars",
	"beds_lost_bedwars",
];

/*
 * Modos que se muestran, cada uno con los prefijos que suma. "overall" no tiene prefijo
 * y los agregados (core, ultimate, lucky...) suman sus variantes de 2 y 4 equipos.
 */
const MODES: [(&str, &[&str]); 23] = [
	("overall", &[""]),
	("core", &["eight_one_", "eight_two_", "four_three_", "four_four_"]),
	("eight_one", &["eight_one_"]),
	("eight_two", &["eight_two_"]),
	("four_three", &["four_three_"]),
	("four_four", &["four_four_"]),
	("two_four", &["two_four_"]),
	("four_four_armed", &["four_four_armed_"]),
	("castle", &["castle_"]),
	("four_four_lucky", &["four_four_lucky_"]),
	("eight_two_lucky", &["eight_two_lucky_"]),
	("eight_two_rush", &["eight_two_rush_"]),
	("four_four_rush", &["four_four_rush_"]),
	("eight_two_swap", &["eight_two_swap_"]),
	("four_four_swap", &["four_four_swap_"]),
	("eight_two_ultimate", &["eight_two_ultimate_"]),
	("four_four_ultimate", &["four_four_ultimate_"]),
	("four_four_underworld", &["four_four_underworld_"]),
	("four_four_voidless", &["four_four_voidless_"]),
	("ultimate", &["eight_two_ultimate_", "four_four_ultimate_"]),
	("lucky", &["eight_two_lucky_", "four_four_lucky_"]),
	("rush", &["eight_two_rush_", "four_four_rush_"]),
	("swap", &["eight_two_swap_", "four_four_swap_"]),
];

impl BedwarsModeStats {
	/// None si el jugador nunca jugo el modo (no hay ninguna llave)
	pub fn collect(stats: &Value, prefixes: &[&str]) -> Option<Self> {
		let mut totals = [0i64; COUNTERS.len()];
		let mut seen = false;

		for prefix in prefixes {
			for (total, counter) in totals.iter_mut().zip(COUNTERS) {
				let key = format!("{}{}", prefix, counter);
				if stats.get(&key).is_some() {
					seen = true;
					*total = total.saturating_add(int_field(stats, &key));
				}
			}
		}

		if !seen {
			return None;
		}

		let [emeralds, diamonds, gold, iron, wins, losses, final_kills, final_deaths, kills, deaths, beds_broken, beds_lost] =
			totals;

		Some(BedwarsModeStats {
			emeralds,
			diamonds,
			gold,
			iron,
			wins,
			losses,
			final_kills,
			final_deaths,
			kills,
			deaths,
			beds_broken,
			beds_lost,
			wlr: ratio(wins, losses),
			kdr: ratio(kills, deaths),
			fkdr: ratio(final_kills, final_deaths),
			bblr: ratio(beds_broken, beds_lost),
		})
	}
}

// Se serializa como mapa a mano para mantener el orden de MODES
#[derive(Debug, Default)]
pub struct BedwarsStats(pub Vec<(&'static str, BedwarsModeStats)>);

impl BedwarsStats {
	pub fn build(stats: &Value) -> Self {
		BedwarsStats(
			MODES
				.iter()
				.filter_map(|(name, prefixes)| BedwarsModeStats::collect(stats, prefixes).map(|mode| (*name, mode)))
				.collect(),
		)
	}

	pub fn mode(&self, name: &str) -> Option<&BedwarsModeStats> {
		self.0.iter().find(|(mode, _)| *mode == name).map(|(_, stats)| stats)
	}
}

impl Serialize for BedwarsStats {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.0.len()))?;
		for (name, stats) in &self.0 {
			map.serialize_entry(name, stats)?;
		}
		map.end()
	}
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct BedwarsData {
	pub uuid: String,
	pub username: String,
	pub xp: i64,
	pub level: f64,
	pub prestige: u64,
	pub next_level: u64,
	pub xp_to_next_level: u64,
	pub progress_to_next_level_percentage: i64,
	pub resources: BedwarsResources,
	pub stats: BedwarsStats,
}

/// Stats de BedWars del jugador; Hypixel usa "Bedwars" pero aceptamos "BedWars" tambien
pub fn bedwars_stats(player: &Value) -> Value {
	let stats = player.get("stats");
	stats
		.and_then(|s| s.get("Bedwars").or_else(|| s.get("BedWars")))
		.cloned()
		.unwrap_or(Value::Null)
}

pub fn bedwars_experience(stats: &Value) -> i64 {
	int_field(stats, "Experience")
}

impl BedwarsData {
	pub fn build(uuid: &str, username: String, stats: &Value, info: LevelInfo) -> Self {
		BedwarsData {
			uuid: uuid.to_string(),
			username,
			xp: bedwars_experience(stats),
			level: info.level,
			prestige: info.prestige,
			next_level: info.next_level(),
			xp_to_next_level: info.xp_to_next_level,
			progress_to_next_level_percentage: info.progress_percentage.round() as i64,
			resources: BedwarsResources::build(stats),
			stats: BedwarsStats::build(stats),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::leveling::LevelSystem;
	use rocket::serde::json::{json, to_value};

	fn sample_player() -> Value {
		json!({
			"displayname": "sheepie20",
			"newPackageRank": "MVP_PLUS",
			"monthlyPackageRank": "NONE",
			"firstLogin": 1_591_626_420_000i64,
			"lastLogin": 1_732_925_161_165i64,
			"lastLogout": 1_732_925_713_703i64,
			"networkExp": 14_533_931,
			"karma": 2_456_542,
			"achievementPoints": 4645,
			"mostRecentGameType": "BEDWARS",
			"stats": {
				"Bedwars": {
					"Experience": 1_025_150,
					"coins": 1_101_235,
					"slumber": { "tickets": 8221, "total_tickets": 81_439 },
					"wins_bedwars": 520,
					"losses_bedwars": 2521,
					"kills_bedwars": 5284,
					"deaths_bedwars": 9925,
					"eight_one_wins_bedwars": 77,
					"eight_one_losses_bedwars": 399,
					"four_four_wins_bedwars": 100,
					"four_four_losses_bedwars": 0
				}
			}
		})
	}

	#[test]
	fn test_player_document() {
		let body = json!({ "success": true, "player": sample_player() });
		assert!(player_document(&body).is_ok());

		let missing = json!({ "success": true, "player": null });
		assert!(matches!(player_document(&missing), Err(ApiError::NotFound("Player data not found"))));

		let failed = json!({ "success": false });
		assert!(matches!(player_document(&failed), Err(ApiError::NotFound("Player not found"))));
	}

	#[test]
	fn test_profile_shape() {
		let player = sample_player();
		let profile = PlayerProfileData::build("0937b604c1ce446a96ff818d752a19f6", "sheepie20".into(), &player);

		assert_eq!(profile.rank, "MVP+");
		assert_eq!(profile.network_level, 105.39);
		assert!(!profile.online);
		assert_eq!(profile.most_recent_game, "BEDWARS");
		assert_eq!(profile.reward_streak, 0);

		let value = to_value(&profile).unwrap();
		assert_eq!(value["images"]["3d_head_image"], "https://crafatar.com/renders/head/0937b604c1ce446a96ff818d752a19f6");
		assert_eq!(value["images"]["network_level_image"], "https://gen.plancke.io/exp/sheepie20.png");
	}

	#[test]
	fn test_guild_shape() {
		let guild = json!({
			"name": "TheWaffleCult",
			"tag": "WAFFLE",
			"tagColor": "GOLD",
			"exp": 19_606_242,
			"created": 1_715_983_620_704i64,
			"members": [
				{
					"uuid": "0937b604c1ce446a96ff818d752a19f6",
					"rank": "Member",
					"joined": 1_719_092_290_705i64,
					"questParticipation": 4,
					"expHistory": { "2024-06-21": 10, "2024-06-22": 25, "2024-06-20": 5 }
				},
				{ "uuid": "aaaa", "rank": "Guild Master", "joined": 1 },
				{ "rank": "ghost" }
			]
		});

		let uuids = guild_member_uuids(&guild);
		assert_eq!(uuids, vec!["0937b604c1ce446a96ff818d752a19f6", "aaaa"]);

		let names = HashMap::from([("0937b604c1ce446a96ff818d752a19f6".to_string(), "sheepie20".to_string())]);
		let data = GuildData::build("0937b604c1ce446a96ff818d752a19f6", "sheepie20".into(), &guild, &names);

		assert_eq!(data.members.len(), 2);
		assert_eq!(data.members[0].username, "sheepie20");
		assert_eq!(data.members[1].username, "Unknown");
		assert_eq!(data.members[1].role, "Guild Master");
		assert_eq!(data.created_pretty, "2024-05-17 22:07:00");
		assert_eq!(data.quests, 4);
		assert_eq!(data.weekly_exp, 40);
		assert_eq!(data.daily_exp, 25);
		assert_eq!(data.role, "Member");
		assert_eq!(data.joined_pretty, "2024-06-22 21:38:10");
	}

	#[test]
	fn test_not_in_guild_serializes_flat() {
		let value = to_value(Envelope::ok(GuildView::NotInGuild { in_guild: false })).unwrap();
		assert_eq!(value, json!({ "success": true, "data": { "in_guild": false } }));
	}

	#[test]
	fn test_bedwars_shape() {
		let player = sample_player();
		let stats = bedwars_stats(&player);
		let info = LevelSystem.level_info(bedwars_experience(&stats)).unwrap();
		let data = BedwarsData::build("0937b604c1ce446a96ff818d752a19f6", "sheepie20".into(), &stats, info);

		assert_eq!(data.xp, 1_025_150);
		assert_eq!(data.level, 212.83);
		assert_eq!(data.prestige, 2);
		assert_eq!(data.next_level, 213);
		assert_eq!(data.xp_to_next_level, 850);
		assert_eq!(data.progress_to_next_level_percentage, 83);
		assert_eq!(data.resources.tokens, 1_101_235);
		assert_eq!(data.resources.slumber_tickets, 8221);
		assert_eq!(data.resources.slumber_tickets_total, 81_439);

		let overall = data.stats.mode("overall").unwrap();
		assert_eq!(overall.wlr, 0.21);
		assert_eq!(overall.kdr, 0.53);

		let core = data.stats.mode("core").unwrap();
		assert_eq!(core.wins, 177);
		assert_eq!(core.losses, 399);

		let four_four = data.stats.mode("four_four").unwrap();
		assert_eq!(four_four.wlr, 100.0);
		assert!(data.stats.mode("castle").is_none());

		// El orden de los modos se mantiene al serializar
		let json = rocket::serde::json::to_string(&data.stats).unwrap();
		let overall_at = json.find("\"overall\"").unwrap();
		let core_at = json.find("\"core\"").unwrap();
		let eight_one_at = json.find("\"eight_one\"").unwrap();
		assert!(overall_at < core_at && core_at < eight_one_at);
	}

	#[test]
	fn test_huge_counters_saturate() {
		let stats = BedwarsStats::build(&json!({
			"eight_two_ultimate_wins_bedwars": i64::MAX,
			"four_four_ultimate_wins_bedwars": 1
		}));
		assert_eq!(stats.mode("ultimate").unwrap().wins, i64::MAX);

		let member = json!({ "expHistory": { "2024-06-21": i64::MAX, "2024-06-22": 1 } });
		assert_eq!(exp_history(&member), (i64::MAX, 1));
	}

	#[test]
	fn test_bedwars_without_stats() {
		let player = json!({ "displayname": "nuevo" });
		let stats = bedwars_stats(&player);
		assert_eq!(bedwars_experience(&stats), 0);
		assert!(BedwarsStats::build(&stats).0.is_empty());
	}
}
