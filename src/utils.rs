use chrono::DateTime;
use rocket::serde::json::Value;

use crate::leveling::round_to;

// Mojang y Hypixel aceptan el uuid sin guiones, asi lo usamos para todo
pub fn strip_uuid_dashes(uuid: &str) -> String {
	uuid.replace('-', "")
}

/// Timestamp en milisegundos a "2023-12-25 15:30:45" (UTC)
pub fn format_timestamp(timestamp: i64) -> String {
	if timestamp == 0 {
		return "Never".to_string();
	}

	match DateTime::from_timestamp_millis(timestamp) {
		Some(date) => date.format("%Y-%m-%d %H:%M:%S").to_string(),
		None => "Invalid timestamp".to_string(),
	}
}

/*
 * Rango visible del jugador. El orden importa: primero el prefix custom (con colores),
 * despues rangos de staff/youtube, despues MVP++ y por ultimo los rangos comprados.
 */
pub fn player_rank(player: &Value) -> String {
	if let Some(prefix) = player.get("prefix").and_then(Value::as_str).filter(|p| !p.is_empty()) {
		return strip_color_codes(prefix)
			.trim()
			.trim_matches(|c| c == '[' || c == ']')
			.to_string(); // "PIG+++", "OWNER"
	}

	if let Some(rank) = player.get("rank").and_then(Value::as_str) {
		if !rank.is_empty() && rank != "NORMAL" {
			return rank.to_string(); // "YOUTUBER"
		}
	}

	if player.get("monthlyPackageRank").and_then(Value::as_str) == Some("SUPERSTAR") {
		return "MVP++".to_string();
	}

	match player.get("newPackageRank").and_then(Value::as_str) {
		Some("MVP_PLUS") => "MVP+",
		Some("MVP") => "MVP",
		Some("VIP_PLUS") => "VIP+",
		Some("VIP") => "VIP",
		_ => "NONE",
	}
	.to_string()
}

// Saca los pares "§x" de colores de minecraft
fn strip_color_codes(text: &str) -> String {
	let mut clean = String::with_capacity(text.len());
	let mut chars = text.chars();
	while let Some(c) = chars.next() {
		if c == '§' {
			chars.next();
		} else {
			clean.push(c);
		}
	}
	clean
}

/// Ratio a 2 decimales, si no hay denominador se devuelve el numerador
pub fn ratio(numerator: i64, denominator: i64) -> f64 {
	if denominator == 0 {
		return numerator as f64;
	}
	round_to(numerator as f64 / denominator as f64, 2)
}

// Hypixel a veces manda los contadores como doubles, asi que se aceptan los dos
pub fn int_field(object: &Value, key: &str) -> i64 {
	object.get(key).map(as_int).unwrap_or(0)
}

pub fn as_int(value: &Value) -> i64 {
	value.as_i64().or_else(|| value.as_f64().map(|f| f as i64)).unwrap_or(0)
}

pub fn str_field(object: &Value, key: &str, default: &str) -> String {
	object.get(key).and_then(Value::as_str).unwrap_or(default).to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rocket::serde::json::json;

	#[test]
	fn test_strip_dashes() {
		assert_eq!(strip_uuid_dashes("0937b604-c1ce-446a-96ff-818d752a19f6"), "0937b604c1ce446a96ff818d752a19f6");
		assert_eq!(strip_uuid_dashes("0937b604c1ce446a96ff818d752a19f6"), "0937b604c1ce446a96ff818d752a19f6");
	}

	#[test]
	fn test_format_timestamp() {
		assert_eq!(format_timestamp(0), "Never");
		assert_eq!(format_timestamp(1_715_983_620_704), "2024-05-17 22:07:00");
		assert_eq!(format_timestamp(i64::MAX), "Invalid timestamp");
	}

	#[test]
	fn test_rank_from_prefix() {
		let player = json!({ "prefix": "§d[PIG§b+++§d]", "newPackageRank": "MVP_PLUS" });
		assert_eq!(player_rank(&player), "PIG+++");
	}

	#[test]
	fn test_rank_staff_and_packages() {
		assert_eq!(player_rank(&json!({ "rank": "YOUTUBER" })), "YOUTUBER");
		assert_eq!(player_rank(&json!({ "rank": "NORMAL", "newPackageRank": "VIP" })), "VIP");
		assert_eq!(player_rank(&json!({ "monthlyPackageRank": "SUPERSTAR", "newPackageRank": "MVP_PLUS" })), "MVP++");
		assert_eq!(player_rank(&json!({ "monthlyPackageRank": "NONE", "newPackageRank": "MVP_PLUS" })), "MVP+");
		assert_eq!(player_rank(&json!({ "newPackageRank": "VIP_PLUS" })), "VIP+");
		assert_eq!(player_rank(&json!({})), "NONE");
	}

	#[test]
	fn test_ratio() {
		assert_eq!(ratio(520, 2521), 0.21);
		assert_eq!(ratio(7, 0), 7.0);
		assert_eq!(ratio(0, 0), 0.0);
	}

	#[test]
	fn test_fields() {
		let object = json!({ "a": 5, "b": 12.0, "c": "hola" });
		assert_eq!(int_field(&object, "a"), 5);
		assert_eq!(int_field(&object, "b"), 12);
		assert_eq!(int_field(&object, "c"), 0);
		assert_eq!(int_field(&object, "missing"), 0);
		assert_eq!(str_field(&object, "c", "not found"), "hola");
		assert_eq!(str_field(&object, "a", "not found"), "not found");
	}
}
