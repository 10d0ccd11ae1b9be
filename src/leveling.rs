use thiserror::Error;

/*
 * Curva de BedWars: cada prestigio tiene 100 niveles, los primeros 4 son "faciles"
 * y el resto cuesta lo mismo. Nada de esto se configura en runtime, son constantes.
 */
pub const EASY_LEVELS: usize = 4;
pub const EASY_LEVELS_XP: [u64; EASY_LEVELS] = [500, 1000, 2000, 3500];
pub const EASY_LEVELS_XP_TOTAL: u64 = EASY_LEVELS_XP[0] + EASY_LEVELS_XP[1] + EASY_LEVELS_XP[2] + EASY_LEVELS_XP[3];
pub const XP_PER_LEVEL: u64 = 5000;
pub const LEVELS_PER_PRESTIGE: u64 = 100;
pub const XP_PER_PRESTIGE: u64 = (LEVELS_PER_PRESTIGE - EASY_LEVELS as u64) * XP_PER_LEVEL + EASY_LEVELS_XP_TOTAL;
pub const HIGHEST_PRESTIGE: u64 = 10;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LevelError {
	#[error("experience cannot be negative (got {0})")]
	NegativeExperience(i64),
	#[error("level must be a finite non-negative number (got {0})")]
	InvalidLevel(f64),
	#[error("degenerate level curve: level {level} and {next} share the same total xp", next = .level + 1)]
	DegenerateCurve { level: u64 },
}

// Lo que se devuelve al cliente, todo junto
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelInfo {
	pub level: f64,
	pub prestige: u64,
	pub xp_to_next_level: u64,
	pub progress_percentage: f64,
}

impl LevelInfo {
	pub fn next_level(&self) -> u64 {
		self.level.floor() as u64 + 1
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LevelSystem;

impl LevelSystem {
	/// Valida la experiencia que viene de afuera, la API nunca deberia mandar negativos
	pub fn experience(raw: i64) -> Result<u64, LevelError> {
		u64::try_from(raw).map_err(|_| LevelError::NegativeExperience(raw))
	}

	pub fn level_info(&self, raw_exp: i64) -> Result<LevelInfo, LevelError> {
		let exp = Self::experience(raw_exp)?;
		let level = self.level_for_exp(exp);

		Ok(LevelInfo {
			level,
			prestige: self.prestige_for_level(level),
			xp_to_next_level: self.xp_to_next_level(exp),
			progress_percentage: self.progress_percentage(exp)?,
		})
	}

	/// Nivel (con decimales) para una cantidad de experiencia, redondeado a 3 decimales.
	/// El avance dentro de un nivel facil tambien se mide contra XP_PER_LEVEL.
	pub fn level_for_exp(&self, exp: u64) -> f64 {
		let prestiges = exp / XP_PER_PRESTIGE;
		let mut level = (prestiges * LEVELS_PER_PRESTIGE) as f64;
		let mut remaining = exp % XP_PER_PRESTIGE;

		for cost in EASY_LEVELS_XP {
			if remaining < cost {
				break;
			}
			level += 1.0;
			remaining -= cost;
		}

		level += remaining as f64 / XP_PER_LEVEL as f64;
		round_to(level, 3) // Solo aqui se redondea
	}

	pub fn prestige_for_level(&self, level: f64) -> u64 {
		((level / LEVELS_PER_PRESTIGE as f64).floor() as u64).min(HIGHEST_PRESTIGE)
	}

	pub fn prestige_for_exp(&self, exp: u64) -> u64 {
		self.prestige_for_level(self.level_for_exp(exp))
	}

	/// Costo de subir un solo nivel
	pub fn exp_for_level(&self, level: u64) -> u64 {
		if level == 0 {
			return 0;
		}

		let respected = self.level_respecting_prestige(level);
		if (1..=EASY_LEVELS as u64).contains(&respected) {
			EASY_LEVELS_XP[respected as usize - 1]
		} else {
			XP_PER_LEVEL
		}
	}

	// Pasado el prestigio maximo ya no se da la vuelta cada 100 niveles, se cuenta derecho desde el tope
	fn level_respecting_prestige(&self, level: u64) -> u64 {
		let cap = HIGHEST_PRESTIGE * LEVELS_PER_PRESTIGE;
		if level > cap {
			level - cap
		} else {
			level % LEVELS_PER_PRESTIGE
		}
	}

	/// Experiencia acumulada para llegar a `level`, la parte decimal cuenta como nivel normal
	pub fn total_xp_for_level(&self, level: f64) -> Result<f64, LevelError> {
		if !level.is_finite() || level < 0.0 {
			return Err(LevelError::InvalidLevel(level));
		}

		let whole = level.floor();
		let xp = self.total_xp_for_whole_level(whole as u64) as f64;
		Ok(xp + (level - whole) * XP_PER_LEVEL as f64)
	}

	fn total_xp_for_whole_level(&self, level: u64) -> u64 {
		let prestiges = level / LEVELS_PER_PRESTIGE;
		let within = level % LEVELS_PER_PRESTIGE;

		let within_xp: u64 = (1..=within).map(|i| self.exp_for_level(i)).sum();
		prestiges.saturating_mul(XP_PER_PRESTIGE).saturating_add(within_xp)
	}

	pub fn xp_to_next_level(&self, exp: u64) -> u64 {
		let next_level = self.level_for_exp(exp).floor() as u64 + 1;
		self.total_xp_for_whole_level(next_level).saturating_sub(exp)
	}

	/// Porcentaje dentro del nivel actual, 4 decimales, siempre entre 0 y 100
	pub fn progress_percentage(&self, exp: u64) -> Result<f64, LevelError> {
		let current = self.level_for_exp(exp).floor() as u64;
		let low = self.total_xp_for_whole_level(current);
		let high = self.total_xp_for_whole_level(current + 1);

		if high <= low {
			return Err(LevelError::DegenerateCurve { level: current });
		}

		// Con el redondeo a 3 decimales el nivel puede quedar uno arriba, por eso el clamp
		let progress = (exp as f64 - low as f64) / (high - low) as f64 * 100.0;
		Ok(round_to(progress, 4).clamp(0.0, 100.0))
	}
}

/// Nivel de network de Hypixel, otra formula distinta (raiz cuadrada)
pub fn network_level(network_exp: f64) -> f64 {
	let exp = network_exp.max(0.0);
	round_to((2.0 * exp + 30625.0).sqrt() / 50.0 - 2.5, 2)
}

pub fn round_to(value: f64, places: i32) -> f64 {
	let factor = 10f64.powi(places);
	(value * factor).round() / factor
}
