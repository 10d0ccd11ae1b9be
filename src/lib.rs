use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};

pub mod config;
pub mod error;
pub mod leveling;
pub mod models;
pub mod routes;
pub mod upstream;
pub mod utils;

use config::AppConfig;
use upstream::Upstream;

/*
 * Proxy de solo lectura para Mojang + Hypixel. No guarda nada, cada request va a buscar
 * los datos afuera, los ordena y devuelve el JSON con la forma de siempre.
 */
pub fn assemble(rocket: Rocket<Build>) -> Rocket<Build> {
	rocket
		.attach(AdHoc::config::<AppConfig>())
		.attach(AdHoc::try_on_ignite("Upstream clients", |rocket| async move {
			// AdHoc::config ya dejo el AppConfig en el estado
			let config = rocket.state::<AppConfig>().cloned();
			let Some(config) = config else {
				return Err(rocket);
			};

			match Upstream::new(&config) {
				Ok(upstream) => Ok(rocket.manage(upstream)),
				Err(err) => {
					log::error!("Could not build the HTTP client: {}", err);
					Err(rocket)
				}
			}
		}))
		.mount("/", rocket::routes![
			routes::index,
			routes::health,
			routes::player_uuid,
			routes::player_profile,
			routes::player_guild,
			routes::player_bedwars
		])
		.register("/", rocket::catchers![routes::not_found, routes::unprocessable, routes::internal_error])
}

