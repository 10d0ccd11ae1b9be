use rocket::launch;

#[launch]
fn rocket() -> _ {
	hypixel_proxy::assemble(rocket::build())
}
