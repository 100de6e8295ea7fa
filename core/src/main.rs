mod cors;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use common::{clerk::ClerkClient, env_config::Config, razorpay::RazorpayClient};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // get info
    let is_production = config.environment == "production";
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup().expect("Failed to set up logger");
    }

    // init db connection
    let pool = db::setup(&config.database_url, is_production)
        .await
        .expect("Failed to set up database");

    // external collaborators, constructed once and injected
    let razorpay = RazorpayClient::new(&config.razorpay);
    let clerk = ClerkClient::new(&config.clerk);

    HttpServer::new(move || {
        let jwt_public_key = config_data.clerk.jwt_public_key.clone();
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::new(razorpay.clone()))
            .app_data(web::Data::new(clerk.clone()))
            .wrap(logger::middleware()) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .service(
                web::scope("/api")
                    // provider-signed, no session required
                    .service(api_user::mount_webhook())
                    .service(
                        web::scope("")
                            .wrap(api_user::auth_middleware(jwt_public_key))
                            .service(api_payment::mount_payment())
                            .service(api_user::mount_user()),
                    ),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
