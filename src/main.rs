use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};
use sqlx::postgres::PgPoolOptions;

use taskgate::auth::{Bcrypt, TokenSigner};
use taskgate::config::Config;
use taskgate::routes::{self, Services};
use taskgate::store::PgUserStore;

fn startup_error(context: &str, error: impl std::fmt::Display) -> io::Error {
    error!("{}: {}", context, error);
    io::Error::other(format!("{}: {}", context, error))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;

    // Key problems surface here, before the server accepts a connection.
    let tokens = TokenSigner::new(
        &config.private_key,
        &config.public_key,
        config.token_algorithm,
        config.token_duration,
    )
    .map_err(|e| startup_error("unusable token keys", e))?;
    info!(
        "signing access tokens with {:?}, valid for {}s",
        tokens.algorithm(),
        tokens.duration().num_seconds()
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| startup_error("failed to connect to database", e))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| startup_error("failed to run migrations", e))?;

    let services = Services::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(tokens),
        Bcrypt::new(config.bcrypt_cost),
    );

    info!("Starting taskgate server at {}", config.server_url());
    HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(move |cfg| routes::config(cfg, &services))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
