use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use todo_api::{
    routes,
    store::{
        CredentialStore, InMemoryCredentialStore, InMemoryTaskStore, PgCredentialStore,
        PgTaskStore, TaskStore,
    },
    AppState, Config,
};

type Stores = (Arc<dyn CredentialStore>, Arc<dyn TaskStore>);

async fn connect_stores(config: &Config) -> io::Result<Stores> {
    let Some(database_url) = &config.database_url else {
        log::warn!("DATABASE_URL not set; using in-memory stores, data is lost on exit");
        return Ok((
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(InMemoryTaskStore::new()),
        ));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("database connection failed: {}", e)))?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("migrations failed: {}", e)))?;
    log::info!("connected to PostgreSQL");

    Ok((
        Arc::new(PgCredentialStore::new(pool.clone())),
        Arc::new(PgTaskStore::new(pool)),
    ))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let (users, todos) = connect_stores(&config).await?;
    let state = web::Data::new(AppState::new(&config, users, todos));

    log::info!("Starting todo-api server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
