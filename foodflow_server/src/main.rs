use dotenvy::dotenv;
use foodflow_engine::SqliteDatabase;
use foodflow_server::{cli::handle_command_line_args, config::ServerConfig, errors::ServerError, server::run_server};
use log::info;

#[actix_web::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    if handle_command_line_args() {
        return;
    }
    let config = ServerConfig::from_env_or_default();
    if let Err(e) = prepare_database(&config).await {
        eprintln!("Could not prepare the database. {e}");
        return;
    }

    info!("🚀️ Starting server on {}:{}", config.host, config.port);
    match run_server(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}

async fn prepare_database(config: &ServerConfig) -> Result<(), ServerError> {
    let url = config.database_url.as_str();
    SqliteDatabase::create_database_if_missing(url)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let db = SqliteDatabase::new_with_url(url, 1)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🗃️ Database ready at {url}");
    Ok(())
}
