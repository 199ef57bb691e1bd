use dotenvy::dotenv;
use return_lookup::{build_client, build_server, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    log::info!("Using returns API at {}", config.base_url);
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(build_client(&config), &config.host, config.port)?.await
}
