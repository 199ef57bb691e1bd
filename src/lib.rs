pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;

use actix_web::{middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::lookup_service::ReturnLookupClient;
pub use config::Config;
pub use handlers::session::SessionClient;
pub use infrastructure::returns_client::HttpReturnsApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::session::get_session,
        handlers::session::lookup,
        handlers::session::confirm_item,
        handlers::session::clear_session,
    ),
    components(schemas(
        handlers::session::LookupRequest,
        handlers::session::SessionView,
        handlers::session::ReturnSummary,
        handlers::session::ItemRow,
    )),
    tags((name = "session", description = "Return lookup and item inspection"))
)]
pub struct ApiDoc;

/// Build the session client for the configured returns API.
pub fn build_client(config: &Config) -> SessionClient {
    ReturnLookupClient::new(HttpReturnsApi::new(
        config.base_url.clone(),
        &config.credentials,
    ))
}

/// Register the session routes on an actix-web service config.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/session")
            .route("", web::get().to(handlers::session::get_session))
            .route("", web::delete().to(handlers::session::clear_session))
            .route("/lookup", web::post().to(handlers::session::lookup))
            .route(
                "/items/{id}/confirm",
                web::post().to(handlers::session::confirm_item),
            ),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// All workers share the one session client. The caller is responsible for
/// `.await`-ing (or `tokio::spawn`-ing) the returned server.
pub fn build_server(
    client: SessionClient,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let client = web::Data::new(client);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(client.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
