use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::mailing_list_client::MailingListClient;
use crate::routes::health_check;
use crate::routes::json_error_handler;
use crate::routes::subscribe;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Bind the listener and build the mailing-list client from `cfg`, then
    /// hand both to `run`. Nothing is read from the environment after this.
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(&addr)?;

        // with port 0, the OS picks a free port; tests need to know which one
        let port = listener.local_addr()?.port();

        let mailing_list = cfg.mailing_list;
        let (base_url, timeout) = (mailing_list.base_url(), mailing_list.timeout());
        let client = MailingListClient::new(
            base_url,
            mailing_list.api_key,
            mailing_list.audience_id,
            timeout,
        )?;

        tracing::info!(%addr, port, "starting server");
        let server = run(listener, client)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints:
/// - `GET /health_check`
/// - `POST /api/newsletter`
pub fn run(
    listener: TcpListener,
    client: MailingListClient,
) -> Result<Server, std::io::Error> {
    // `Data` is an `Arc` internally; every worker shares the same client (and
    // connection pool)
    let client = web::Data::new(client);

    // the form may post without a JSON content type; the body is parsed
    // regardless, and extractor failures get a JSON error body
    let json_cfg = web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(json_error_handler);

    // the closure is called once per worker, hence the clones
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/api/newsletter", web::post().to(subscribe))
            .app_data(json_cfg.clone())
            .app_data(client.clone())
    })
    .listen(listener)?
    .run();

    Ok(server) // sync return -- caller awaits
}
