use blog_newsletter::configuration::get_configuration;
use blog_newsletter::startup::Application;
use blog_newsletter::telemetry::get_subscriber;
use blog_newsletter::telemetry::init_subscriber;
use once_cell::sync::Lazy;
use secrecy::Secret;
use wiremock::MockServer;

pub const API_KEY: &str = "0123456789abcdef0123456789abcdef-us21";
pub const AUDIENCE_ID: &str = "b1ac4d1e";

/// Init the tracing subscriber once only; every test calls `spawn_app`.
///
/// To opt in to verbose logging, use the env var `TEST_LOG`:
///
/// ```sh
///      TEST_LOG=true cargo test [test_name] | bunyan
/// ```
static TRACING: Lazy<()> = Lazy::new(|| {
    // the two sinks are different closure types, hence the match arms
    match std::env::var("TEST_LOG") {
        Ok(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::stdout);
            init_subscriber(subscriber).unwrap();
        }
        Err(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::sink);
            init_subscriber(subscriber).unwrap();
        }
    };
});

pub struct TestApp {
    pub addr: String,
    /// Stands in for the Mailchimp api
    pub provider: MockServer,
}

impl TestApp {
    /// `POST /api/newsletter` with a JSON body
    pub async fn post_newsletter(
        &self,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/newsletter", self.addr))
            .json(body)
            .send()
            .await
            .expect("execute request")
    }

    /// `POST /api/newsletter` with an arbitrary body and no `Content-Type`
    pub async fn post_newsletter_raw(
        &self,
        body: &'static str,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/newsletter", self.addr))
            .body(body)
            .send()
            .await
            .expect("execute request")
    }
}

/// Spawn the app on a random port, with the provider pointed at a fresh
/// `MockServer`. Mocks are mounted by each test.
pub async fn spawn_app() -> TestApp {
    let provider = MockServer::start().await;
    let provider_url = provider.uri();
    spawn_app_with_provider(provider, provider_url).await
}

/// Like `spawn_app`, but the app talks to `provider_url` instead of the
/// `MockServer` (which is still returned, e.g. to assert it was never called).
pub async fn spawn_app_with_provider(
    provider: MockServer,
    provider_url: String,
) -> TestApp {
    Lazy::force(&TRACING);

    let cfg = {
        let mut cfg = get_configuration().expect("read configuration");
        // port 0 is reserved by the OS; the server will be spawned on a random
        // available port
        cfg.application.port = 0;
        cfg.mailing_list.base_url = Some(provider_url);
        cfg.mailing_list.api_key = Secret::new(API_KEY.to_string());
        cfg.mailing_list.audience_id = AUDIENCE_ID.to_string();
        cfg.mailing_list.timeout_milliseconds = 500;
        cfg
    };

    let app = Application::build(cfg).await.expect("build application");
    let addr = format!("http://127.0.0.1:{}", app.get_port());
    tokio::spawn(app.run_until_stopped());

    TestApp { addr, provider }
}
