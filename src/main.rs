use blog_newsletter::configuration::get_configuration;
use blog_newsletter::startup::Application;
use blog_newsletter::telemetry::get_subscriber;
use blog_newsletter::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // `RUST_LOG` overrides the default level
    let subscriber = get_subscriber("blog-newsletter", "info", std::io::stdout);
    init_subscriber(subscriber)?;

    let cfg = get_configuration()?;
    tracing::info!(
        audience_id = %cfg.mailing_list.audience_id,
        api_server = %cfg.mailing_list.api_server,
        "configuration loaded"
    );

    Application::build(cfg).await?.run_until_stopped().await?;
    Ok(())
}
