use storefront::config::configuration;
use storefront::db::establish_connection;
use storefront::startup::Application;
use storefront::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("storefront".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let config = configuration::Settings::new().expect("Failed to load configurations");
    let pool = establish_connection(&config.database.url);
    let port = 9000;

    let application = Application::build(port, pool).await?;
    application.run_until_stopped().await?;
    Ok(())
}
