use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let token = std::env::var("API_TOKEN").unwrap_or_else(|_| "secret-token".to_string());
    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    mock_server::run(listener, &token).await
}
