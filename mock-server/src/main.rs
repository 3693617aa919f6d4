use mock_server::{config::Config, Dataset};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load();
    let dataset = match &config.fixture {
        Some(path) => {
            info!("Loading fixture from {}", path.display());
            Dataset::from_json(&std::fs::read_to_string(path)?)?
        }
        None => Dataset::sample(),
    };
    info!("Serving {} filings", dataset.filings().len());

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    mock_server::serve(listener, dataset).await?;
    Ok(())
}
