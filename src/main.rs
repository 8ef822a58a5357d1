use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trivia_server::{build_router, AppState, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trivia_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(
        question_budget_secs = config.game.question_budget.as_secs(),
        "Starting trivia server"
    );

    let app_state = AppState::in_memory(config.game.clone());
    let app = build_router(app_state);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("WebSocket server running on ws://{}", address);
    axum::serve(listener, app).await?;

    Ok(())
}
