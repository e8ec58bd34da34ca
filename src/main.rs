use fixit_agent::handlers::create_app_router;
use fixit_agent::init::app_init;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("🚀 Starting iFixit repair guide server...");
    let (config, state) = app_init()?;
    log::info!("✅ Application state initialized");
    let app = create_app_router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("");
    log::info!("🎉 Server started!");
    log::info!("📍 http://{}", addr);
    log::info!("📡 Stream: http://{}/chat/stream", addr);
    log::info!("❤️  Health: http://{}/health", addr);
    log::info!("🔧 iFixit: {}", config.ifixit.api_url);
    log::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
