#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::routing::get;
    use axum::Router;
    use vdw_search::api;
    use vdw_search::config::AppConfig;
    use vdw_search::state::AppState;

    vdw_search::init_tracing();

    tracing::info!("Starting VDW search service...");

    let config = AppConfig::from_env()?;
    let app_state = AppState::connect(&config).await?;

    // Queries sort on attributes the index must already know about.
    app_state.index_manager.initialize().await?;

    let app = Router::new()
        .route("/api/v1/search", get(api::search::search_handler))
        .with_state(app_state);

    tracing::info!("Listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

// Without the `ssr` feature only the library is built.
#[cfg(not(feature = "ssr"))]
fn main() {}
