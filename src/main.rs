use dotenvy::dotenv;
use tracing::info;

use dietitian_portal::{
    adapters::http::app_state::AppState,
    infra::{
        app::create_app,
        error::InfraError,
        setup::{init_app_state, init_tracing},
    },
};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let app_state = init_app_state().await?;

    // Read bind address from config before moving app_state
    let bind_addr = app_state.config.bind_addr;

    spawn_subscription_sweep(app_state.clone());

    let app = create_app(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(InfraError::TcpBind)?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(InfraError::Server)?;

    Ok(())
}

fn spawn_subscription_sweep(app_state: AppState) {
    let every = app_state.config.subscription_sweep_secs;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(every));
        loop {
            interval.tick().await;
            if let Err(err) = app_state.subscription_use_cases.sweep_statuses().await {
                tracing::error!(error = ?err, "subscription sweep failed");
            }
        }
    });
}
