mod actor_framework;
mod app_system;
mod catalog;
mod clients;
mod directory;
mod domain;
mod orders;
mod session;
mod webhook;

#[cfg(test)]
mod mock_framework;

use app_system::{setup_tracing, Config, DeliverySystem};
use clients::CatalogClient;
use domain::CafeteriaSeed;
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tracing::info;
use webhook::WebhookState;

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = Config::load();

    info!("Initializing delivery system...");
    let system = DeliverySystem::new();

    seed_reference_data(&system.catalog)
        .await
        .map_err(|e| e.to_string())?;

    let app = webhook::router(WebhookState {
        secret: config.webhook_secret.clone(),
        directory: system.directory.clone(),
    });

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| format!("Failed to bind {address}: {e}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| e.to_string())?;

    system.shutdown().await?;

    info!("Application stopped");
    Ok(())
}

/// The cafeterias and categories this campus runs with. Re-seeding patches
/// fees without duplicating rows.
async fn seed_reference_data(catalog: &CatalogClient) -> Result<(), catalog::CatalogError> {
    catalog
        .seed_cafeterias(vec![
            CafeteriaSeed {
                name: "Grills".to_string(),
                delivery_fee: 500.0,
                transfer_charge: 50.0,
            },
            CafeteriaSeed {
                name: "BTO".to_string(),
                delivery_fee: 500.0,
                transfer_charge: 0.0,
            },
            CafeteriaSeed {
                name: "Laughter's Kitchen".to_string(),
                delivery_fee: 500.0,
                transfer_charge: 50.0,
            },
            CafeteriaSeed {
                name: "DunnKayce".to_string(),
                delivery_fee: 500.0,
                transfer_charge: 20.0,
            },
        ])
        .await?;

    catalog
        .seed_categories(
            [
                "rice",
                "drinks",
                "grills_and_proteins",
                "combos",
                "soups_sauces_swallows",
                "snacks",
                "pastries",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        )
        .await?;

    info!("Reference data seeded");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
