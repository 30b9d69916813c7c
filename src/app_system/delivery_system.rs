use crate::actor_framework::ResourceActor;
use crate::catalog::CatalogService;
use crate::clients::{CatalogClient, DirectoryClient, OrderClient};
use crate::domain::User;
use crate::orders::OrderService;
use tracing::{error, info};

/// The main application system that wires and runs all actors.
///
/// Startup order matters: the directory and catalog come up first so the
/// order service can hold their clients.
pub struct DeliverySystem {
    pub directory: DirectoryClient,
    pub catalog: CatalogClient,
    pub orders: OrderClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Default for DeliverySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliverySystem {
    pub fn new() -> Self {
        info!("Starting delivery system");

        let (directory_actor, directory_resource_client) = ResourceActor::<User>::new(32);
        let directory = DirectoryClient::new(directory_resource_client);
        let directory_handle = tokio::spawn(directory_actor.run());

        let (catalog_service, catalog) = CatalogService::new(32);
        let catalog_handle = tokio::spawn(catalog_service.run());

        let (order_service, orders) = OrderService::new(32, directory.clone(), catalog.clone());
        let order_handle = tokio::spawn(order_service.run());

        info!("Delivery system started");

        Self {
            directory,
            catalog,
            orders,
            handles: vec![directory_handle, catalog_handle, order_handle],
        }
    }

    /// Gracefully shut down: root actor first, then its dependencies. The
    /// directory actor stops once every client clone is dropped.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down delivery system");

        let _ = self.orders.shutdown().await;
        let _ = self.catalog.shutdown().await;
        drop(self.orders);
        drop(self.catalog);
        drop(self.directory);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Actor task failed");
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Delivery system shutdown complete");
        Ok(())
    }
}
