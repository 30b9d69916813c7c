use super::client_method;
use crate::catalog::{CatalogError, CatalogRequest};
use crate::domain::{Cafeteria, CafeteriaSeed, MenuItem, MenuItemDetails, MenuLabel};
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Client for the catalog actor.
#[derive(Clone)]
pub struct CatalogClient {
    sender: mpsc::Sender<CatalogRequest>,
}

impl CatalogClient {
    pub fn new(sender: mpsc::Sender<CatalogRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), CatalogError> {
        debug!("Sending shutdown request");
        self.sender
            .send(CatalogRequest::Shutdown)
            .await
            .map_err(|_| CatalogError::ActorCommunicationError("Actor closed".to_string()))
    }
}

client_method!(CatalogClient => fn seed_cafeterias(seeds: Vec<CafeteriaSeed>) -> () as CatalogRequest::SeedCafeterias, Error = CatalogError);
client_method!(CatalogClient => fn seed_categories(names: Vec<String>) -> () as CatalogRequest::SeedCategories, Error = CatalogError);
client_method!(CatalogClient => fn add_product(category: String, name: String, image_url: String) -> String as CatalogRequest::AddProduct, Error = CatalogError);
client_method!(CatalogClient => fn add_menu_item(cafeteria_id: String, product_id: String, price: f64, avg_wait_minutes: u32, quantity_available: u32) -> String as CatalogRequest::AddMenuItem, Error = CatalogError);
client_method!(CatalogClient => fn list_cafeterias() -> Vec<Cafeteria> as CatalogRequest::ListCafeterias, Error = CatalogError);
client_method!(CatalogClient => fn get_cafeteria(id: String) -> Option<Cafeteria> as CatalogRequest::GetCafeteria, Error = CatalogError);
client_method!(CatalogClient => fn get_cafeteria_by_name(name: String) -> Option<Cafeteria> as CatalogRequest::GetCafeteriaByName, Error = CatalogError);
client_method!(CatalogClient => fn get_menu_item(id: String) -> Option<MenuItem> as CatalogRequest::GetMenuItem, Error = CatalogError);
client_method!(CatalogClient => fn describe_menu_item(id: String) -> Option<MenuLabel> as CatalogRequest::DescribeMenuItem, Error = CatalogError);
client_method!(CatalogClient => fn menu_for_cafeteria(cafeteria_id: String) -> Vec<MenuItemDetails> as CatalogRequest::MenuForCafeteria, Error = CatalogError);
client_method!(CatalogClient => fn menu_by_category(category_name: String) -> Vec<MenuItemDetails> as CatalogRequest::MenuByCategory, Error = CatalogError);
client_method!(CatalogClient => fn search(query: String) -> Vec<MenuItemDetails> as CatalogRequest::Search, Error = CatalogError);
client_method!(CatalogClient => fn rate_menu_item(menu_item_id: String, rating: u8) -> () as CatalogRequest::RateMenuItem, Error = CatalogError);
