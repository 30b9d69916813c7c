use super::error::CatalogError;
use crate::domain::{Cafeteria, CafeteriaSeed, MenuItem, MenuItemDetails, MenuLabel};
use tokio::sync::oneshot;

pub type CatalogResponse<T> = oneshot::Sender<Result<T, CatalogError>>;

/// Typed messages for the catalog actor. Each variant carries its parameters
/// and a oneshot channel for the response.
#[derive(Debug)]
pub enum CatalogRequest {
    /// Upsert the cafeteria reference data by name; fees are refreshed on
    /// re-seed.
    SeedCafeterias {
        seeds: Vec<CafeteriaSeed>,
        respond_to: CatalogResponse<()>,
    },
    SeedCategories {
        names: Vec<String>,
        respond_to: CatalogResponse<()>,
    },
    AddProduct {
        category: String,
        name: String,
        image_url: String,
        respond_to: CatalogResponse<String>,
    },
    AddMenuItem {
        cafeteria_id: String,
        product_id: String,
        price: f64,
        avg_wait_minutes: u32,
        quantity_available: u32,
        respond_to: CatalogResponse<String>,
    },
    ListCafeterias {
        respond_to: CatalogResponse<Vec<Cafeteria>>,
    },
    GetCafeteria {
        id: String,
        respond_to: CatalogResponse<Option<Cafeteria>>,
    },
    GetCafeteriaByName {
        name: String,
        respond_to: CatalogResponse<Option<Cafeteria>>,
    },
    GetMenuItem {
        id: String,
        respond_to: CatalogResponse<Option<MenuItem>>,
    },
    /// Product and cafeteria names for hydrating order views.
    DescribeMenuItem {
        id: String,
        respond_to: CatalogResponse<Option<MenuLabel>>,
    },
    MenuForCafeteria {
        cafeteria_id: String,
        respond_to: CatalogResponse<Vec<MenuItemDetails>>,
    },
    MenuByCategory {
        category_name: String,
        respond_to: CatalogResponse<Vec<MenuItemDetails>>,
    },
    /// Case-insensitive substring search over product names.
    Search {
        query: String,
        respond_to: CatalogResponse<Vec<MenuItemDetails>>,
    },
    /// Fold one rating sample into a menu item and its owning cafeteria.
    RateMenuItem {
        menu_item_id: String,
        rating: u8,
        respond_to: CatalogResponse<()>,
    },
    Shutdown,
}
