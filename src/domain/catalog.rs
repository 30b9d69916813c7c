/// Menu category (rice, drinks, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// A product as such, independent of who sells it.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub image_url: String,
}

/// The orderable unit: a product sold by a specific cafeteria at a
/// specific price.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub cafeteria_id: String,
    pub product_id: String,
    pub price: f64,
    pub avg_wait_minutes: u32,
    pub quantity_available: u32,
    pub avg_rating: f64,
    pub total_ratings: u32,
}

/// A menu item hydrated with its product, category and cafeteria for the
/// browse, category and search screens.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemDetails {
    pub menu_item_id: String,
    pub price: f64,
    pub quantity_available: u32,
    pub avg_wait_minutes: u32,
    pub avg_rating: f64,
    pub total_ratings: u32,
    pub product_name: String,
    pub image_url: String,
    pub category_name: String,
    pub cafeteria_name: String,
    pub cafeteria_delivery_fee: f64,
    pub cafeteria_transfer_charge: f64,
}

/// Product and cafeteria names for a menu item, used when hydrating order
/// views.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuLabel {
    pub product_name: String,
    pub cafeteria_name: String,
    pub image_url: String,
}
