use super::error::CatalogError;
use super::messages::CatalogRequest;
use crate::clients::CatalogClient;
use crate::domain::{
    incremental_mean, now_millis, Cafeteria, CafeteriaSeed, Category, MenuItem, MenuItemDetails,
    MenuLabel,
};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

/// Catalog actor owning cafeterias, categories, products and menu items.
///
/// All rating aggregates for food are updated here, so the menu-item and
/// cafeteria averages always move together.
pub struct CatalogService {
    receiver: mpsc::Receiver<CatalogRequest>,
    cafeterias: HashMap<String, Cafeteria>,
    categories: HashMap<String, Category>,
    products: HashMap<String, crate::domain::Product>,
    menu_items: HashMap<String, MenuItem>,
    next_id: u64,
}

impl CatalogService {
    pub fn new(buffer_size: usize) -> (Self, CatalogClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            cafeterias: HashMap::new(),
            categories: HashMap::new(),
            products: HashMap::new(),
            menu_items: HashMap::new(),
            next_id: 1,
        };
        let client = CatalogClient::new(sender);
        (service, client)
    }

    fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{}_{}", prefix, self.next_id);
        self.next_id += 1;
        id
    }

    #[instrument(name = "catalog_service", skip(self))]
    pub async fn run(mut self) {
        info!("CatalogService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CatalogRequest::SeedCafeterias { seeds, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_seed_cafeterias(seeds)));
                }
                CatalogRequest::SeedCategories { names, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_seed_categories(names)));
                }
                CatalogRequest::AddProduct {
                    category,
                    name,
                    image_url,
                    respond_to,
                } => {
                    let result = self.handle_add_product(category, name, image_url);
                    let _ = respond_to.send(result);
                }
                CatalogRequest::AddMenuItem {
                    cafeteria_id,
                    product_id,
                    price,
                    avg_wait_minutes,
                    quantity_available,
                    respond_to,
                } => {
                    let result = self.handle_add_menu_item(
                        cafeteria_id,
                        product_id,
                        price,
                        avg_wait_minutes,
                        quantity_available,
                    );
                    let _ = respond_to.send(result);
                }
                CatalogRequest::ListCafeterias { respond_to } => {
                    let mut all: Vec<Cafeteria> = self.cafeterias.values().cloned().collect();
                    all.sort_by(|a, b| a.name.cmp(&b.name));
                    let _ = respond_to.send(Ok(all));
                }
                CatalogRequest::GetCafeteria { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.cafeterias.get(&id).cloned()));
                }
                CatalogRequest::GetCafeteriaByName { name, respond_to } => {
                    let found = self.cafeterias.values().find(|c| c.name == name).cloned();
                    let _ = respond_to.send(Ok(found));
                }
                CatalogRequest::GetMenuItem { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.menu_items.get(&id).cloned()));
                }
                CatalogRequest::DescribeMenuItem { id, respond_to } => {
                    let label = self.menu_items.get(&id).map(|item| self.label_for(item));
                    let _ = respond_to.send(Ok(label));
                }
                CatalogRequest::MenuForCafeteria {
                    cafeteria_id,
                    respond_to,
                } => {
                    let _ = respond_to.send(Ok(self.handle_menu_for_cafeteria(&cafeteria_id)));
                }
                CatalogRequest::MenuByCategory {
                    category_name,
                    respond_to,
                } => {
                    let _ = respond_to.send(Ok(self.handle_menu_by_category(&category_name)));
                }
                CatalogRequest::Search { query, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_search(&query)));
                }
                CatalogRequest::RateMenuItem {
                    menu_item_id,
                    rating,
                    respond_to,
                } => {
                    let result = self.handle_rate_menu_item(&menu_item_id, rating);
                    let _ = respond_to.send(result);
                }
                CatalogRequest::Shutdown => {
                    info!("CatalogService shutting down");
                    break;
                }
            }
        }

        info!("CatalogService stopped");
    }

    #[instrument(fields(count = seeds.len()), skip(self, seeds))]
    fn handle_seed_cafeterias(&mut self, seeds: Vec<CafeteriaSeed>) {
        let now = now_millis();
        for seed in seeds {
            if let Some(existing) = self.cafeterias.values_mut().find(|c| c.name == seed.name) {
                existing.delivery_fee = seed.delivery_fee;
                existing.transfer_charge = seed.transfer_charge;
                existing.updated_at = now;
                continue;
            }
            let id = self.next_id("cafeteria");
            info!(cafeteria = %seed.name, "Seeding cafeteria");
            self.cafeterias.insert(
                id.clone(),
                Cafeteria {
                    id,
                    name: seed.name,
                    delivery_fee: seed.delivery_fee,
                    transfer_charge: seed.transfer_charge,
                    avg_rating: 0.0,
                    total_ratings: 0,
                    created_at: now,
                    updated_at: now,
                },
            );
        }
    }

    #[instrument(fields(count = names.len()), skip(self, names))]
    fn handle_seed_categories(&mut self, names: Vec<String>) {
        for name in names {
            if self.categories.values().any(|c| c.name == name) {
                continue;
            }
            let id = self.next_id("category");
            self.categories.insert(id.clone(), Category { id, name });
        }
    }

    #[instrument(fields(product_name = %name, category = %category), skip(self, name, image_url))]
    fn handle_add_product(
        &mut self,
        category: String,
        name: String,
        image_url: String,
    ) -> Result<String, CatalogError> {
        let Some(category_id) = self
            .categories
            .values()
            .find(|c| c.name == category)
            .map(|c| c.id.clone())
        else {
            error!("Category not found");
            return Err(CatalogError::CategoryNotFound(category));
        };
        let id = self.next_id("product");
        self.products.insert(
            id.clone(),
            crate::domain::Product {
                id: id.clone(),
                category_id,
                name,
                image_url,
            },
        );
        Ok(id)
    }

    #[instrument(fields(cafeteria_id = %cafeteria_id, product_id = %product_id), skip(self))]
    fn handle_add_menu_item(
        &mut self,
        cafeteria_id: String,
        product_id: String,
        price: f64,
        avg_wait_minutes: u32,
        quantity_available: u32,
    ) -> Result<String, CatalogError> {
        if !self.cafeterias.contains_key(&cafeteria_id) {
            return Err(CatalogError::CafeteriaNotFound(cafeteria_id));
        }
        if !self.products.contains_key(&product_id) {
            return Err(CatalogError::ProductNotFound(product_id));
        }
        let id = self.next_id("menu_item");
        self.menu_items.insert(
            id.clone(),
            MenuItem {
                id: id.clone(),
                cafeteria_id,
                product_id,
                price,
                avg_wait_minutes,
                quantity_available,
                avg_rating: 0.0,
                total_ratings: 0,
            },
        );
        Ok(id)
    }

    fn handle_menu_for_cafeteria(&self, cafeteria_id: &str) -> Vec<MenuItemDetails> {
        let mut items: Vec<MenuItemDetails> = self
            .menu_items
            .values()
            .filter(|item| item.cafeteria_id == cafeteria_id)
            .map(|item| self.details_for(item))
            .collect();
        items.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        items
    }

    fn handle_menu_by_category(&self, category_name: &str) -> Vec<MenuItemDetails> {
        let Some(category) = self.categories.values().find(|c| c.name == category_name) else {
            return Vec::new();
        };
        let mut items: Vec<MenuItemDetails> = self
            .menu_items
            .values()
            .filter(|item| {
                self.products
                    .get(&item.product_id)
                    .is_some_and(|p| p.category_id == category.id)
            })
            .map(|item| self.details_for(item))
            .collect();
        items.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        items
    }

    #[instrument(fields(query = %query), skip(self))]
    fn handle_search(&self, query: &str) -> Vec<MenuItemDetails> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        let mut results: Vec<MenuItemDetails> = self
            .menu_items
            .values()
            .filter(|item| {
                self.products
                    .get(&item.product_id)
                    .is_some_and(|p| p.name.to_lowercase().contains(&needle))
            })
            .map(|item| self.details_for(item))
            .collect();
        results.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        debug!(hits = results.len(), "Search completed");
        results
    }

    #[instrument(fields(menu_item_id = %menu_item_id, rating = rating), skip(self))]
    fn handle_rate_menu_item(&mut self, menu_item_id: &str, rating: u8) -> Result<(), CatalogError> {
        if !(1..=5).contains(&rating) {
            return Err(CatalogError::InvalidRating(rating));
        }
        let item = self
            .menu_items
            .get_mut(menu_item_id)
            .ok_or_else(|| CatalogError::MenuItemNotFound(menu_item_id.to_string()))?;

        let (avg, count) = incremental_mean(item.avg_rating, item.total_ratings, rating as f64);
        item.avg_rating = avg;
        item.total_ratings = count;
        let cafeteria_id = item.cafeteria_id.clone();

        // The same sample also moves the owning cafeteria's aggregate.
        if let Some(cafeteria) = self.cafeterias.get_mut(&cafeteria_id) {
            let (avg, count) =
                incremental_mean(cafeteria.avg_rating, cafeteria.total_ratings, rating as f64);
            cafeteria.avg_rating = avg;
            cafeteria.total_ratings = count;
            cafeteria.updated_at = now_millis();
        }

        info!(avg = avg, count = count, "Menu item rated");
        Ok(())
    }

    fn label_for(&self, item: &MenuItem) -> MenuLabel {
        let product = self.products.get(&item.product_id);
        MenuLabel {
            product_name: product
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Unknown Item".to_string()),
            cafeteria_name: self
                .cafeterias
                .get(&item.cafeteria_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "Unknown Cafeteria".to_string()),
            image_url: product.map(|p| p.image_url.clone()).unwrap_or_default(),
        }
    }

    fn details_for(&self, item: &MenuItem) -> MenuItemDetails {
        let product = self.products.get(&item.product_id);
        let category = product.and_then(|p| self.categories.get(&p.category_id));
        let cafeteria = self.cafeterias.get(&item.cafeteria_id);
        MenuItemDetails {
            menu_item_id: item.id.clone(),
            price: item.price,
            quantity_available: item.quantity_available,
            avg_wait_minutes: item.avg_wait_minutes,
            avg_rating: item.avg_rating,
            total_ratings: item.total_ratings,
            product_name: product
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Unknown Item".to_string()),
            image_url: product.map(|p| p.image_url.clone()).unwrap_or_default(),
            category_name: category
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "Menu".to_string()),
            cafeteria_name: cafeteria
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            cafeteria_delivery_fee: cafeteria.map(|c| c.delivery_fee).unwrap_or_default(),
            cafeteria_transfer_charge: cafeteria.map(|c| c.transfer_charge).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_catalog() -> (CatalogClient, String, String) {
        let (service, client) = CatalogService::new(16);
        tokio::spawn(service.run());

        client
            .seed_cafeterias(vec![CafeteriaSeed {
                name: "Grills".into(),
                delivery_fee: 500.0,
                transfer_charge: 50.0,
            }])
            .await
            .unwrap();
        client.seed_categories(vec!["rice".into()]).await.unwrap();

        let cafeteria = client
            .get_cafeteria_by_name("Grills".into())
            .await
            .unwrap()
            .unwrap();
        let product = client
            .add_product("rice".into(), "Jollof Rice".into(), "jollof.png".into())
            .await
            .unwrap();
        let menu_item = client
            .add_menu_item(cafeteria.id.clone(), product, 1000.0, 15, 20)
            .await
            .unwrap();
        (client, cafeteria.id, menu_item)
    }

    #[tokio::test]
    async fn reseeding_updates_fees_without_duplicating() {
        let (client, cafeteria_id, _) = seeded_catalog().await;
        client
            .seed_cafeterias(vec![CafeteriaSeed {
                name: "Grills".into(),
                delivery_fee: 700.0,
                transfer_charge: 0.0,
            }])
            .await
            .unwrap();

        let all = client.list_cafeterias().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, cafeteria_id);
        assert_eq!(all[0].delivery_fee, 700.0);
    }

    #[tokio::test]
    async fn search_matches_substrings_case_insensitively() {
        let (client, _, menu_item) = seeded_catalog().await;

        let hits = client.search("JOLL".into()).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].menu_item_id, menu_item);
        assert_eq!(hits[0].cafeteria_name, "Grills");
        assert_eq!(hits[0].category_name, "rice");

        assert!(client.search("pizza".into()).await.unwrap().is_empty());
        assert!(client.search("".into()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rating_moves_item_and_cafeteria_aggregates() {
        let (client, cafeteria_id, menu_item) = seeded_catalog().await;

        client.rate_menu_item(menu_item.clone(), 4).await.unwrap();
        client.rate_menu_item(menu_item.clone(), 5).await.unwrap();

        let item = client.get_menu_item(menu_item).await.unwrap().unwrap();
        assert_eq!(item.total_ratings, 2);
        assert!((item.avg_rating - 4.5).abs() < 1e-9);

        let cafeteria = client.get_cafeteria(cafeteria_id).await.unwrap().unwrap();
        assert_eq!(cafeteria.total_ratings, 2);
        assert!((cafeteria.avg_rating - 4.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn menu_queries_hydrate_product_category_and_fees() {
        let (client, cafeteria_id, menu_item) = seeded_catalog().await;

        let menu = client.menu_for_cafeteria(cafeteria_id).await.unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].menu_item_id, menu_item);
        assert_eq!(menu[0].product_name, "Jollof Rice");
        assert_eq!(menu[0].category_name, "rice");
        assert_eq!(menu[0].cafeteria_delivery_fee, 500.0);

        let by_category = client.menu_by_category("rice".into()).await.unwrap();
        assert_eq!(by_category.len(), 1);
        assert!(client
            .menu_by_category("pastries".into())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn out_of_range_ratings_are_rejected() {
        let (client, _, menu_item) = seeded_catalog().await;
        assert_eq!(
            client.rate_menu_item(menu_item, 6).await,
            Err(CatalogError::InvalidRating(6))
        );
    }
}
