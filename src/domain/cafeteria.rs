/// A vendor offering menu items. Seeded once as reference data and
/// upserted by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Cafeteria {
    pub id: String,
    pub name: String,
    pub delivery_fee: f64,
    pub transfer_charge: f64,
    pub avg_rating: f64,
    pub total_ratings: u32,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Seed row for a cafeteria. Fees are patched on re-seed.
#[derive(Debug, Clone)]
pub struct CafeteriaSeed {
    pub name: String,
    pub delivery_fee: f64,
    pub transfer_charge: f64,
}
