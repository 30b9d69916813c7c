/// A food rating: one per (user, menu item).
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemRating {
    pub user_id: String,
    pub menu_item_id: String,
    pub rating: u8,
    pub created_at: u64,
}

/// A delivery rating: one per (runner, order).
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerRating {
    pub runner_id: String,
    pub user_id: String,
    pub order_id: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: u64,
}

/// Folds one new sample into a running average without rescanning previous
/// samples. O(1) per rating; the accumulated floating-point drift is
/// acceptable at these volumes.
pub fn incremental_mean(avg: f64, count: u32, sample: f64) -> (f64, u32) {
    let new_count = count + 1;
    let new_avg = (avg * count as f64 + sample) / new_count as f64;
    (new_avg, new_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_becomes_the_average() {
        assert_eq!(incremental_mean(0.0, 0, 4.0), (4.0, 1));
    }

    #[test]
    fn folds_new_sample_into_running_average() {
        // 4.0 over two ratings plus a 5 -> (4.0*2 + 5) / 3
        let (avg, count) = incremental_mean(4.0, 2, 5.0);
        assert_eq!(count, 3);
        assert!((avg - 13.0 / 3.0).abs() < 1e-9);
    }
}
