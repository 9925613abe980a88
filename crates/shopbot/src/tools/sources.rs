//! Data sources behind the order and recommendation tools.
//!
//! The default implementations synthesize random data. Tests plug in fixed
//! sources through [`ToolRegistry`](super::registry::ToolRegistry) builders.

use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

pub const ORDER_STATUSES: [&str; 5] = [
    "processing",
    "shipped",
    "in_transit",
    "out_for_delivery",
    "delivered",
];

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub customer_id: String,
    pub status: String,
    pub order_date: NaiveDate,
    pub estimated_delivery: NaiveDate,
    pub total_amount: f64,
    pub tracking_number: String,
    pub items_count: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub id: &'static str,
    pub name: &'static str,
    pub price: f64,
    pub reason: &'static str,
}

pub const RECOMMENDATION_POOL: [Recommendation; 4] = [
    Recommendation {
        id: "P101",
        name: "Laptop Stand Premium",
        price: 49.99,
        reason: "Frequently bought together",
    },
    Recommendation {
        id: "P102",
        name: "Ergonomic Mouse",
        price: 34.99,
        reason: "Customers also viewed",
    },
    Recommendation {
        id: "P103",
        name: "USB-C Hub",
        price: 29.99,
        reason: "Based on your browsing history",
    },
    Recommendation {
        id: "P104",
        name: "Monitor Light Bar",
        price: 89.99,
        reason: "Trending in electronics",
    },
];

/// Number of recommendations returned per call.
pub const RECOMMENDATION_COUNT: usize = 3;

/// Resolves an order ID to its current status.
pub trait OrderLookup: Send + Sync {
    fn lookup(&self, order_id: &str, customer_id: &str) -> Order;
}

/// Produces product recommendations for a customer.
pub trait RecommendationFeed: Send + Sync {
    fn recommend(&self) -> Vec<Recommendation>;
}

/// Synthesizes a plausible random order for any ID.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOrders;

impl OrderLookup for RandomOrders {
    fn lookup(&self, order_id: &str, customer_id: &str) -> Order {
        let mut rng = rand::rng();
        let today = Utc::now().date_naive();
        let order_date = today + Duration::days(1 - rng.random_range(0..10));
        let estimated_delivery = order_date + Duration::days(rng.random_range(1..=5));
        let total_cents: u32 = rng.random_range(5_000..=50_000);
        Order {
            order_id: order_id.to_string(),
            customer_id: customer_id.to_string(),
            status: ORDER_STATUSES[rng.random_range(0..ORDER_STATUSES.len())].to_string(),
            order_date,
            estimated_delivery,
            total_amount: f64::from(total_cents) / 100.0,
            tracking_number: format!("TRK{}", rng.random_range(100_000..=999_999)),
            items_count: rng.random_range(1..=5),
        }
    }
}

/// Shuffles the fixed pool and returns the first three.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShuffledRecommendations;

impl RecommendationFeed for ShuffledRecommendations {
    fn recommend(&self) -> Vec<Recommendation> {
        let mut pool = RECOMMENDATION_POOL.to_vec();
        pool.shuffle(&mut rand::rng());
        pool.truncate(RECOMMENDATION_COUNT);
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_order_within_ranges() {
        let today = Utc::now().date_naive();
        for _ in 0..50 {
            let o = RandomOrders.lookup("ORD-1", "CUST_12345");
            assert_eq!(o.order_id, "ORD-1");
            assert_eq!(o.customer_id, "CUST_12345");
            assert!(ORDER_STATUSES.contains(&o.status.as_str()));
            assert!(o.order_date <= today + Duration::days(1));
            assert!(o.order_date >= today - Duration::days(8));
            let lead = o.estimated_delivery - o.order_date;
            assert!((1..=5).contains(&lead.num_days()));
            assert!((50.0..=500.0).contains(&o.total_amount));
            assert!(o.tracking_number.starts_with("TRK"));
            assert_eq!(o.tracking_number.len(), 9);
            assert!((1..=5).contains(&o.items_count));
        }
    }

    #[test]
    fn order_dates_serialize_as_iso() {
        let o = RandomOrders.lookup("X", "C");
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v["order_date"].as_str().unwrap().len(), 10);
    }

    #[test]
    fn three_distinct_recommendations_from_pool() {
        let recs = ShuffledRecommendations.recommend();
        assert_eq!(recs.len(), 3);
        for r in &recs {
            assert!(RECOMMENDATION_POOL.contains(r));
        }
        assert_ne!(recs[0].id, recs[1].id);
        assert_ne!(recs[1].id, recs[2].id);
        assert_ne!(recs[0].id, recs[2].id);
    }
}
