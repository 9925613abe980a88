//! The fixed product catalog.

use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub price: f64,
    pub in_stock: bool,
    pub rating: f64,
}

pub const CATALOG: [Product; 7] = [
    Product {
        id: "P001",
        name: "Wireless Headphones Pro",
        category: "electronics",
        price: 129.99,
        in_stock: true,
        rating: 4.5,
    },
    Product {
        id: "P002",
        name: "Running Shoes Ultra",
        category: "clothing",
        price: 89.99,
        in_stock: true,
        rating: 4.7,
    },
    Product {
        id: "P003",
        name: "Smart Watch Series 5",
        category: "electronics",
        price: 299.99,
        in_stock: false,
        rating: 4.3,
    },
    Product {
        id: "P004",
        name: "Coffee Maker Deluxe",
        category: "home",
        price: 79.99,
        in_stock: true,
        rating: 4.6,
    },
    Product {
        id: "P005",
        name: "Python Programming Book",
        category: "books",
        price: 45.00,
        in_stock: true,
        rating: 4.8,
    },
    Product {
        id: "P006",
        name: "Bluetooth Speaker",
        category: "electronics",
        price: 59.99,
        in_stock: true,
        rating: 4.4,
    },
    Product {
        id: "P007",
        name: "Yoga Mat Premium",
        category: "sports",
        price: 39.99,
        in_stock: true,
        rating: 4.6,
    },
];

/// Look up a product by exact ID.
pub fn find(product_id: &str) -> Option<&'static Product> {
    CATALOG.iter().find(|p| p.id == product_id)
}

/// Products whose name or category contains `query` (case-insensitive),
/// optionally restricted to one category, in catalog order.
pub fn search(query: &str, category: Option<&str>, max_results: usize) -> Vec<Product> {
    let query = query.to_lowercase();
    let category = category.map(str::to_lowercase);
    CATALOG
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&query) || p.category.contains(&query))
        .filter(|p| category.as_deref().is_none_or(|c| p.category == c))
        .take(max_results)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn headphones_matches_one_product() {
        assert_eq!(ids(&search("headphones", None, 5)), ["P001"]);
    }

    #[test]
    fn query_matches_category() {
        assert_eq!(ids(&search("Electronics", None, 5)), ["P001", "P003", "P006"]);
    }

    #[test]
    fn category_filter_and_limit() {
        assert_eq!(ids(&search("e", Some("ELECTRONICS"), 2)), ["P001", "P003"]);
        assert!(search("shoes", Some("books"), 5).is_empty());
    }

    #[test]
    fn no_match_is_empty() {
        assert!(search("submarine", None, 5).is_empty());
    }

    #[test]
    fn find_by_id() {
        assert_eq!(find("P007").map(|p| p.name), Some("Yoga Mat Premium"));
        assert!(find("p007").is_none());
    }
}
