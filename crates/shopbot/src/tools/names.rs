//! Canonical tool name constants.

pub const SEARCH_PRODUCTS: &str = "search_products";
pub const GET_ORDER_STATUS: &str = "get_order_status";
pub const ADD_TO_CART: &str = "add_to_cart";
pub const GET_CART_CONTENTS: &str = "get_cart_contents";
pub const APPLY_DISCOUNT_CODE: &str = "apply_discount_code";
pub const GET_PRODUCT_RECOMMENDATIONS: &str = "get_product_recommendations";

/// Every tool name, in declaration order.
pub const ALL: [&str; 6] = [
    SEARCH_PRODUCTS,
    GET_ORDER_STATUS,
    ADD_TO_CART,
    GET_CART_CONTENTS,
    APPLY_DISCOUNT_CODE,
    GET_PRODUCT_RECOMMENDATIONS,
];
