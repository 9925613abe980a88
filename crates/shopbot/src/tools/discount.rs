//! Discount code validation.
//!
//! Codes are checked but never applied to cart totals.

use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percentage,
    FreeShipping,
}

#[derive(Debug, Clone, Copy)]
struct Discount {
    code: &'static str,
    kind: DiscountKind,
    value: u32,
}

const VALID_CODES: [Discount; 3] = [
    Discount {
        code: "WELCOME10",
        kind: DiscountKind::Percentage,
        value: 10,
    },
    Discount {
        code: "SAVE20",
        kind: DiscountKind::Percentage,
        value: 20,
    },
    Discount {
        code: "FREESHIP",
        kind: DiscountKind::FreeShipping,
        value: 0,
    },
];

/// Outcome of a discount check, as returned to the model.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DiscountCheck {
    pub valid: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DiscountKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}

/// Check `code` case-insensitively against the known codes.
pub fn check(code: &str) -> DiscountCheck {
    let upper = code.to_uppercase();
    match VALID_CODES.iter().find(|d| d.code == upper) {
        Some(d) => DiscountCheck {
            valid: true,
            message: format!("Discount code '{upper}' applied successfully!"),
            code: upper,
            kind: Some(d.kind),
            value: Some(d.value),
        },
        None => DiscountCheck {
            valid: false,
            code: code.to_string(),
            message: "Invalid discount code.".to_string(),
            kind: None,
            value: None,
        },
    }
}
