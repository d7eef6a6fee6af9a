use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use supplyflow_auth::Role;
use supplyflow_cart::CartMutation;
use supplyflow_catalog::{ProductId, UnitRef, VariantId};
use supplyflow_core::AggregateId;
use supplyflow_infra::PlacementRequest;
use supplyflow_orders::{DeliveryPreference, Order, OrderStatus, ShippingInfo};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Identifies a sellable unit: a product, optionally narrowed to a variant.
#[derive(Debug, Deserialize)]
pub struct UnitRequest {
    pub unit_id: String,
    pub variant_id: Option<String>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub recipient_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: Option<String>,
    #[serde(default)]
    pub delivery_preference: DeliveryPreference,
    pub notes: Option<String>,
}

impl PlaceOrderRequest {
    pub fn into_placement(self) -> PlacementRequest {
        PlacementRequest {
            shipping: ShippingInfo {
                recipient_name: self.recipient_name,
                phone: self.phone,
                address: self.address,
                city: self.city,
                postal_code: self.postal_code,
            },
            delivery_preference: self.delivery_preference,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: String,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUnitRequest {
    /// Omit to list a brand-new product.
    pub unit_id: Option<String>,
    pub variant_id: Option<String>,
    pub name: String,
    pub base_price: Decimal,
    #[serde(default)]
    pub price_adjustment: Decimal,
    pub on_hand: i64,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub unit_id: String,
    pub variant_id: Option<String>,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

/// Result of a cart mutation, shaped for the storefront UI.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub remaining_inventory: i64,
    pub cart_count: i64,
    pub product_cart_quantity: i64,
}

impl CartResponse {
    pub fn from_mutation(mutation: CartMutation, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            remaining_inventory: mutation.remaining_inventory,
            cart_count: mutation.cart_count,
            product_cart_quantity: mutation.product_cart_quantity,
        }
    }
}

/// An order plus the statuses the caller's role may move it to next.
#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub allowed_next_statuses: Vec<OrderStatus>,
}

impl OrderView {
    pub fn for_role(order: Order, role: Role) -> Self {
        let allowed_next_statuses = order.next_statuses_for(role);
        Self {
            order,
            allowed_next_statuses,
        }
    }
}

// -------------------------
// Parsing helpers
// -------------------------

pub fn parse_id(field: &'static str, raw: &str) -> Result<AggregateId, axum::response::Response> {
    raw.trim().parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            format!("{field} is not a valid id"),
        )
    })
}

pub fn parse_unit(
    unit_id: &str,
    variant_id: Option<&str>,
) -> Result<UnitRef, axum::response::Response> {
    let product = ProductId::new(parse_id("unit_id", unit_id)?);
    match variant_id {
        Some(v) => Ok(UnitRef::variant(product, VariantId::new(parse_id("variant_id", v)?))),
        None => Ok(UnitRef::product(product)),
    }
}

pub fn parse_status(raw: &str) -> Result<OrderStatus, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_status",
            format!("unknown order status '{raw}'"),
        )
    })
}
