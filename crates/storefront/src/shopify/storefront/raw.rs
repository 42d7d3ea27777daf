//! Permissive mirrors of Storefront API response shapes.
//!
//! Every field is optional and `null` is accepted wherever a list is
//! expected, so a partially populated response still deserializes. The
//! normalizers in `conversions` decide what a missing field means.

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` like an absent field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Connections
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Connection<T> {
    #[serde(default = "Vec::new", deserialize_with = "nullable")]
    pub edges: Vec<Edge<T>>,
    #[serde(default)]
    pub page_info: Option<RawPageInfo>,
}

impl<T> Connection<T> {
    /// Nodes in order, skipping null edges and null nodes.
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().filter_map(|edge| edge.node)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Edge<T> {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub node: Option<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPageInfo {
    #[serde(default)]
    pub has_next_page: Option<bool>,
    #[serde(default)]
    pub has_previous_page: Option<bool>,
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

// =============================================================================
// Shared shapes
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMoney {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSelectedOption {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUserError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub field: Option<Vec<String>>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub available_for_sale: Option<bool>,
    #[serde(default)]
    pub quantity_available: Option<i64>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<RawMoney>,
    #[serde(default)]
    pub compare_at_price: Option<RawMoney>,
    #[serde(default, deserialize_with = "nullable")]
    pub selected_options: Vec<RawSelectedOption>,
    #[serde(default)]
    pub image: Option<RawImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProductOption {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPriceRange {
    #[serde(default)]
    pub min_variant_price: Option<RawMoney>,
    #[serde(default)]
    pub max_variant_price: Option<RawMoney>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCollectionRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_html: Option<String>,
    #[serde(default)]
    pub available_for_sale: Option<bool>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured_image: Option<RawImage>,
    #[serde(default)]
    pub images: Option<Connection<RawImage>>,
    #[serde(default, deserialize_with = "nullable")]
    pub options: Vec<RawProductOption>,
    #[serde(default)]
    pub variants: Option<Connection<RawVariant>>,
    #[serde(default)]
    pub collections: Option<Connection<RawCollectionRef>>,
    #[serde(default)]
    pub price_range: Option<RawPriceRange>,
    /// Left untyped: arrays, namespaced objects and flat objects all occur.
    #[serde(default)]
    pub metafields: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCollection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<RawImage>,
    #[serde(default)]
    pub products: Option<Connection<RawProduct>>,
}

// =============================================================================
// Carts
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCartCost {
    #[serde(default)]
    pub subtotal_amount: Option<RawMoney>,
    #[serde(default)]
    pub total_amount: Option<RawMoney>,
    #[serde(default)]
    pub total_tax_amount: Option<RawMoney>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCartLineCost {
    #[serde(default)]
    pub amount_per_quantity: Option<RawMoney>,
    #[serde(default)]
    pub total_amount: Option<RawMoney>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMerchandiseProduct {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMerchandise {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<RawMoney>,
    #[serde(default, deserialize_with = "nullable")]
    pub selected_options: Vec<RawSelectedOption>,
    #[serde(default)]
    pub image: Option<RawImage>,
    #[serde(default)]
    pub product: Option<RawMerchandiseProduct>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCartLine {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub cost: Option<RawCartLineCost>,
    #[serde(default)]
    pub merchandise: Option<RawMerchandise>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCart {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub checkout_url: Option<String>,
    #[serde(default)]
    pub total_quantity: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub cost: Option<RawCartCost>,
    #[serde(default)]
    pub lines: Option<Connection<RawCartLine>>,
}

/// Payload shared by the cart mutations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCartPayload {
    #[serde(default)]
    pub cart: Option<RawCart>,
    #[serde(default, deserialize_with = "nullable")]
    pub user_errors: Vec<RawUserError>,
}

// =============================================================================
// Customers
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAddress {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrderLineItem {
    #[serde(default)]
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub order_number: Option<i64>,
    #[serde(default)]
    pub processed_at: Option<String>,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub fulfillment_status: Option<String>,
    #[serde(default)]
    pub total_price: Option<RawMoney>,
    #[serde(default)]
    pub line_items: Option<Connection<RawOrderLineItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCustomer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub accepts_marketing: Option<bool>,
    #[serde(default)]
    pub default_address: Option<RawAddress>,
    #[serde(default)]
    pub addresses: Option<Connection<RawAddress>>,
    #[serde(default)]
    pub orders: Option<Connection<RawOrder>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAccessToken {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}
