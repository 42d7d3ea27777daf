//! Product type conversion functions.
//!
//! A normalized [`Product`] always has at least one image and one variant, so
//! product pages and cart buttons never have to special-case empty lists.

use ankkor_core::CurrencyCode;
use tracing::warn;

use crate::shopify::types::{
    CollectionRef, Image, PriceRange, Product, ProductConnection, ProductOption, ProductVariant,
};

use super::super::raw::{Connection, RawProduct, RawVariant};
use super::metafields::flatten_metafields;
use super::{convert_image, convert_money, convert_page_info, convert_selected_options, currency_of};

/// Image shown when a product has no media.
pub const PLACEHOLDER_IMAGE_URL: &str = "/placeholder-product.jpg";

/// Material shown when the `material` metafield is absent.
pub const DEFAULT_MATERIAL: &str = "Premium Fabric";

/// Title Shopify uses for the single variant of an option-less product.
pub const DEFAULT_VARIANT_TITLE: &str = "Default Title";

/// Normalize a raw product.
///
/// Returns `None` only when the product has no ID, since nothing downstream
/// can address it.
pub fn convert_product(product: RawProduct) -> Option<Product> {
    let Some(id) = product.id.filter(|id| !id.is_empty()) else {
        warn!(handle = ?product.handle, "Dropping product without an ID");
        return None;
    };
    let title = product.title.unwrap_or_default();
    let available_for_sale = product.available_for_sale.unwrap_or(false);

    let price_range = product.price_range.unwrap_or_default();
    let currency = currency_of(price_range.min_variant_price.as_ref()).unwrap_or_default();
    let min_price = convert_money(price_range.min_variant_price, &currency);
    let max_price = price_range
        .max_variant_price
        .map_or_else(|| min_price.clone(), |m| convert_money(Some(m), &currency));

    let mut images: Vec<Image> = product
        .images
        .map(|c| c.into_nodes().filter_map(convert_image).collect())
        .unwrap_or_default();
    if images.is_empty() {
        images.push(placeholder_image(&title));
    }
    let featured_image = product
        .featured_image
        .and_then(convert_image)
        .or_else(|| images.first().cloned())
        .unwrap_or_else(|| placeholder_image(&title));

    let mut variants: Vec<ProductVariant> = product
        .variants
        .map(|c| {
            c.into_nodes()
                .filter_map(|v| convert_variant(v, &currency))
                .collect()
        })
        .unwrap_or_default();
    if variants.is_empty() {
        variants.push(ProductVariant {
            id: format!("{id}-default"),
            title: DEFAULT_VARIANT_TITLE.to_string(),
            available_for_sale,
            quantity_available: None,
            sku: None,
            price: min_price.clone(),
            compare_at_price: None,
            selected_options: vec![],
            image: None,
        });
    }

    let metafields = product
        .metafields
        .as_ref()
        .map(flatten_metafields)
        .unwrap_or_default();
    let material = metafields
        .get("material")
        .filter(|m| !m.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| DEFAULT_MATERIAL.to_string());

    Some(Product {
        id,
        handle: product.handle.unwrap_or_default(),
        title,
        description: product.description.unwrap_or_default(),
        description_html: product.description_html.unwrap_or_default(),
        available_for_sale,
        product_type: product.product_type.unwrap_or_default(),
        vendor: product.vendor.unwrap_or_default(),
        tags: product.tags,
        featured_image,
        images,
        options: product
            .options
            .into_iter()
            .map(|o| ProductOption {
                id: o.id.unwrap_or_default(),
                name: o.name.unwrap_or_default(),
                values: o.values,
            })
            .collect(),
        variants,
        collections: product
            .collections
            .map(|c| {
                c.into_nodes()
                    .map(|r| CollectionRef {
                        id: r.id.unwrap_or_default(),
                        title: r.title.unwrap_or_default(),
                        handle: r.handle.unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        metafields,
        material,
        price_range: PriceRange {
            min_variant_price: min_price,
            max_variant_price: max_price,
        },
    })
}

fn convert_variant(variant: RawVariant, currency: &CurrencyCode) -> Option<ProductVariant> {
    let id = variant.id.filter(|id| !id.is_empty())?;
    Some(ProductVariant {
        id,
        title: variant.title.unwrap_or_default(),
        available_for_sale: variant.available_for_sale.unwrap_or(false),
        quantity_available: variant.quantity_available,
        sku: variant.sku.filter(|s| !s.is_empty()),
        price: convert_money(variant.price, currency),
        compare_at_price: variant.compare_at_price.map(|p| convert_money(Some(p), currency)),
        selected_options: convert_selected_options(variant.selected_options),
        image: variant.image.and_then(convert_image),
    })
}

fn placeholder_image(title: &str) -> Image {
    Image {
        id: None,
        url: PLACEHOLDER_IMAGE_URL.to_string(),
        alt_text: Some(title.to_string()),
        width: None,
        height: None,
    }
}

pub fn convert_product_connection(conn: Connection<RawProduct>) -> ProductConnection {
    let page_info = convert_page_info(conn.page_info.clone());
    ProductConnection {
        products: conn.into_nodes().filter_map(convert_product).collect(),
        page_info,
    }
}
