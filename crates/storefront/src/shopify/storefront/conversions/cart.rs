//! Cart type conversion functions.

use ankkor_core::CurrencyCode;
use tracing::warn;

use crate::shopify::types::{Cart, CartCost, CartLine, CartMerchandise, CartMerchandiseProduct};

use super::super::raw::{RawCart, RawCartLine};
use super::{convert_image, convert_money, convert_selected_options, currency_of};

/// Normalize a raw cart. Returns `None` when the cart has no ID.
pub fn convert_cart(cart: RawCart) -> Option<Cart> {
    let id = cart.id.filter(|id| !id.is_empty())?;
    let cost = cart.cost.unwrap_or_default();
    let currency = currency_of(cost.total_amount.as_ref())
        .or_else(|| currency_of(cost.subtotal_amount.as_ref()))
        .unwrap_or_default();

    let lines: Vec<CartLine> = cart
        .lines
        .map(|c| {
            c.into_nodes()
                .filter_map(|line| convert_cart_line(line, &currency))
                .collect()
        })
        .unwrap_or_default();

    let total_quantity = cart
        .total_quantity
        .map_or_else(
            || lines.iter().fold(0u32, |total, l| total.saturating_add(l.quantity)),
            clamp_quantity,
        );

    Some(Cart {
        id,
        checkout_url: cart.checkout_url.unwrap_or_default(),
        total_quantity,
        note: cart.note,
        cost: CartCost {
            subtotal: convert_money(cost.subtotal_amount, &currency),
            total: convert_money(cost.total_amount, &currency),
            total_tax: cost.total_tax_amount.map(|t| convert_money(Some(t), &currency)),
        },
        lines,
    })
}

fn convert_cart_line(line: RawCartLine, currency: &CurrencyCode) -> Option<CartLine> {
    let id = line.id.filter(|id| !id.is_empty())?;
    let Some(merchandise) = line.merchandise else {
        warn!(line_id = %id, "Cart line has no merchandise, skipping");
        return None;
    };
    let quantity = line.quantity.map_or(0, clamp_quantity);
    let cost = line.cost.unwrap_or_default();

    let unit_price = convert_money(merchandise.price, currency);
    let amount_per_quantity = cost
        .amount_per_quantity
        .map_or_else(|| unit_price.clone(), |m| convert_money(Some(m), currency));
    let total_amount = cost
        .total_amount
        .map_or_else(|| amount_per_quantity.times(quantity), |m| {
            convert_money(Some(m), currency)
        });
    let product = merchandise.product.unwrap_or_default();

    Some(CartLine {
        id,
        quantity,
        amount_per_quantity,
        total_amount,
        merchandise: CartMerchandise {
            id: merchandise.id.unwrap_or_default(),
            title: merchandise.title.unwrap_or_default(),
            price: unit_price,
            selected_options: convert_selected_options(merchandise.selected_options),
            image: merchandise.image.and_then(convert_image),
            product: CartMerchandiseProduct {
                id: product.id.unwrap_or_default(),
                handle: product.handle.unwrap_or_default(),
                title: product.title.unwrap_or_default(),
            },
        },
    })
}

fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity.max(0)).unwrap_or(u32::MAX)
}
