//! Cart commands.
//!
//! `NEXT_PUBLIC_USE_SHOPIFY_CART` picks the backing store: the Shopify cart,
//! where lines are addressed by cart line ID, or the offline simple cart,
//! where they are addressed by variant ID.

use ankkor_storefront::checkout::checkout_simple_cart;
use ankkor_storefront::error::{AppError, add_breadcrumb};
use ankkor_storefront::shopify::types::Product;
use ankkor_storefront::state::AppState;
use ankkor_storefront::stores::{SimpleCartItem, SimpleCartStore};

use crate::CartAction;
use crate::commands::gid;
use crate::output;

pub async fn run(state: &AppState, action: CartAction) -> Result<(), AppError> {
    if state.config().use_shopify_cart {
        shopify_cart(state, resolve_ids(action, "CartLine")?).await
    } else {
        simple_cart(state, resolve_ids(action, "ProductVariant")?).await
    }
}

/// Expand bare ids; `line_resource` is what a line is addressed by.
fn resolve_ids(action: CartAction, line_resource: &str) -> Result<CartAction, AppError> {
    Ok(match action {
        CartAction::Add { variant, quantity } => CartAction::Add {
            variant: gid("ProductVariant", &variant)?,
            quantity,
        },
        CartAction::Update { line, quantity } => CartAction::Update {
            line: gid(line_resource, &line)?,
            quantity,
        },
        CartAction::Remove { line } => CartAction::Remove {
            line: gid(line_resource, &line)?,
        },
        other => other,
    })
}

async fn shopify_cart(state: &AppState, action: CartAction) -> Result<(), AppError> {
    let cart = state.cart();
    cart.init().await?;

    let snapshot = match action {
        CartAction::Show => cart.snapshot().await,
        CartAction::Add { variant, quantity } => {
            add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", variant.as_str())][..]));
            cart.add_item(&variant, quantity).await?
        }
        CartAction::Update { line, quantity } => cart.update_item(&line, quantity).await?,
        CartAction::Remove { line } => cart.remove_item(&line).await?,
        CartAction::Clear => cart.clear().await?,
        CartAction::Checkout => {
            let url = cart.checkout_url().await?;
            add_breadcrumb("checkout", "Redirected to checkout", None);
            output::line(&format!("Checkout: {url}"));
            return Ok(());
        }
    };

    output::cart(&snapshot);
    Ok(())
}

async fn simple_cart(state: &AppState, action: CartAction) -> Result<(), AppError> {
    let mut cart = state.simple_cart();

    match action {
        CartAction::Show => {}
        CartAction::Add { variant, quantity } => {
            let products = state.catalog().get_all_products().await?;
            let item = simple_item(&products, &variant, quantity)
                .ok_or_else(|| AppError::NotFound(format!("Variant {variant}")))?;
            add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", variant.as_str())][..]));
            cart.add_item(item)?;
        }
        CartAction::Update { line, quantity } => {
            let id = product_id_for(&cart, &line)?;
            cart.update_quantity(&id, &line, quantity)?;
        }
        CartAction::Remove { line } => {
            let id = product_id_for(&cart, &line)?;
            cart.remove_item(&id, &line)?;
        }
        CartAction::Clear => cart.clear()?,
        CartAction::Checkout => {
            let url = checkout_simple_cart(state.storefront(), cart.items()).await?;
            add_breadcrumb("checkout", "Redirected to checkout", None);
            output::line(&format!("Checkout: {url}"));
            return Ok(());
        }
    }

    output::simple_cart(&cart);
    Ok(())
}

/// Find the product owning a variant line in the offline cart.
fn product_id_for(cart: &SimpleCartStore, variant_id: &str) -> Result<String, AppError> {
    cart.items()
        .iter()
        .find(|item| item.variant_id == variant_id)
        .map(|item| item.id.clone())
        .ok_or_else(|| AppError::NotFound(format!("Cart line {variant_id}")))
}

/// Build an offline cart line for a variant from the catalog.
fn simple_item(products: &[Product], variant_id: &str, quantity: u32) -> Option<SimpleCartItem> {
    products.iter().find_map(|product| {
        let variant = product.variant(variant_id)?;
        let title = if variant.title.is_empty() || product.variants.len() == 1 {
            product.title.clone()
        } else {
            format!("{} - {}", product.title, variant.title)
        };
        Some(SimpleCartItem {
            id: product.id.clone(),
            variant_id: variant.id.clone(),
            title,
            price: variant.price.clone(),
            quantity,
            image_url: Some(
                variant
                    .image
                    .as_ref()
                    .map_or_else(|| product.featured_image.url.clone(), |i| i.url.clone()),
            ),
            currency_code: variant.price.currency_code.clone(),
        })
    })
}
