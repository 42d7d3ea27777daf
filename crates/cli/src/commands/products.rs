//! Catalog commands.

use ankkor_storefront::error::AppError;
use ankkor_storefront::shopify::types::SelectedOption;
use ankkor_storefront::state::AppState;

use crate::output;

/// Parse a `Name=Value` option selection.
pub fn parse_option(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected Name=Value, got {raw:?}"))?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() {
        return Err(format!("expected Name=Value, got {raw:?}"));
    }
    Ok((name.to_string(), value.to_string()))
}

pub async fn list(state: &AppState, refresh: bool, first: usize) -> Result<(), AppError> {
    let catalog = state.catalog();
    let products = if refresh {
        catalog.refresh_products().await?
    } else {
        catalog.get_all_products().await?
    };

    let shown: Vec<_> = products.iter().take(first).cloned().collect();
    output::products(&shown, products.len());
    Ok(())
}

pub async fn show(
    state: &AppState,
    handle: &str,
    options: Vec<(String, String)>,
    refresh: bool,
) -> Result<(), AppError> {
    let catalog = state.catalog();
    let product = if refresh {
        catalog.refresh_product(handle).await?
    } else {
        catalog.get_product_by_handle(handle).await?
    };

    let selection: Vec<SelectedOption> = options
        .into_iter()
        .map(|(name, value)| SelectedOption { name, value })
        .collect();
    output::product(&product, product.select_variant(&selection));
    Ok(())
}

pub async fn collection(state: &AppState, handle: &str, first: i64) -> Result<(), AppError> {
    let collection = state
        .storefront()
        .get_collection_by_handle(handle, first)
        .await?;
    output::collection(&collection);
    Ok(())
}
