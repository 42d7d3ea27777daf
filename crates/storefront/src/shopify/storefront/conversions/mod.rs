//! Type conversion functions for Shopify Storefront API responses.
//!
//! Everything here is pure: raw response structs in, domain types out.

pub mod cart;
pub mod collections;
pub mod customer;
pub mod metafields;
pub mod products;

pub use cart::convert_cart;
pub use collections::convert_collection;
pub use customer::{convert_access_token, convert_customer};
pub use products::{PLACEHOLDER_IMAGE_URL, convert_product, convert_product_connection};

use ankkor_core::{CurrencyCode, Price};
use tracing::warn;

use crate::shopify::types::{CartUserError, Image, PageInfo, SelectedOption};

use super::raw::{RawImage, RawMoney, RawPageInfo, RawSelectedOption, RawUserError};

/// Convert a money object, falling back to zero in `fallback` currency.
///
/// Unparsable amounts are logged and treated as zero.
pub(crate) fn convert_money(money: Option<RawMoney>, fallback: &CurrencyCode) -> Price {
    let Some(money) = money else {
        return Price::zero(fallback.clone());
    };
    let currency = money
        .currency_code
        .as_deref()
        .map_or_else(|| fallback.clone(), CurrencyCode::new);
    let Some(amount) = money.amount else {
        return Price::zero(currency);
    };
    Price::parse(&amount, currency.clone()).unwrap_or_else(|e| {
        warn!(error = %e, "Unparsable money amount, using zero");
        Price::zero(currency)
    })
}

/// Currency carried by a money object, if any.
pub(crate) fn currency_of(money: Option<&RawMoney>) -> Option<CurrencyCode> {
    money
        .and_then(|m| m.currency_code.as_deref())
        .map(CurrencyCode::new)
}

/// Convert an image; images without a URL are dropped.
pub(crate) fn convert_image(image: RawImage) -> Option<Image> {
    let url = image.url.filter(|u| !u.is_empty())?;
    Some(Image {
        id: image.id,
        url,
        alt_text: image.alt_text,
        width: image.width,
        height: image.height,
    })
}

pub(crate) fn convert_selected_options(options: Vec<RawSelectedOption>) -> Vec<SelectedOption> {
    options
        .into_iter()
        .filter_map(|o| {
            Some(SelectedOption {
                name: o.name?,
                value: o.value.unwrap_or_default(),
            })
        })
        .collect()
}

pub(crate) fn convert_page_info(page_info: Option<RawPageInfo>) -> PageInfo {
    let page_info = page_info.unwrap_or_default();
    PageInfo {
        has_next_page: page_info.has_next_page.unwrap_or(false),
        has_previous_page: page_info.has_previous_page.unwrap_or(false),
        start_cursor: page_info.start_cursor,
        end_cursor: page_info.end_cursor,
    }
}

pub(crate) fn convert_user_error(e: RawUserError) -> CartUserError {
    CartUserError {
        code: e.code,
        field: e.field,
        message: e.message.unwrap_or_default(),
    }
}

/// Join user error messages with `"; "`, or `None` when there are none.
pub(crate) fn join_user_errors(errors: Vec<RawUserError>) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .into_iter()
            .map(|e| convert_user_error(e).message)
            .collect::<Vec<_>>()
            .join("; "),
    )
}
