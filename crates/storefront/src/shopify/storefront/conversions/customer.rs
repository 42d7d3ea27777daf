//! Customer type conversion functions.

use ankkor_core::CurrencyCode;

use crate::shopify::types::{Customer, CustomerAccessToken, MailingAddress, OrderSummary};

use super::super::raw::{RawAccessToken, RawAddress, RawCustomer, RawOrder};
use super::{convert_money, currency_of};

pub fn convert_customer(customer: RawCustomer) -> Option<Customer> {
    let id = customer.id.filter(|id| !id.is_empty())?;
    Some(Customer {
        id,
        first_name: customer.first_name,
        last_name: customer.last_name,
        email: customer.email,
        phone: customer.phone,
        accepts_marketing: customer.accepts_marketing.unwrap_or(false),
        default_address: customer.default_address.and_then(convert_address),
        addresses: customer
            .addresses
            .map(|c| c.into_nodes().filter_map(convert_address).collect())
            .unwrap_or_default(),
        orders: customer
            .orders
            .map(|c| c.into_nodes().filter_map(convert_order).collect())
            .unwrap_or_default(),
    })
}

fn convert_address(address: RawAddress) -> Option<MailingAddress> {
    Some(MailingAddress {
        id: address.id?,
        first_name: address.first_name,
        last_name: address.last_name,
        address1: address.address1,
        address2: address.address2,
        city: address.city,
        province: address.province,
        zip: address.zip,
        country: address.country,
        phone: address.phone,
    })
}

fn convert_order(order: RawOrder) -> Option<OrderSummary> {
    let id = order.id?;
    let currency: CurrencyCode = currency_of(order.total_price.as_ref()).unwrap_or_default();
    let item_count = order
        .line_items
        .map(|c| {
            c.into_nodes()
                .filter_map(|item| item.quantity)
                .map(|q| u32::try_from(q.max(0)).unwrap_or(u32::MAX))
                .fold(0u32, u32::saturating_add)
        })
        .unwrap_or(0);
    Some(OrderSummary {
        id,
        order_number: order.order_number.unwrap_or_default(),
        processed_at: order.processed_at,
        total: convert_money(order.total_price, &currency),
        financial_status: order.financial_status,
        fulfillment_status: order.fulfillment_status,
        item_count,
    })
}

/// Both the token and its expiry are required.
pub fn convert_access_token(token: RawAccessToken) -> Option<CustomerAccessToken> {
    Some(CustomerAccessToken {
        access_token: token.access_token.filter(|t| !t.is_empty())?,
        expires_at: token.expires_at.unwrap_or_default(),
    })
}
