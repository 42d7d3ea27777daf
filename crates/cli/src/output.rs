//! Terminal output.
//!
//! Everything the CLI prints for the user goes through here; logs go to
//! stderr through `tracing`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use ankkor_storefront::error::AppError;
use ankkor_storefront::seo_audit::SeoReport;
use ankkor_storefront::shopify::types::{
    Collection, Customer, CustomerAccessToken, Product, ProductVariant,
};
use ankkor_storefront::stores::{CartState, SimpleCartStore, WishlistItem};

pub fn error(err: &AppError) {
    eprintln!("error: {}", err.user_message());
}

pub fn line(message: &str) {
    println!("{message}");
}

pub fn products(products: &[Product], total: usize) {
    for product in products {
        let stock = if product.available_for_sale { "" } else { "  (sold out)" };
        println!(
            "{:<40} {:>12}  {}{stock}",
            product.title,
            product.price().display(),
            product.handle
        );
    }
    println!("{} of {total} products", products.len());
}

pub fn product(product: &Product, selected: Option<&ProductVariant>) {
    println!("{}", product.title);
    println!("  handle:   {}", product.handle);
    println!("  id:       {}", product.id);
    println!("  price:    {}", product.price().display());
    println!("  material: {}", product.material);
    if !product.product_type.is_empty() {
        println!("  type:     {}", product.product_type);
    }
    for option in &product.options {
        println!("  {}: {}", option.name, option.values.join(" / "));
    }
    for (key, value) in &product.metafields {
        println!("  {key}: {value}");
    }

    println!("  variants:");
    for variant in &product.variants {
        let marker = if selected.is_some_and(|s| s.id == variant.id) { "*" } else { " " };
        let sale = variant
            .compare_at_price
            .as_ref()
            .filter(|_| variant.is_on_sale())
            .map(|was| format!(" (was {})", was.display()))
            .unwrap_or_default();
        let stock = if variant.available_for_sale { "" } else { "  sold out" };
        println!(
            "  {marker} {:<24} {:>12}{sale}{stock}  {}",
            variant.title,
            variant.price.display(),
            variant.id
        );
    }
    if selected.is_none() {
        println!("  no variant matches the selected options");
    }
}

pub fn collection(collection: &Collection) {
    println!("{} ({})", collection.title, collection.handle);
    if !collection.description.is_empty() {
        println!("  {}", collection.description);
    }
    for product in &collection.products {
        println!("  {:<40} {:>12}", product.title, product.price().display());
    }
}

pub fn cart(state: &CartState) {
    if state.items.is_empty() {
        println!("Cart is empty");
        return;
    }
    for item in &state.items {
        println!(
            "{:>3} x {:<32} {:<12} {:>12}  {}",
            item.quantity,
            item.title,
            item.variant_title,
            item.price.times(item.quantity).display(),
            item.id
        );
    }
    println!("{} items, subtotal {}", state.item_count, state.subtotal.display());
}

pub fn simple_cart(cart: &SimpleCartStore) {
    if cart.items().is_empty() {
        println!("Cart is empty");
        return;
    }
    for item in cart.items() {
        println!(
            "{:>3} x {:<32} {:>12}  {}",
            item.quantity,
            item.title,
            item.price.times(item.quantity).display(),
            item.variant_id
        );
    }
    println!("{} items, subtotal {}", cart.item_count(), cart.subtotal().display());
}

pub fn wishlist(items: &[WishlistItem]) {
    if items.is_empty() {
        println!("Wishlist is empty");
        return;
    }
    for item in items {
        println!(
            "{:<40} {:>12}  {}  {}",
            item.title,
            item.price.display(),
            item.material,
            item.id
        );
    }
}

pub fn customer(customer: &Customer) {
    println!("{}", customer.display_name());
    if let Some(email) = &customer.email {
        println!("  email: {email}");
    }
    if let Some(phone) = &customer.phone {
        println!("  phone: {phone}");
    }
    if let Some(address) = &customer.default_address {
        println!("  address: {}", address.one_line());
    }
    if customer.orders.is_empty() {
        println!("  no orders yet");
    }
    for order in &customer.orders {
        println!(
            "  #{:<8} {:>12}  {} items  {}",
            order.order_number,
            order.total.display(),
            order.item_count,
            order.fulfillment_status.as_deref().unwrap_or("UNFULFILLED")
        );
    }
}

pub fn signed_in(email: &str, token: &CustomerAccessToken) {
    println!("Signed in as {email} (session expires {})", token.expires_at);
}

pub fn seo_report(report: &SeoReport) {
    println!("{report}");
}
