//! Persisted client-side stores.
//!
//! - [`CartStore`] mirrors a Shopify cart; every mutation round-trips to the
//!   server and replaces local state with the returned cart.
//! - [`SimpleCartStore`] is an offline cart for demo mode.
//! - [`WishlistStore`] never touches the network.
//! - [`CustomerSessionStore`] keeps the signed-in customer's access token.
//!
//! All of them persist through [`crate::storage`] after each change.

pub mod cart;
pub mod customer;
pub mod simple_cart;
pub mod wishlist;

pub use cart::{CartItem, CartState, CartStore};
pub use customer::{CustomerSession, CustomerSessionStore};
pub use simple_cart::{SimpleCartItem, SimpleCartStore};
pub use wishlist::{WishlistItem, WishlistStore};
