//! External services other than Shopify.
//!
//! - `emailjs` - Contact form relay

pub mod emailjs;

pub use emailjs::{ContactError, ContactMessage, EmailJsClient};
