//! Contact form relay command.

use ankkor_storefront::error::AppError;
use ankkor_storefront::services::ContactMessage;
use ankkor_storefront::state::AppState;

use crate::output;

pub async fn send(
    state: &AppState,
    from_name: String,
    from_email: String,
    subject: String,
    message: String,
) -> Result<(), AppError> {
    let message = ContactMessage {
        from_name,
        from_email,
        subject,
        message,
    };

    state.contact()?.send(&message).await?;
    output::line("Message sent. We'll get back to you soon.");
    Ok(())
}
