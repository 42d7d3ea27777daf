//! Customer account commands.

use ankkor_storefront::error::{AppError, clear_sentry_user, set_sentry_user};
use ankkor_storefront::shopify::ShopifyError;
use ankkor_storefront::shopify::types::CustomerCreateInput;
use ankkor_storefront::state::AppState;
use ankkor_storefront::stores::CustomerSession;
use secrecy::SecretString;

use crate::AccountAction;
use crate::output;

pub async fn run(state: &AppState, action: AccountAction) -> Result<(), AppError> {
    match action {
        AccountAction::Register {
            email,
            password,
            first_name,
            last_name,
            accepts_marketing,
        } => {
            let input = CustomerCreateInput {
                email: email.clone(),
                password: password.clone(),
                first_name,
                last_name,
                accepts_marketing,
            };
            let customer = state.storefront().customer_create(input).await?;
            output::line(&format!("Created account for {}", customer.display_name()));
            login(state, &email, &SecretString::from(password)).await
        }
        AccountAction::Login { email, password } => {
            login(state, &email, &SecretString::from(password)).await
        }
        AccountAction::Show => show(state).await,
        AccountAction::Logout => {
            let mut sessions = state.customer_session();
            let had_session = sessions.sign_out()?;
            clear_sentry_user();
            output::line(if had_session {
                "Signed out"
            } else {
                "Not signed in"
            });
            Ok(())
        }
    }
}

async fn login(state: &AppState, email: &str, password: &SecretString) -> Result<(), AppError> {
    let token = state
        .storefront()
        .customer_access_token_create(email, password)
        .await?;
    output::signed_in(email, &token);

    let mut sessions = state.customer_session();
    sessions.sign_in(CustomerSession::from_token(token, email))?;
    Ok(())
}

async fn show(state: &AppState) -> Result<(), AppError> {
    let mut sessions = state.customer_session();
    let token = sessions
        .current()
        .map(|session| session.access_token.clone())
        .ok_or_else(|| AppError::Unauthorized("No customer session".to_string()))?;

    match state.storefront().get_customer(&token).await {
        Ok(customer) => {
            set_sentry_user(&customer.id, customer.email.as_deref());
            output::customer(&customer);
            Ok(())
        }
        Err(ShopifyError::NotFound(_)) => {
            sessions.sign_out()?;
            Err(AppError::Unauthorized("Customer session expired".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
