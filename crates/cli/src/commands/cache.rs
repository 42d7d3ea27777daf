//! Catalog cache commands.

use ankkor_storefront::error::AppError;
use ankkor_storefront::state::AppState;

use crate::CacheAction;
use crate::output;

pub async fn run(state: &AppState, action: CacheAction) -> Result<(), AppError> {
    match action {
        CacheAction::Clear => {
            let removed = state.catalog().clear().await?;
            output::line(&format!("Removed {removed} cache entries"));
        }
        CacheAction::Invalidate { handle } => {
            state.catalog().invalidate_product(&handle).await?;
            output::line(&format!("Dropped cached product {handle}"));
        }
    }
    Ok(())
}
