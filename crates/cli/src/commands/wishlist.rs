//! Wishlist commands.

use ankkor_storefront::error::AppError;
use ankkor_storefront::state::AppState;
use ankkor_storefront::stores::WishlistItem;

use crate::WishlistAction;
use crate::commands::gid;
use crate::output;

pub async fn run(state: &AppState, action: WishlistAction) -> Result<(), AppError> {
    let mut wishlist = state.wishlist();

    match action {
        WishlistAction::List => {}
        WishlistAction::Add { handle } => {
            let product = state.catalog().get_product_by_handle(&handle).await?;
            if !wishlist.add(WishlistItem::from(&product))? {
                output::line(&format!("{} is already in your wishlist", product.title));
            }
        }
        WishlistAction::Remove { id } => {
            let id = gid("Product", &id)?;
            if !wishlist.remove(&id)? {
                return Err(AppError::NotFound(format!("Wishlist item {id}")));
            }
        }
        WishlistAction::Clear => wishlist.clear()?,
    }

    output::wishlist(wishlist.items());
    Ok(())
}
