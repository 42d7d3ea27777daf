//! Collection type conversion functions.

use crate::shopify::types::Collection;

use super::super::raw::RawCollection;
use super::{convert_image, convert_product};

pub fn convert_collection(collection: RawCollection) -> Option<Collection> {
    let id = collection.id.filter(|id| !id.is_empty())?;
    Some(Collection {
        id,
        handle: collection.handle.unwrap_or_default(),
        title: collection.title.unwrap_or_default(),
        description: collection.description.unwrap_or_default(),
        image: collection.image.and_then(convert_image),
        products: collection
            .products
            .map(|c| c.into_nodes().filter_map(convert_product).collect())
            .unwrap_or_default(),
    })
}
