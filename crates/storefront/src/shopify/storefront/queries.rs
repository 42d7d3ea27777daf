//! GraphQL operation definitions for the Shopify Storefront API.
//!
//! Documents live in `graphql/storefront/` and are compiled in with
//! `include_str!`. Each operation implements [`GraphQLQuery`] by hand so the
//! client can stay generic over `Variables`/`ResponseData` without needing the
//! introspection schema at build time.

use graphql_client::{GraphQLQuery, QueryBody};

const PRODUCTS_DOCUMENT: &str = concat!(
    include_str!("../../../graphql/storefront/queries/products.graphql"),
    include_str!("../../../graphql/storefront/fragments/product.graphql"),
);

const COLLECTIONS_DOCUMENT: &str = concat!(
    include_str!("../../../graphql/storefront/queries/collections.graphql"),
    include_str!("../../../graphql/storefront/fragments/product.graphql"),
);

const CART_DOCUMENT: &str = concat!(
    include_str!("../../../graphql/storefront/queries/cart.graphql"),
    include_str!("../../../graphql/storefront/fragments/cart.graphql"),
);

const CUSTOMER_DOCUMENT: &str =
    include_str!("../../../graphql/storefront/queries/customer.graphql");

/// Declare an operation marker type bound to a document and a variables /
/// response module.
macro_rules! storefront_operation {
    ($name:ident, $module:ident, $document:expr) => {
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $document,
                    operation_name: stringify!($name),
                }
            }
        }
    };
}

// Product queries
storefront_operation!(GetProducts, get_products, PRODUCTS_DOCUMENT);
storefront_operation!(GetProductByHandle, get_product_by_handle, PRODUCTS_DOCUMENT);

// Collection queries
storefront_operation!(
    GetCollectionByHandle,
    get_collection_by_handle,
    COLLECTIONS_DOCUMENT
);

// Cart mutations and queries
storefront_operation!(CreateCart, create_cart, CART_DOCUMENT);
storefront_operation!(GetCart, get_cart, CART_DOCUMENT);
storefront_operation!(AddToCart, add_to_cart, CART_DOCUMENT);
storefront_operation!(UpdateCartLines, update_cart_lines, CART_DOCUMENT);
storefront_operation!(RemoveFromCart, remove_from_cart, CART_DOCUMENT);

// Customer mutations and queries
storefront_operation!(CustomerCreate, customer_create, CUSTOMER_DOCUMENT);
storefront_operation!(
    CustomerAccessTokenCreate,
    customer_access_token_create,
    CUSTOMER_DOCUMENT
);
storefront_operation!(GetCustomer, get_customer, CUSTOMER_DOCUMENT);

pub mod get_products {
    use serde::{Deserialize, Serialize};

    use super::super::raw::{Connection, RawProduct};

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub first: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub after: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub query: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        #[serde(default)]
        pub products: Option<Connection<RawProduct>>,
    }
}

pub mod get_product_by_handle {
    use serde::{Deserialize, Serialize};

    use super::super::raw::RawProduct;

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        #[serde(default)]
        pub product: Option<RawProduct>,
    }
}

pub mod get_collection_by_handle {
    use serde::{Deserialize, Serialize};

    use super::super::raw::RawCollection;

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        #[serde(default)]
        pub collection: Option<RawCollection>,
    }
}

pub mod create_cart {
    use serde::{Deserialize, Serialize};

    use super::super::raw::RawCartPayload;
    use crate::shopify::types::CartLineInput;

    #[derive(Debug, Clone, Serialize)]
    pub struct CartInput {
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CartInput,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        #[serde(default)]
        pub cart_create: Option<RawCartPayload>,
    }
}

pub mod get_cart {
    use serde::{Deserialize, Serialize};

    use super::super::raw::RawCart;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        #[serde(default)]
        pub cart: Option<RawCart>,
    }
}

pub mod add_to_cart {
    use serde::{Deserialize, Serialize};

    use super::super::raw::RawCartPayload;
    use crate::shopify::types::CartLineInput;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        #[serde(default)]
        pub cart_lines_add: Option<RawCartPayload>,
    }
}

pub mod update_cart_lines {
    use serde::{Deserialize, Serialize};

    use super::super::raw::RawCartPayload;
    use crate::shopify::types::CartLineUpdateInput;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineUpdateInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        #[serde(default)]
        pub cart_lines_update: Option<RawCartPayload>,
    }
}

pub mod remove_from_cart {
    use serde::{Deserialize, Serialize};

    use super::super::raw::RawCartPayload;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub line_ids: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        #[serde(default)]
        pub cart_lines_remove: Option<RawCartPayload>,
    }
}

pub mod customer_create {
    use serde::{Deserialize, Serialize};

    use super::super::raw::{RawCustomer, RawUserError};
    use crate::shopify::types::CustomerCreateInput;

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CustomerCreateInput,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        #[serde(default)]
        pub customer: Option<RawCustomer>,
        #[serde(default)]
        pub customer_user_errors: Option<Vec<RawUserError>>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        #[serde(default)]
        pub customer_create: Option<Payload>,
    }
}

pub mod customer_access_token_create {
    use serde::{Deserialize, Serialize};

    use super::super::raw::{RawAccessToken, RawUserError};

    #[derive(Debug, Clone, Serialize)]
    pub struct CustomerAccessTokenCreateInput {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CustomerAccessTokenCreateInput,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        #[serde(default)]
        pub customer_access_token: Option<RawAccessToken>,
        #[serde(default)]
        pub customer_user_errors: Option<Vec<RawUserError>>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        #[serde(default)]
        pub customer_access_token_create: Option<Payload>,
    }
}

pub mod get_customer {
    use serde::{Deserialize, Serialize};

    use super::super::raw::RawCustomer;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub customer_access_token: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        #[serde(default)]
        pub customer: Option<RawCustomer>,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_names_the_operation() {
        let body = GetProductByHandle::build_query(get_product_by_handle::Variables {
            handle: "linen-shirt".to_string(),
        });
        assert_eq!(body.operation_name, "GetProductByHandle");
        assert!(body.query.contains("query GetProductByHandle"));
        assert!(body.query.contains("fragment ProductFields on Product"));
    }

    #[test]
    fn test_variables_serialize_camel_case() {
        let body = RemoveFromCart::build_query(remove_from_cart::Variables {
            cart_id: "gid://shopify/Cart/1".to_string(),
            line_ids: vec!["gid://shopify/CartLine/1".to_string()],
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["operationName"], "RemoveFromCart");
        assert_eq!(json["variables"]["cartId"], "gid://shopify/Cart/1");
        assert_eq!(json["variables"]["lineIds"][0], "gid://shopify/CartLine/1");
    }

    #[test]
    fn test_cart_document_defines_every_cart_operation() {
        for name in [
            "mutation CreateCart",
            "query GetCart",
            "mutation AddToCart",
            "mutation UpdateCartLines",
            "mutation RemoveFromCart",
            "fragment CartFields on Cart",
        ] {
            assert!(CART_DOCUMENT.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_optional_product_variables_are_omitted() {
        let body = GetProducts::build_query(get_products::Variables {
            first: 20,
            after: None,
            query: None,
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["variables"], serde_json::json!({ "first": 20 }));
    }
}
