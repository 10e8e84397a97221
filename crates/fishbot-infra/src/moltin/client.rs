//! MoltinClient -- concrete [`CommerceApi`] implementation for Moltin.
//!
//! Talks to the Moltin REST API with a bearer token obtained once via the
//! client-credentials exchange. Each chat maps to one Moltin cart named
//! after the chat id.
//!
//! The token is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use fishbot_core::commerce::CommerceApi;
use fishbot_types::catalog::{CartLine, Product, ProductSummary};
use fishbot_types::error::CommerceError;
use fishbot_types::ids::{ChatId, ProductId};

use super::types::{
    AddItemRequest, CartItemsResponse, CartResponse, FileResponse, ProductDetailResponse,
    ProductListResponse, TokenResponse,
};

/// Moltin commerce client.
///
/// Implements [`CommerceApi`] for the Moltin v2 REST API.
///
/// # Token security
///
/// The bearer token is stored as a [`SecretString`] and is only exposed
/// when building the `Authorization` header. It never appears in Debug
/// output or tracing logs.
pub struct MoltinClient {
    client: reqwest::Client,
    token: SecretString,
    base_url: String,
}

// MoltinClient intentionally does NOT derive Debug so the bearer token
// cannot leak through formatting.

impl MoltinClient {
    /// Build a client around an already-exchanged bearer token.
    pub fn new(token: SecretString, base_url: String) -> Self {
        Self {
            client: http_client(),
            token,
            base_url,
        }
    }

    /// Exchange client credentials for a bearer token, then build the
    /// client. Called once at startup; `CommerceError::Auth` here means
    /// the credentials are wrong and the process should not continue.
    pub async fn authenticate(
        base_url: String,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<Self, CommerceError> {
        let client = http_client();
        let token =
            fetch_access_token(&client, &base_url, client_id, client_secret).await?;
        Ok(Self {
            client,
            token,
            base_url,
        })
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, CommerceError> {
        self.client
            .get(self.url(path))
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| CommerceError::Request(format!("GET {path}: {e}")))
    }

    /// Resolve a file id to its public URL.
    async fn file_link(&self, file_id: &str) -> Result<String, CommerceError> {
        let response = self.get(&format!("/v2/files/{file_id}")).await?;
        let response = check_status(response, file_id).await?;
        let file: FileResponse = response
            .json()
            .await
            .map_err(|e| CommerceError::Decode(format!("file response: {e}")))?;
        Ok(file.data.link.href)
    }
}

impl CommerceApi for MoltinClient {
    async fn list_products(&self) -> Result<Vec<ProductSummary>, CommerceError> {
        let response = self.get("/v2/products").await?;
        let response = check_status(response, "products").await?;
        let list: ProductListResponse = response
            .json()
            .await
            .map_err(|e| CommerceError::Decode(format!("product listing: {e}")))?;
        Ok(list
            .data
            .into_iter()
            .map(|entry| ProductSummary {
                id: ProductId::from(entry.id),
                name: entry.name,
            })
            .collect())
    }

    async fn product_detail(&self, id: &ProductId) -> Result<Product, CommerceError> {
        let response = self.get(&format!("/v2/products/{id}")).await?;
        let response = check_status(response, id.as_str()).await?;
        let detail: ProductDetailResponse = response
            .json()
            .await
            .map_err(|e| CommerceError::Decode(format!("product detail: {e}")))?;
        let data = detail.data;
        // The image is stored as a file reference; one more round trip
        // resolves it to a link the transport can send.
        let image_url = self.file_link(&data.relationships.main_image.data.id).await?;
        Ok(Product {
            id: id.clone(),
            name: data.name,
            price_display: data.meta.display_price.with_tax.formatted,
            description: data.description,
            weight_kg: data.weight.kg,
            image_url,
        })
    }

    async fn add_to_cart(
        &self,
        chat: ChatId,
        id: &ProductId,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        let path = format!("/v2/carts/{chat}/items");
        let body = AddItemRequest::new(id.as_str().to_string(), quantity);
        let response = self
            .client
            .post(self.url(&path))
            .bearer_auth(self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| CommerceError::Request(format!("POST {path}: {e}")))?;
        check_status(response, id.as_str()).await?;
        Ok(())
    }

    async fn cart_items(&self, chat: ChatId) -> Result<Vec<CartLine>, CommerceError> {
        let response = self.get(&format!("/v2/carts/{chat}/items")).await?;
        let response = check_status(response, "cart items").await?;
        let items: CartItemsResponse = response
            .json()
            .await
            .map_err(|e| CommerceError::Decode(format!("cart items: {e}")))?;
        Ok(items
            .data
            .into_iter()
            .map(|entry| CartLine {
                product_id: ProductId::from(entry.id),
                name: entry.name,
                unit_price_display: entry.meta.display_price.with_tax.unit.formatted,
                quantity: entry.quantity,
                line_cost_display: entry.meta.display_price.with_tax.value.formatted,
            })
            .collect())
    }

    async fn cart_total(&self, chat: ChatId) -> Result<String, CommerceError> {
        let response = self.get(&format!("/v2/carts/{chat}")).await?;
        let response = check_status(response, "cart").await?;
        let cart: CartResponse = response
            .json()
            .await
            .map_err(|e| CommerceError::Decode(format!("cart total: {e}")))?;
        Ok(cart.data.meta.display_price.with_tax.formatted)
    }

    async fn remove_from_cart(&self, chat: ChatId, id: &ProductId) -> Result<(), CommerceError> {
        let path = format!("/v2/carts/{chat}/items/{id}");
        let response = self
            .client
            .delete(self.url(&path))
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| CommerceError::Request(format!("DELETE {path}: {e}")))?;
        // The upstream treats an absent line as already removed; a 404
        // here must not become an error.
        if response.status().as_u16() == 404 {
            return Ok(());
        }
        check_status(response, id.as_str()).await?;
        Ok(())
    }
}

/// Exchange client credentials for a bearer token.
///
/// `POST /oauth/access_token` with a form body, per Moltin's
/// client-credentials grant.
pub async fn fetch_access_token(
    client: &reqwest::Client,
    base_url: &str,
    client_id: &str,
    client_secret: &SecretString,
) -> Result<SecretString, CommerceError> {
    let url = format!("{base_url}/oauth/access_token");
    let form = [
        ("client_id", client_id),
        ("client_secret", client_secret.expose_secret()),
        ("grant_type", "client_credentials"),
    ];
    let response = client
        .post(&url)
        .form(&form)
        .send()
        .await
        .map_err(|e| CommerceError::Request(format!("token exchange: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        // Moltin answers the credentials grant with 401 for bad ids and
        // 403 for disabled keys; both mean the same thing to us.
        let body = response.text().await.unwrap_or_default();
        return Err(match status.as_u16() {
            401 | 403 => CommerceError::Auth,
            code => CommerceError::Upstream {
                status: code,
                message: body,
            },
        });
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| CommerceError::Decode(format!("token response: {e}")))?;
    Ok(SecretString::from(token.access_token))
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("failed to create reqwest client")
}

/// Map a non-success response to the error taxonomy.
async fn check_status(
    response: reqwest::Response,
    resource: &str,
) -> Result<reqwest::Response, CommerceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 => CommerceError::Auth,
        404 => CommerceError::NotFound(resource.to_string()),
        code => CommerceError::Upstream {
            status: code,
            message: body,
        },
    })
}
