use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::de::DeserializeOwned;

use crate::{
    checkout::{CheckoutUrls, NewCheckoutSession},
    config::StripeConfig,
    data_objects::{CheckoutSession, ListPage, Price, Product},
    StripeApiError,
};

/// A slow or unreachable Stripe must not hold a request handler open indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Page size for the client-side product scan.
const SCAN_PAGE_SIZE: usize = 100;
/// Stripe caps price listings for the default-price fallback at 10 entries.
const PRICE_LIST_LIMIT: usize = 10;

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base)
    }

    async fn rest_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        form: Option<&[(String, String)]>,
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(form) = form {
            req = req.form(form);
        }
        let response = req.send().await.map_err(|e| StripeApiError::RequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| StripeApiError::RequestError(e.to_string()))?;
            Err(StripeApiError::QueryError { status, message })
        }
    }

    /// Finds the active product whose `metadata.slug` equals `slug`, or `None` when the listing is exhausted.
    ///
    /// Stripe has no server-side index on metadata, so this is a linear scan over the paginated active-products
    /// listing. It terminates when a page reports `has_more == false`.
    pub async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>, StripeApiError> {
        let limit = SCAN_PAGE_SIZE.to_string();
        let mut starting_after: Option<String> = None;
        let mut scanned = 0usize;
        loop {
            let mut params = vec![("active", "true"), ("limit", limit.as_str())];
            if let Some(after) = &starting_after {
                params.push(("starting_after", after.as_str()));
            }
            let page = self.rest_query::<ListPage<Product>>(Method::GET, "/products", &params, None).await?;
            scanned += page.data.len();
            if let Some(product) = page.data.iter().find(|p| p.slug() == Some(slug)) {
                debug!("💳️ Found product {} for slug '{slug}' after scanning {scanned} products", product.id);
                return Ok(Some(product.clone()));
            }
            // The empty-page check stops a misbehaving upstream from looping us forever
            if !page.has_more || page.data.is_empty() {
                debug!("💳️ No product with slug '{slug}' among {scanned} active products");
                return Ok(None);
            }
            starting_after = page.data.last().map(|p| p.id.clone());
        }
    }

    pub async fn fetch_price(&self, price_id: &str) -> Result<Price, StripeApiError> {
        let path = format!("/prices/{price_id}");
        self.rest_query(Method::GET, &path, &[], None).await
    }

    pub async fn list_active_prices(&self, product_id: &str) -> Result<Vec<Price>, StripeApiError> {
        let limit = PRICE_LIST_LIMIT.to_string();
        let params = [("product", product_id), ("active", "true"), ("limit", limit.as_str())];
        let page = self.rest_query::<ListPage<Price>>(Method::GET, "/prices", &params, None).await?;
        Ok(page.data)
    }

    /// Resolves the price a checkout should use. The default-price reference wins, but only while it is active;
    /// otherwise the first entry of the active-price listing is an accepted tie-break. `None` means the item is
    /// not currently sellable.
    pub async fn default_price_for_product(&self, product: &Product) -> Result<Option<Price>, StripeApiError> {
        if let Some(price_id) = product.default_price_id() {
            let price = self.fetch_price(price_id).await?;
            if price.active {
                return Ok(Some(price));
            }
            debug!("💳️ Default price {price_id} of product {} is inactive. Falling back to listing.", product.id);
        }
        let prices = self.list_active_prices(&product.id).await?;
        Ok(prices.into_iter().next())
    }

    /// Requests a hosted checkout session and returns the Stripe-issued redirect URL verbatim.
    pub async fn create_checkout_session(
        &self,
        session: &NewCheckoutSession,
        urls: &CheckoutUrls,
    ) -> Result<String, StripeApiError> {
        let form = session.to_form(urls);
        debug!("💳️ Creating checkout session for '{}' at price {}", session.slug, session.price_id);
        let created: CheckoutSession =
            self.rest_query(Method::POST, "/checkout/sessions", &[], Some(form.as_slice())).await?;
        info!("💳️ Created checkout session {} for '{}'", created.id, session.slug);
        created.url.ok_or(StripeApiError::EmptyResponse)
    }
}
