//! Nutritionix API client
//!
//! Issues one HTTP request per food description to the Nutritionix
//! natural-language nutrients endpoint and returns the raw response body.
//! No retry, no caching; the client-level timeout is the only guard.

use crate::config::NutritionixConfig;
use crate::error::{NutrisageError, Result};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Client for the Nutritionix natural-nutrients lookup
///
/// The API base is configurable so tests can point at a mock server.
pub struct NutritionixClient {
    client: Client,
    config: NutritionixConfig,
}

impl NutritionixClient {
    /// Create a new Nutritionix client
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: NutritionixConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("nutrisage/0.1.0")
            .build()
            .map_err(|e| {
                NutrisageError::Nutrition(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Look up nutrition facts for a natural-language food description
    ///
    /// Returns the raw JSON body from the API on success.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or non-success HTTP status;
    /// callers at the tool boundary convert these into textual payloads
    pub async fn natural_nutrients(&self, query: &str) -> Result<String> {
        let url = format!("{}/v2/natural/nutrients", self.config.api_base);

        tracing::debug!("Nutrition lookup: {}", query);

        let response = self
            .client
            .post(&url)
            .header("x-app-id", &self.config.app_id)
            .header("x-app-key", &self.config.api_key)
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Nutrition lookup failed: {}", e);
                NutrisageError::Nutrition(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("Nutritionix returned {}: {}", status, error_text);
            return Err(NutrisageError::Nutrition(format!(
                "Nutritionix returned {}: {}",
                status, error_text
            ))
            .into());
        }

        response.text().await.map_err(|e| {
            NutrisageError::Nutrition(format!("Failed to read response body: {}", e)).into()
        })
    }
}
