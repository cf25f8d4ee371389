//! License recommendation via an external text-generation provider.
//!
//! The rest of the crate depends only on the two operation signatures here;
//! provider and transport failures are deliberately collapsed into one
//! opaque "recommendation unavailable" error so callers never branch on
//! provider details.

use std::path::Path;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::json;

use crate::config::AdvisorConfig;

pub struct Advisor {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl Advisor {
    pub fn new(client: Client, config: &AdvisorConfig, api_key: String) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key,
        }
    }

    /// Recommend a license for the project described by `project_info`.
    pub async fn recommend_license(&self, project_info: &str) -> Result<String> {
        let prompt = format!(
            "Based on the following project description, recommend a suitable \
             open-source license:\n{}\n\nProvide a license name only.",
            project_info
        );
        self.complete(&prompt).await
    }

    /// Generate the full text of `license_type` and write it to `path`.
    pub async fn generate_license_file(&self, license_type: &str, path: &Path) -> Result<()> {
        let prompt = format!(
            "Generate the content for this open-source license: {}",
            license_type
        );
        let content = self.complete(&prompt).await?;
        tokio::fs::write(path, content)
            .await
            .map_err(|err| anyhow!("could not write {}: {}", path.display(), err))
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|err| {
                log::debug!("advisor request failed: {}", err);
                anyhow!("recommendation unavailable")
            })?;

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|_| anyhow!("recommendation unavailable"))?;

        completion_text(&data).ok_or_else(|| anyhow!("recommendation unavailable"))
    }
}

/// Pull the generated text out of a chat-completions response body.
fn completion_text(data: &serde_json::Value) -> Option<String> {
    data.get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|s| s.trim().to_string())
}
