use anyhow::{Context, Result};
use notification::Key;
use reqwest::{Client, Response};
use serde_json::Value;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub async fn create_session(&self) -> Result<String> {
        let url = format!("{}/sessions", self.base_url);
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .context("Failed to create session")?;

        let body = Self::json(response, "create session").await?;
        Ok(body["data"]["session_id"]
            .as_str()
            .context("No session ID in response")?
            .to_string())
    }

    /// Pushes a notification; `body` is `{render?, payload, options?}`.
    pub async fn push(&self, session_id: &str, body: &Value) -> Result<Key> {
        let url = format!("{}/sessions/{}/notifications", self.base_url, session_id);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .context("Failed to push notification")?;

        let body = Self::json(response, "push notification").await?;
        let key = body["data"]["key"]
            .as_str()
            .context("No key in response")?;
        Ok(Key::from(key.to_string()))
    }

    pub async fn close(&self, session_id: &str, key: &Key) -> Result<()> {
        self.post_empty(session_id, key, "close").await
    }

    pub async fn remove(&self, session_id: &str, key: &Key) -> Result<()> {
        self.post_empty(session_id, key, "remove").await
    }

    async fn post_empty(&self, session_id: &str, key: &Key, action: &str) -> Result<()> {
        let url = format!(
            "{}/sessions/{}/notifications/{}/{}",
            self.base_url, session_id, key, action
        );
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .with_context(|| format!("Failed to {action} notification {key}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("Failed to {action} notification {key}: {status} - Response: {body}");
        }
        Ok(())
    }

    async fn json(response: Response, what: &str) -> Result<Value> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("Failed to {what}: {status} - Response: {body}");
        }
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {what} response"))
    }
}
