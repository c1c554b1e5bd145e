use reqwest::Client;

use super::{RecordPatch, RecordProps, RemoteGateway};

const API_BASE: &str = "https://api.notion.com/v1";
const API_VERSION: &str = "2022-06-28";

/// Notion REST client. One instance is shared by all sync tasks; the
/// underlying `reqwest::Client` pools connections internally.
#[derive(Clone)]
pub struct NotionClient {
    http: Client,
}

impl NotionClient {
    pub fn new() -> Result<Self, String> {
        let http = Client::builder()
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
        Ok(Self { http })
    }

    /// Pull the human-readable message out of a Notion error body,
    /// falling back to the status line alone.
    async fn error_message(resp: reqwest::Response) -> String {
        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .unwrap_or_else(|_| serde_json::json!({ "message": "Unknown Notion error" }));
        let message = body
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown Notion error");
        format!("Error: {} - {}", status, message)
    }
}

impl RemoteGateway for NotionClient {
    async fn create_record(
        &self,
        key: &str,
        database_id: &str,
        props: RecordProps,
    ) -> Result<String, String> {
        let payload = serde_json::json!({
            "parent": { "database_id": database_id },
            "properties": props.into_value(),
        });

        let resp = self
            .http
            .post(format!("{}/pages", API_BASE))
            .bearer_auth(key)
            .header("Notion-Version", API_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(Self::error_message(resp).await);
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| format!("Failed to read create response: {}", e))?;
        let page_id = body
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown ID");
        Ok(page_id.to_string())
    }

    async fn update_record(
        &self,
        key: &str,
        page_id: &str,
        patch: RecordPatch,
    ) -> Result<(), String> {
        let resp = self
            .http
            .patch(format!("{}/pages/{}", API_BASE, page_id))
            .bearer_auth(key)
            .header("Notion-Version", API_VERSION)
            .json(&patch.into_body())
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(Self::error_message(resp).await);
        }
        Ok(())
    }

    async fn test_connection(&self, key: &str, database_id: &str) -> Result<(), String> {
        let resp = self
            .http
            .get(format!("{}/databases/{}", API_BASE, database_id))
            .bearer_auth(key)
            .header("Notion-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(Self::error_message(resp).await);
        }
        Ok(())
    }
}
