//! Azure Resource Manager client
//!
//! Thin typed client for the ARM REST surface: bearer-token requests, list
//! endpoints with `nextLink` paging, and the per-cluster credential call.
//! Authentication uses the client-credentials grant with the standard
//! AZURE_TENANT_ID / AZURE_CLIENT_ID / AZURE_CLIENT_SECRET environment
//! variables.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const MANAGEMENT_BASE_URL: &str = "https://management.azure.com";
const TOKEN_SCOPE: &str = "https://management.azure.com/.default";

/// One page of an ARM list response
#[derive(Debug, Deserialize)]
pub struct ArmList<T> {
    pub value: Vec<T>,
    #[serde(rename = "nextLink")]
    pub next_link: Option<String>,
}

/// Minimal shape shared by every ARM resource we list
#[derive(Debug, Clone, Deserialize)]
pub struct ArmResource {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Kubeconfig blobs returned by listClusterUserCredential
#[derive(Debug, Deserialize)]
pub struct ClusterCredentialList {
    pub kubeconfigs: Vec<ClusterCredential>,
}

#[derive(Debug, Deserialize)]
pub struct ClusterCredential {
    pub name: String,
    /// Base64-encoded kubeconfig YAML
    pub value: String,
}

pub struct ArmClient {
    client: reqwest::Client,
    token: String,
}

impl ArmClient {
    /// Obtain a management-plane token with the client-credentials grant
    pub async fn authenticate(tenant: &str, client_id: &str, client_secret: &str) -> Result<Self> {
        let client = reqwest::Client::new();
        let url = format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            tenant
        );
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("scope", TOKEN_SCOPE),
        ];

        let response = client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Token request failed: {} - {}", status, error_text);
        }

        let token: TokenResponse = response.json().await?;
        Ok(Self {
            client,
            token: token.access_token,
        })
    }

    /// Build request with the bearer token
    fn build_request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.build_request(reqwest::Method::GET, url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("ARM request failed: {} - {}", status, error_text);
        }

        let data = response.json().await?;
        Ok(data)
    }

    pub async fn post<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .build_request(reqwest::Method::POST, url)
            .header("Content-Length", "0")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("ARM request failed: {} - {}", status, error_text);
        }

        let data = response.json().await?;
        Ok(data)
    }

    /// Fetch every page of a list endpoint, following `nextLink` until the
    /// service stops returning one. Totals spanning multiple pages come back
    /// complete, not first-page truncated.
    pub async fn get_all<T: DeserializeOwned>(&self, first_url: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut url = first_url.to_string();

        loop {
            let page: ArmList<T> = self.get(&url).await?;
            match accumulate_page(page, &mut items) {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(items)
    }
}

/// Move one page's items into the accumulator, returning the next page URL
fn accumulate_page<T>(page: ArmList<T>, items: &mut Vec<T>) -> Option<String> {
    items.extend(page.value);
    page.next_link
}

/// Pull the resource group out of an ARM resource id, e.g.
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/...` -> `{rg}`
pub fn resource_group_from_id(id: &str) -> Option<String> {
    let mut segments = id.split('/');
    while let Some(segment) = segments.next() {
        if segment.eq_ignore_ascii_case("resourceGroups") {
            return segments.next().map(str::to_string);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_list_deserializes_next_link() {
        let page: ArmList<ArmResource> = serde_json::from_str(
            r#"{
                "value": [
                    {"id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/vm1", "name": "vm1"}
                ],
                "nextLink": "https://management.azure.com/page2"
            }"#,
        )
        .unwrap();
        assert_eq!(page.value.len(), 1);
        assert_eq!(
            page.next_link.as_deref(),
            Some("https://management.azure.com/page2")
        );

        let last: ArmList<ArmResource> =
            serde_json::from_str(r#"{"value": []}"#).unwrap();
        assert!(last.next_link.is_none());
    }

    #[test]
    fn test_accumulate_page_spans_page_boundary() {
        // page-size 2 with 3 items: the third must survive the boundary
        let mut items: Vec<i32> = Vec::new();
        let next = accumulate_page(
            ArmList {
                value: vec![1, 2],
                next_link: Some("page2".to_string()),
            },
            &mut items,
        );
        assert_eq!(next.as_deref(), Some("page2"));
        let next = accumulate_page(
            ArmList {
                value: vec![3],
                next_link: None,
            },
            &mut items,
        );
        assert!(next.is_none());
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_resource_group_from_id() {
        let id = "/subscriptions/sub/resourceGroups/rg-prod/providers/Microsoft.ContainerService/managedClusters/prod";
        assert_eq!(resource_group_from_id(id).as_deref(), Some("rg-prod"));
        assert_eq!(resource_group_from_id("/subscriptions/sub"), None);
    }
}
