//! A [`RemoteStore`] speaking the Solid protocol over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, IF_NONE_MATCH, LINK,
    LOCATION,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use url::Url;

use super::dataset::{Binary, Dataset};
use super::jsonld;
use super::provider::{RemoteStore, ResourceWithAcl, StoreError};
use crate::acl::AccessControl;
use crate::identity::{Profile, WebId};
use crate::vocab;

const SLUG: HeaderName = HeaderName::from_static("slug");
const DEFAULT_BINARY_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Default)]
pub struct SolidClientConfig {
    /// Bearer token presented with every request
    pub access_token: Option<String>,
    /// Per-request timeout; none means wait indefinitely
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct SolidClient {
    client: Client,
}

impl SolidClient {
    pub fn new(config: &SolidClientConfig) -> Result<Self, StoreError> {
        let mut default_headers = HeaderMap::new();
        if let Some(token) = &config.access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| StoreError::Transport(format!("invalid access token: {}", e)))?;
            value.set_sensitive(true);
            default_headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder().default_headers(default_headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(transport)?;
        Ok(Self { client })
    }

    /// Send a request and map every non-success status onto a [`StoreError`].
    async fn send(&self, url: &Url, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!("{} answered {}: {}", url, status, body);
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Forbidden(url.clone()),
            StatusCode::NOT_FOUND | StatusCode::GONE => StoreError::NotFound(url.clone()),
            status => StoreError::Status(url.clone(), status.as_u16(), body),
        })
    }

    async fn get_json(&self, url: &Url) -> Result<Dataset, StoreError> {
        let request = self.client.get(url.clone()).header(ACCEPT, jsonld::CONTENT_TYPE);
        let response = self.send(url, request).await?;
        let document: serde_json::Value = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(url.clone(), e.to_string()))?;
        jsonld::decode(url, &document).map_err(|e| StoreError::Malformed(url.clone(), e))
    }

    async fn put_json(&self, url: &Url, dataset: &Dataset) -> Result<(), StoreError> {
        let request = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, jsonld::CONTENT_TYPE)
            .body(encode_body(dataset)?);
        self.send(url, request).await?;
        Ok(())
    }

    async fn post(
        &self,
        container: &Url,
        content_type: &str,
        slug: &str,
        body: Vec<u8>,
    ) -> Result<Url, StoreError> {
        let request = self
            .client
            .post(container.clone())
            .header(CONTENT_TYPE, content_type)
            .header(SLUG, slug)
            .body(body);
        let response = self.send(container, request).await?;
        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|location| container.join(location).ok())
            .ok_or_else(|| {
                StoreError::Malformed(container.clone(), "created resource has no location".into())
            })
    }

    async fn delete(&self, url: &Url) -> Result<(), StoreError> {
        let request = self.client.delete(url.clone());
        self.send(url, request).await?;
        Ok(())
    }
}

fn transport(error: reqwest::Error) -> StoreError {
    if error.is_timeout() {
        StoreError::Timeout(error.to_string())
    } else {
        StoreError::Transport(error.to_string())
    }
}

fn encode_body(dataset: &Dataset) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(&jsonld::encode(dataset))
        .map_err(|e| StoreError::Transport(format!("failed to encode dataset: {}", e)))
}

/// Find the target of the first `Link` entry whose `rel` includes `rel`.
fn find_link(base: &Url, headers: &HeaderMap, rel: &str) -> Option<Url> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|entry| {
            let mut parts = entry.split(';');
            let target = parts.next()?.trim();
            let target = target.strip_prefix('<')?.strip_suffix('>')?;
            let matches = parts.any(|param| {
                let Some((key, value)) = param.split_once('=') else {
                    return false;
                };
                key.trim().eq_ignore_ascii_case("rel")
                    && value
                        .trim()
                        .trim_matches('"')
                        .split_whitespace()
                        .any(|candidate| candidate == rel)
            });
            if matches {
                base.join(target).ok()
            } else {
                None
            }
        })
}

#[async_trait]
impl RemoteStore for SolidClient {
    async fn create_container(&self, url: &Url) -> Result<(), StoreError> {
        let request = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, "text/turtle")
            .header(IF_NONE_MATCH, "*")
            .header(
                LINK,
                format!("<{}>; rel=\"type\"", vocab::ldp::BASIC_CONTAINER),
            );
        match self.send(url, request).await {
            Ok(_) => Ok(()),
            Err(StoreError::Status(_, 409 | 412, _)) => Err(StoreError::AlreadyExists(url.clone())),
            Err(e) => Err(e),
        }
    }

    async fn get_dataset(&self, url: &Url) -> Result<Dataset, StoreError> {
        self.get_json(url).await
    }

    async fn save_dataset_in_container(
        &self,
        container: &Url,
        dataset: &Dataset,
        slug: &str,
    ) -> Result<Url, StoreError> {
        self.post(container, jsonld::CONTENT_TYPE, slug, encode_body(dataset)?)
            .await
    }

    async fn save_dataset(&self, url: &Url, dataset: &Dataset) -> Result<(), StoreError> {
        self.put_json(url, dataset).await
    }

    async fn save_binary_in_container(
        &self,
        container: &Url,
        binary: &Binary,
        slug: &str,
    ) -> Result<Url, StoreError> {
        self.post(container, &binary.content_type, slug, binary.bytes.to_vec())
            .await
    }

    async fn overwrite_binary(&self, url: &Url, binary: &Binary) -> Result<Url, StoreError> {
        let request = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, binary.content_type.as_str())
            .body(binary.bytes.clone());
        self.send(url, request).await?;
        Ok(url.clone())
    }

    async fn read_binary(&self, url: &Url) -> Result<Binary, StoreError> {
        let response = self.send(url, self.client.get(url.clone())).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_BINARY_TYPE)
            .to_string();
        let bytes = response.bytes().await.map_err(transport)?;
        Ok(Binary::new(content_type, bytes))
    }

    async fn delete_resource(&self, url: &Url) -> Result<(), StoreError> {
        self.delete(url).await
    }

    async fn delete_container(&self, url: &Url) -> Result<(), StoreError> {
        match self.delete(url).await {
            Err(StoreError::Status(_, 409, _)) => Err(StoreError::NotEmpty(url.clone())),
            other => other,
        }
    }

    async fn get_resource_with_access_control(
        &self,
        url: &Url,
    ) -> Result<ResourceWithAcl, StoreError> {
        let response = self.send(url, self.client.head(url.clone())).await?;
        let acl_url = find_link(url, response.headers(), "acl").ok_or_else(|| {
            StoreError::Malformed(url.clone(), "no access-control link".to_string())
        })?;

        let access_control = match self.get_json(&acl_url).await {
            Ok(dataset) => Some(
                AccessControl::from_dataset(url, &dataset)
                    .map_err(|e| StoreError::Malformed(acl_url.clone(), e.to_string()))?,
            ),
            Err(StoreError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        Ok(ResourceWithAcl {
            resource: url.clone(),
            acl_url,
            access_control,
        })
    }

    async fn save_access_control(
        &self,
        resource: &ResourceWithAcl,
        access_control: &AccessControl,
    ) -> Result<(), StoreError> {
        self.put_json(&resource.acl_url, &access_control.to_dataset(&resource.acl_url))
            .await
    }

    async fn resolve_identity_profile(&self, web_id: &WebId) -> Result<Profile, StoreError> {
        let dataset = self.get_json(&web_id.document()).await?;
        let mut profile = Profile::new(web_id.clone());
        if let Some(me) = dataset.thing(web_id.as_url()) {
            profile.name = me
                .literal(vocab::profile::FOAF_NAME)
                .or_else(|| me.literal(vocab::profile::VCARD_FN))
                .map(str::to_string);
            profile.storage = me.iris(vocab::profile::STORAGE).next().cloned();
        }
        Ok(profile)
    }
}
