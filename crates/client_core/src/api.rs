use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::ErrorResponse,
    protocol::{
        AuthenticationRequest, AuthenticationResponse, PageEnvelope, RegisterRequest,
        SearchRequest,
    },
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use crate::{
    error::ApiError,
    paging::{PageRequest, PageResult},
    resource::Resource,
};

/// Collection endpoints for one resource type.
#[async_trait]
pub trait ResourceApi<R: Resource>: Send + Sync {
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResult<R>, ApiError>;
    async fn search(&self, query: &str, request: PageRequest) -> Result<PageResult<R>, ApiError>;
    async fn get(&self, id: R::Id) -> Result<R, ApiError>;
    async fn create(&self, payload: &R::Add) -> Result<R, ApiError>;
    async fn update(&self, payload: &R::Edit) -> Result<(), ApiError>;
    async fn remove(&self, id: R::Id) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct HttpApi {
    http: Client,
    base_url: Url,
    token: Arc<RwLock<Option<String>>>,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Exchanges credentials for a bearer token and keeps it for later calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["auth", "login"])?;
        let res = self
            .http
            .post(url)
            .json(&AuthenticationRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let body: AuthenticationResponse = read_json(check_status(res).await?).await?;
        self.set_token(Some(body.token.clone())).await;
        info!(%email, "authenticated");
        Ok(body.token)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<String, ApiError> {
        let url = self.endpoint(&["auth", "register"])?;
        let res = self.http.post(url).json(request).send().await?;
        let body: AuthenticationResponse = read_json(check_status(res).await?).await?;
        self.set_token(Some(body.token.clone())).await;
        info!(email = %request.email, "registered");
        Ok(body.token)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let builder = match self.token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let res = builder.send().await?;
        check_status(res).await
    }
}

async fn check_status(res: Response) -> Result<Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|parsed| parsed.summary())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T, ApiError> {
    let bytes = res.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::UnexpectedShape(err.to_string()))
}

pub(crate) fn decode_page<R: DeserializeOwned>(
    envelope: PageEnvelope,
) -> Result<PageResult<R>, ApiError> {
    if !envelope.content.is_array() {
        return Err(ApiError::UnexpectedShape("Data isn't array".into()));
    }
    let items: Vec<R> = serde_json::from_value(envelope.content)
        .map_err(|err| ApiError::UnexpectedShape(err.to_string()))?;
    PageResult::new(
        items,
        envelope.total_elements,
        envelope.pageable.page_number,
        envelope.pageable.page_size,
    )
}

fn page_query(request: PageRequest) -> [(&'static str, u32); 2] {
    [("page", request.page_number), ("size", request.page_size)]
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for HttpApi {
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResult<R>, ApiError> {
        let url = self.endpoint(&[R::KIND.path()])?;
        debug!(
            resource = R::KIND.path(),
            page = request.page_number,
            size = request.page_size,
            "GET page"
        );
        let res = self.send(self.http.get(url).query(&page_query(request))).await?;
        decode_page(read_json(res).await?)
    }

    async fn search(&self, query: &str, request: PageRequest) -> Result<PageResult<R>, ApiError> {
        let url = self.endpoint(&[R::KIND.path(), "search"])?;
        debug!(resource = R::KIND.path(), %query, "POST search");
        let body = SearchRequest {
            query: query.to_string(),
        };
        let res = self
            .send(self.http.post(url).query(&page_query(request)).json(&body))
            .await?;
        decode_page(read_json(res).await?)
    }

    async fn get(&self, id: R::Id) -> Result<R, ApiError> {
        let url = self.endpoint(&[R::KIND.path(), &id.to_string()])?;
        let res = self.send(self.http.get(url)).await?;
        read_json(res).await
    }

    async fn create(&self, payload: &R::Add) -> Result<R, ApiError> {
        let url = self.endpoint(&[R::KIND.path()])?;
        let res = self.send(self.http.post(url).json(payload)).await?;
        read_json(res).await
    }

    async fn update(&self, payload: &R::Edit) -> Result<(), ApiError> {
        let id = R::edit_id(payload).ok_or(ApiError::MissingId)?;
        let url = self.endpoint(&[R::KIND.path(), &id.to_string()])?;
        self.send(self.http.put(url).json(payload)).await?;
        Ok(())
    }

    async fn remove(&self, id: R::Id) -> Result<(), ApiError> {
        let url = self.endpoint(&[R::KIND.path(), &id.to_string()])?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
