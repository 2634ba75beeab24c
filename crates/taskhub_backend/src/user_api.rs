use anyhow::Context as _;
use futures::future::BoxFuture;
use reqwest::Method;
use std::time::Duration;
use taskhub_api::{ChangePasswordRequest, ProfileUpdate, UserProfile};

const API_BASE_URL_DEFAULT: &str = "http://127.0.0.1:5000/api-v1";
const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

/// Backend user endpoints as seen by the client core: opaque fetchers and
/// mutators returning decoded values or error strings.
pub trait UserProfileApi: Send + Sync {
    fn fetch_profile(&self) -> BoxFuture<'static, Result<UserProfile, String>>;

    fn update_profile(&self, update: ProfileUpdate)
    -> BoxFuture<'static, Result<UserProfile, String>>;

    fn change_password(
        &self,
        request: ChangePasswordRequest,
    ) -> BoxFuture<'static, Result<(), String>>;
}

#[derive(Clone)]
pub struct HttpUserApi {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpUserApi {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            auth_token,
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = std::env::var("TASKHUB_API_BASE_URL")
            .unwrap_or_else(|_| API_BASE_URL_DEFAULT.to_owned());
        let auth_token = std::env::var("TASKHUB_AUTH_TOKEN")
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty());
        Self::new(base_url, auth_token)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn get_profile(&self) -> Result<UserProfile, String> {
        let res = self
            .request(Method::GET, "/users/profile")
            .send()
            .await
            .map_err(|err| format!("fetch profile: {err}"))?;
        decode_json(res, "profile").await
    }

    async fn put_profile(&self, update: ProfileUpdate) -> Result<UserProfile, String> {
        let res = self
            .request(Method::PUT, "/users/profile")
            .json(&update)
            .send()
            .await
            .map_err(|err| format!("update profile: {err}"))?;
        decode_json(res, "profile").await
    }

    async fn post_change_password(&self, request: ChangePasswordRequest) -> Result<(), String> {
        let res = self
            .request(Method::POST, "/users/change-password")
            .json(&request)
            .send()
            .await
            .map_err(|err| format!("change password: {err}"))?;
        let status = res.status();
        if !status.is_success() {
            return Err(format!("change password: backend returned {status}"));
        }
        Ok(())
    }
}

async fn decode_json<T: serde::de::DeserializeOwned>(
    res: reqwest::Response,
    what: &str,
) -> Result<T, String> {
    let status = res.status();
    if !status.is_success() {
        return Err(format!("fetch {what}: backend returned {status}"));
    }
    let body = res
        .bytes()
        .await
        .map_err(|err| format!("fetch {what}: {err}"))?;
    serde_json::from_slice(&body).map_err(|err| format!("decode {what} response: {err}"))
}

impl UserProfileApi for HttpUserApi {
    fn fetch_profile(&self) -> BoxFuture<'static, Result<UserProfile, String>> {
        let this = self.clone();
        Box::pin(async move { this.get_profile().await })
    }

    fn update_profile(
        &self,
        update: ProfileUpdate,
    ) -> BoxFuture<'static, Result<UserProfile, String>> {
        let this = self.clone();
        Box::pin(async move { this.put_profile(update).await })
    }

    fn change_password(
        &self,
        request: ChangePasswordRequest,
    ) -> BoxFuture<'static, Result<(), String>> {
        let this = self.clone();
        Box::pin(async move { this.post_change_password(request).await })
    }
}
