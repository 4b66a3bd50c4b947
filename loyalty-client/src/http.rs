//! HTTP client for the loyalty REST API

use crate::{ClientConfig, ClientError, ClientResult, LogoUpload};
use futures::future::join_all;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::models::{
    Channel, CollectSettings, CollectSettingsPayload, CouponDraft, LoginRequest, LoginResponse,
    PointSettings, RedeemCoupon, StoreInfo,
};
use shared::response::{ErrorBody, SaveResponse, extract_data};
use std::time::Duration;

/// HTTP client for the loyalty backend
///
/// Requests are never retried; a failure is terminal for the attempted
/// operation and the caller decides whether to try again.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Outcome of a concurrent coupon delete
#[derive(Debug, Default)]
pub struct BatchDeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, ClientError)>,
}

impl BatchDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<String> {
        self.failed.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn total(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }
}

/// Body of a coupon create/update
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScopedDraft<'a> {
    store_id: &'a str,
    channel_id: &'a str,
    #[serde(flatten)]
    draft: &'a CouponDraft,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveToggle<'a> {
    store_id: &'a str,
    channel_id: &'a str,
    active: bool,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    /// Set the session token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replace or clear the session token
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Attach the bearer token when one is set
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.get_query(path, &[]).await
    }

    /// Make a GET request with query parameters
    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<T> {
        let request = self.authorize(self.client.get(self.url(path)).query(query));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// GET a document that may be wrapped in `{ "data": ... }` or be `null`
    pub async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<Option<T>> {
        let value: serde_json::Value = self.get_query(path, query).await?;
        Ok(extract_data(value)?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.authorize(self.client.put(self.url(path)).json(body));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a PATCH request with JSON body
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.authorize(self.client.patch(self.url(path)).json(body));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request, ignoring any response body
    pub async fn delete(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<()> {
        let request = self.authorize(self.client.delete(self.url(path)).query(query));
        let response = request.send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn send_multipart<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        form: Form,
    ) -> ClientResult<T> {
        let response = self.authorize(request).multipart(form).send().await?;
        Self::handle_response(response).await
    }

    /// Map a non-2xx status to a [`ClientError`], keeping the server's message
    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.text().map(str::to_string))
            .unwrap_or(text);
        tracing::debug!(status = status.as_u16(), %message, "API request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(message)
            }
            _ => ClientError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    // ========== Auth API ==========

    /// Exchange a platform-signed payload for a session
    pub async fn login(&self, signed_payload: &str) -> ClientResult<LoginResponse> {
        let request = LoginRequest {
            signed_payload: signed_payload.to_string(),
        };
        self.post("/api/login", &request).await.map_err(|e| match e {
            ClientError::Unauthorized(m) | ClientError::Validation(m) if m.trim().is_empty() => {
                ClientError::Unauthorized("JWT verification failed".to_string())
            }
            other => other,
        })
    }

    // ========== Store API ==========

    pub async fn store_info(&self, store_hash: &str) -> ClientResult<StoreInfo> {
        self.get_data(&format!("/api/store/{}", store_hash), &[])
            .await?
            .ok_or_else(|| ClientError::InvalidResponse("Missing store data".to_string()))
    }

    pub async fn channels(&self, store_id: &str) -> ClientResult<Vec<Channel>> {
        Ok(self
            .get_data("/api/channels", &[("storeId", store_id)])
            .await?
            .unwrap_or_default())
    }

    // ========== Points API ==========

    /// Fetch point settings; `None` when the channel has none yet
    pub async fn get_points(
        &self,
        store_id: &str,
        channel_id: &str,
    ) -> ClientResult<Option<PointSettings>> {
        match self
            .get_data("/api/points", &[("storeId", store_id), ("channelId", channel_id)])
            .await
        {
            Ok(settings) => Ok(settings),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create point settings
    pub async fn save_points(
        &self,
        store_id: &str,
        channel_id: &str,
        settings: &PointSettings,
        upload: Option<LogoUpload>,
    ) -> ClientResult<SaveResponse<PointSettings>> {
        let form = points_form(settings, upload)?
            .text("storeId", store_id.to_string())
            .text("channelId", channel_id.to_string());
        self.send_multipart(self.client.post(self.url("/api/points")), form)
            .await
    }

    /// Update existing point settings
    pub async fn update_points(
        &self,
        point_id: &str,
        settings: &PointSettings,
        upload: Option<LogoUpload>,
    ) -> ClientResult<SaveResponse<PointSettings>> {
        let form = points_form(settings, upload)?;
        let url = self.url(&format!("/api/points/{}", point_id));
        self.send_multipart(self.client.put(url), form).await
    }

    // ========== Collect API ==========

    /// Fetch ways-to-earn settings; `None` when the channel has none yet
    pub async fn get_collect_settings(
        &self,
        store_id: &str,
        channel_id: &str,
    ) -> ClientResult<Option<CollectSettings>> {
        match self
            .get_data("/api/collect", &[("storeId", store_id), ("channelId", channel_id)])
            .await
        {
            Ok(settings) => Ok(settings),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn save_collect_settings(
        &self,
        store_id: &str,
        channel_id: &str,
        settings: &CollectSettings,
    ) -> ClientResult<SaveResponse<CollectSettings>> {
        let body = CollectSettingsPayload::new(settings).scoped(store_id, channel_id);
        self.post("/api/collect", &body).await
    }

    pub async fn update_collect_settings(
        &self,
        collect_id: &str,
        settings: &CollectSettings,
    ) -> ClientResult<SaveResponse<CollectSettings>> {
        let body = CollectSettingsPayload::new(settings);
        self.put(&format!("/api/collect/{}", collect_id), &body).await
    }

    // ========== Redeem API ==========

    /// Fetch all coupons of a channel; a missing list reads as empty
    pub async fn get_redeem_coupons(
        &self,
        store_id: &str,
        channel_id: &str,
    ) -> ClientResult<Vec<RedeemCoupon>> {
        match self
            .get_data("/api/redeem", &[("storeId", store_id), ("channelId", channel_id)])
            .await
        {
            Ok(coupons) => Ok(coupons.unwrap_or_default()),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub async fn create_redeem_coupon(
        &self,
        store_id: &str,
        channel_id: &str,
        draft: &CouponDraft,
    ) -> ClientResult<SaveResponse<RedeemCoupon>> {
        let body = ScopedDraft {
            store_id,
            channel_id,
            draft,
        };
        self.post("/api/redeem", &body).await
    }

    pub async fn update_redeem_coupon(
        &self,
        coupon_id: &str,
        store_id: &str,
        channel_id: &str,
        draft: &CouponDraft,
    ) -> ClientResult<SaveResponse<RedeemCoupon>> {
        let body = ScopedDraft {
            store_id,
            channel_id,
            draft,
        };
        self.put(&format!("/api/redeem/{}", coupon_id), &body).await
    }

    pub async fn set_coupon_active(
        &self,
        coupon_id: &str,
        store_id: &str,
        channel_id: &str,
        active: bool,
    ) -> ClientResult<SaveResponse<RedeemCoupon>> {
        let body = ActiveToggle {
            store_id,
            channel_id,
            active,
        };
        self.patch(&format!("/api/redeem/{}/active", coupon_id), &body)
            .await
    }

    pub async fn delete_redeem_coupon(
        &self,
        coupon_id: &str,
        store_id: &str,
        channel_id: &str,
    ) -> ClientResult<()> {
        self.delete(
            &format!("/api/redeem/{}", coupon_id),
            &[("storeId", store_id), ("channelId", channel_id)],
        )
        .await
    }

    /// Delete several coupons concurrently
    ///
    /// Every id gets its own request; one failure does not stop the others.
    pub async fn delete_redeem_coupons(
        &self,
        coupon_ids: &[String],
        store_id: &str,
        channel_id: &str,
    ) -> BatchDeleteReport {
        let results = join_all(
            coupon_ids
                .iter()
                .map(|id| self.delete_redeem_coupon(id, store_id, channel_id)),
        )
        .await;

        let mut report = BatchDeleteReport::default();
        for (id, result) in coupon_ids.iter().zip(results) {
            match result {
                Ok(()) => report.deleted.push(id.clone()),
                Err(e) => {
                    tracing::warn!(coupon_id = %id, error = %e, "Failed to delete coupon");
                    report.failed.push((id.clone(), e));
                }
            }
        }
        report
    }
}

/// Multipart body shared by points create and update
fn points_form(settings: &PointSettings, upload: Option<LogoUpload>) -> ClientResult<Form> {
    let mut form = Form::new()
        .text("pointName", settings.point_name.clone())
        .text("expiry", settings.expiry.to_string())
        .text("tierStatus", settings.tier_status.to_string())
        .text(
            "customPointName",
            serde_json::to_string(&settings.custom_point_name)?,
        )
        .text("tier", serde_json::to_string(&settings.tier)?);

    if settings.expiry
        && let Some(days) = settings.expiries_in_days
    {
        form = form.text("expiriesInDays", days.to_string());
    }
    if let Some(logo) = &settings.logo {
        form = form.text("logo", serde_json::to_string(logo)?);
    }
    if let Some(logo) = &settings.custom_logo {
        form = form.text("customLogo", serde_json::to_string(logo)?);
    }
    if let Some(upload) = upload {
        form = form.part("logoImage", upload.into_part()?);
    }
    Ok(form)
}
