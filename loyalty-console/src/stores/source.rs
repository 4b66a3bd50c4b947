//! Backend seam for the settings stores

use async_trait::async_trait;
use loyalty_client::{BatchDeleteReport, ClientResult, HttpClient, LogoUpload};
use shared::models::{CollectSettings, CouponDraft, PointSettings, RedeemCoupon};
use shared::response::SaveResponse;

/// Settings persistence used by the stores
///
/// Implemented by [`HttpClient`]; tests substitute an in-memory source.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn load_points(&self, store_id: &str, channel_id: &str)
    -> ClientResult<Option<PointSettings>>;

    async fn create_points(
        &self,
        store_id: &str,
        channel_id: &str,
        settings: &PointSettings,
        upload: Option<LogoUpload>,
    ) -> ClientResult<SaveResponse<PointSettings>>;

    async fn update_points(
        &self,
        point_id: &str,
        settings: &PointSettings,
        upload: Option<LogoUpload>,
    ) -> ClientResult<SaveResponse<PointSettings>>;

    async fn load_collect(
        &self,
        store_id: &str,
        channel_id: &str,
    ) -> ClientResult<Option<CollectSettings>>;

    async fn create_collect(
        &self,
        store_id: &str,
        channel_id: &str,
        settings: &CollectSettings,
    ) -> ClientResult<SaveResponse<CollectSettings>>;

    async fn update_collect(
        &self,
        collect_id: &str,
        settings: &CollectSettings,
    ) -> ClientResult<SaveResponse<CollectSettings>>;

    async fn load_coupons(&self, store_id: &str, channel_id: &str)
    -> ClientResult<Vec<RedeemCoupon>>;

    async fn create_coupon(
        &self,
        store_id: &str,
        channel_id: &str,
        draft: &CouponDraft,
    ) -> ClientResult<SaveResponse<RedeemCoupon>>;

    async fn update_coupon(
        &self,
        coupon_id: &str,
        store_id: &str,
        channel_id: &str,
        draft: &CouponDraft,
    ) -> ClientResult<SaveResponse<RedeemCoupon>>;

    async fn set_coupon_active(
        &self,
        coupon_id: &str,
        store_id: &str,
        channel_id: &str,
        active: bool,
    ) -> ClientResult<SaveResponse<RedeemCoupon>>;

    async fn delete_coupon(&self, coupon_id: &str, store_id: &str, channel_id: &str)
    -> ClientResult<()>;

    async fn delete_coupons(
        &self,
        coupon_ids: &[String],
        store_id: &str,
        channel_id: &str,
    ) -> BatchDeleteReport;
}

#[async_trait]
impl SettingsSource for HttpClient {
    async fn load_points(
        &self,
        store_id: &str,
        channel_id: &str,
    ) -> ClientResult<Option<PointSettings>> {
        self.get_points(store_id, channel_id).await
    }

    async fn create_points(
        &self,
        store_id: &str,
        channel_id: &str,
        settings: &PointSettings,
        upload: Option<LogoUpload>,
    ) -> ClientResult<SaveResponse<PointSettings>> {
        self.save_points(store_id, channel_id, settings, upload).await
    }

    async fn update_points(
        &self,
        point_id: &str,
        settings: &PointSettings,
        upload: Option<LogoUpload>,
    ) -> ClientResult<SaveResponse<PointSettings>> {
        HttpClient::update_points(self, point_id, settings, upload).await
    }

    async fn load_collect(
        &self,
        store_id: &str,
        channel_id: &str,
    ) -> ClientResult<Option<CollectSettings>> {
        self.get_collect_settings(store_id, channel_id).await
    }

    async fn create_collect(
        &self,
        store_id: &str,
        channel_id: &str,
        settings: &CollectSettings,
    ) -> ClientResult<SaveResponse<CollectSettings>> {
        self.save_collect_settings(store_id, channel_id, settings).await
    }

    async fn update_collect(
        &self,
        collect_id: &str,
        settings: &CollectSettings,
    ) -> ClientResult<SaveResponse<CollectSettings>> {
        self.update_collect_settings(collect_id, settings).await
    }

    async fn load_coupons(
        &self,
        store_id: &str,
        channel_id: &str,
    ) -> ClientResult<Vec<RedeemCoupon>> {
        self.get_redeem_coupons(store_id, channel_id).await
    }

    async fn create_coupon(
        &self,
        store_id: &str,
        channel_id: &str,
        draft: &CouponDraft,
    ) -> ClientResult<SaveResponse<RedeemCoupon>> {
        self.create_redeem_coupon(store_id, channel_id, draft).await
    }

    async fn update_coupon(
        &self,
        coupon_id: &str,
        store_id: &str,
        channel_id: &str,
        draft: &CouponDraft,
    ) -> ClientResult<SaveResponse<RedeemCoupon>> {
        self.update_redeem_coupon(coupon_id, store_id, channel_id, draft)
            .await
    }

    async fn set_coupon_active(
        &self,
        coupon_id: &str,
        store_id: &str,
        channel_id: &str,
        active: bool,
    ) -> ClientResult<SaveResponse<RedeemCoupon>> {
        HttpClient::set_coupon_active(self, coupon_id, store_id, channel_id, active).await
    }

    async fn delete_coupon(
        &self,
        coupon_id: &str,
        store_id: &str,
        channel_id: &str,
    ) -> ClientResult<()> {
        self.delete_redeem_coupon(coupon_id, store_id, channel_id)
            .await
    }

    async fn delete_coupons(
        &self,
        coupon_ids: &[String],
        store_id: &str,
        channel_id: &str,
    ) -> BatchDeleteReport {
        self.delete_redeem_coupons(coupon_ids, store_id, channel_id)
            .await
    }
}
