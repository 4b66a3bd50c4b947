//! Settings store tests against an in-memory backend.

use async_trait::async_trait;
use chrono::NaiveDate;
use loyalty_client::{BatchDeleteReport, ClientError, ClientResult, LogoUpload, SaveResponse};
use loyalty_console::guard::{LeaveDecision, NavigationPort};
use loyalty_console::stores::{CouponForm, RestrictionChoice};
use loyalty_console::{
    BulkDeletePolicy, BulkSelection, ChannelScope, ConsoleError, EarnStore, PointsStore,
    RedeemStore, SettingsSource,
};
use shared::models::{
    CollectSettings, CouponDraft, EarnRuleKind, PointSettings, RedeemCoupon, Tier,
};
use std::sync::Mutex;

// =============================================================================
// Test Helpers
// =============================================================================

#[derive(Clone)]
enum Reply<T> {
    Data(T),
    Missing,
    Fail,
}

impl<T: Clone> Reply<T> {
    fn get(&self) -> ClientResult<Option<T>> {
        match self {
            Reply::Data(value) => Ok(Some(value.clone())),
            Reply::Missing => Err(ClientError::NotFound("Not found".into())),
            Reply::Fail => Err(server_error()),
        }
    }
}

fn server_error() -> ClientError {
    ClientError::Api {
        status: 500,
        message: "boom".into(),
    }
}

struct MockSource {
    points: Mutex<Reply<PointSettings>>,
    collect: Mutex<Reply<CollectSettings>>,
    coupons: Mutex<Vec<RedeemCoupon>>,
    failing_deletes: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    fn new() -> Self {
        Self {
            points: Mutex::new(Reply::Missing),
            collect: Mutex::new(Reply::Missing),
            coupons: Mutex::new(Vec::new()),
            failing_deletes: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_points(self, reply: Reply<PointSettings>) -> Self {
        *self.points.lock().unwrap() = reply;
        self
    }

    fn with_collect(self, reply: Reply<CollectSettings>) -> Self {
        *self.collect.lock().unwrap() = reply;
        self
    }

    fn with_coupons(self, coupons: Vec<RedeemCoupon>) -> Self {
        *self.coupons.lock().unwrap() = coupons;
        self
    }

    fn failing(mut self, ids: &[&str]) -> Self {
        self.failing_deletes = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SettingsSource for MockSource {
    async fn load_points(&self, _: &str, _: &str) -> ClientResult<Option<PointSettings>> {
        self.points.lock().unwrap().get()
    }

    async fn create_points(
        &self,
        _: &str,
        _: &str,
        settings: &PointSettings,
        upload: Option<LogoUpload>,
    ) -> ClientResult<SaveResponse<PointSettings>> {
        self.record(match upload {
            Some(file) => format!("create_points:{}", file.file_name),
            None => "create_points".to_string(),
        });
        Ok(SaveResponse {
            success: true,
            message: Some("Points saved".into()),
            data: Some(PointSettings {
                id: Some("p-new".into()),
                ..settings.clone()
            }),
        })
    }

    async fn update_points(
        &self,
        point_id: &str,
        settings: &PointSettings,
        _: Option<LogoUpload>,
    ) -> ClientResult<SaveResponse<PointSettings>> {
        self.record(format!("update_points:{point_id}"));
        Ok(SaveResponse::ok(settings.clone()))
    }

    async fn load_collect(&self, _: &str, _: &str) -> ClientResult<Option<CollectSettings>> {
        self.collect.lock().unwrap().get()
    }

    async fn create_collect(
        &self,
        _: &str,
        _: &str,
        settings: &CollectSettings,
    ) -> ClientResult<SaveResponse<CollectSettings>> {
        self.record("create_collect");
        let mut saved = settings.clone();
        saved.id = Some("col-new".into());
        for (i, event) in saved.event.events.iter_mut().enumerate() {
            event.id.get_or_insert_with(|| format!("e{i}"));
        }
        Ok(SaveResponse::ok(saved))
    }

    async fn update_collect(
        &self,
        collect_id: &str,
        settings: &CollectSettings,
    ) -> ClientResult<SaveResponse<CollectSettings>> {
        self.record(format!("update_collect:{collect_id}"));
        Ok(SaveResponse::ok(settings.clone()))
    }

    async fn load_coupons(&self, _: &str, _: &str) -> ClientResult<Vec<RedeemCoupon>> {
        Ok(self.coupons.lock().unwrap().clone())
    }

    async fn create_coupon(
        &self,
        _: &str,
        _: &str,
        draft: &CouponDraft,
    ) -> ClientResult<SaveResponse<RedeemCoupon>> {
        self.record("create_coupon");
        Ok(SaveResponse::ok(draft.to_coupon(Some("r-new".into()), true)))
    }

    async fn update_coupon(
        &self,
        coupon_id: &str,
        _: &str,
        _: &str,
        draft: &CouponDraft,
    ) -> ClientResult<SaveResponse<RedeemCoupon>> {
        self.record(format!("update_coupon:{coupon_id}"));
        Ok(SaveResponse::ok(draft.to_coupon(Some(coupon_id.into()), true)))
    }

    async fn set_coupon_active(
        &self,
        coupon_id: &str,
        _: &str,
        _: &str,
        active: bool,
    ) -> ClientResult<SaveResponse<RedeemCoupon>> {
        self.record(format!("set_active:{coupon_id}:{active}"));
        Ok(SaveResponse {
            success: true,
            message: None,
            data: None,
        })
    }

    async fn delete_coupon(&self, coupon_id: &str, _: &str, _: &str) -> ClientResult<()> {
        self.record(format!("delete:{coupon_id}"));
        if self.failing_deletes.iter().any(|id| id == coupon_id) {
            return Err(server_error());
        }
        Ok(())
    }

    async fn delete_coupons(
        &self,
        coupon_ids: &[String],
        store_id: &str,
        channel_id: &str,
    ) -> BatchDeleteReport {
        let mut report = BatchDeleteReport::default();
        for id in coupon_ids {
            match self.delete_coupon(id, store_id, channel_id).await {
                Ok(()) => report.deleted.push(id.clone()),
                Err(e) => report.failed.push((id.clone(), e)),
            }
        }
        report
    }
}

#[derive(Default)]
struct RecordingPort {
    navigated: Vec<String>,
    prompted: Vec<String>,
}

impl NavigationPort for RecordingPort {
    fn navigate(&mut self, target: &str) {
        self.navigated.push(target.to_string());
    }

    fn prompt_leave(&mut self, target: &str) {
        self.prompted.push(target.to_string());
    }
}

fn scope() -> ChannelScope {
    ChannelScope::new("s1", "c1")
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn gems() -> PointSettings {
    PointSettings {
        id: Some("p1".into()),
        point_name: "Gems".into(),
        expiry: true,
        expiries_in_days: Some(90),
        tier_status: true,
        ..Default::default()
    }
}

fn coupon(id: &str, point_value: u32, active: bool) -> RedeemCoupon {
    CouponDraft::percentage(point_value, 10, None).to_coupon(Some(id.into()), active)
}

// =============================================================================
// Points
// =============================================================================

#[tokio::test]
async fn test_stale_points_response_is_discarded() {
    let mut store = PointsStore::new("");
    let first = store.begin_load(&scope()).unwrap();
    let second = store.begin_load(&ChannelScope::new("s1", "c2")).unwrap();

    assert!(store.finish_load(second.ticket, Ok(Some(gems()))));
    let stars = PointSettings {
        point_name: "Stars".into(),
        ..Default::default()
    };
    assert!(!store.finish_load(first.ticket, Ok(Some(stars))));
    assert_eq!(store.settings().point_name, "Gems");
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_switching_to_no_channel_resets_points() {
    let source = MockSource::new().with_points(Reply::Data(gems()));
    let mut store = PointsStore::new("");
    store.load(&source, &scope()).await;
    assert_eq!(store.settings().point_name, "Gems");
    assert!(store.is_edit_mode());

    store
        .load(
            &source,
            &ChannelScope {
                store_id: Some("s1".into()),
                channel_id: None,
            },
        )
        .await;
    let settings = store.settings();
    assert_eq!(settings.point_name, "Points");
    assert!(!settings.expiry);
    assert_eq!(settings.tier, Tier::canonical_defaults());
    assert!(!store.is_edit_mode());
}

#[tokio::test]
async fn test_not_found_loads_defaults() {
    let source = MockSource::new();
    let mut store = PointsStore::new("");
    store.set_point_name("Leftover");
    store.load(&source, &scope()).await;
    assert_eq!(store.settings(), &PointSettings::default());
}

#[tokio::test]
async fn test_failed_load_keeps_state() {
    let source = MockSource::new().with_points(Reply::Data(gems()));
    let mut store = PointsStore::new("");
    store.load(&source, &scope()).await;

    *source.points.lock().unwrap() = Reply::Fail;
    assert!(store.load(&source, &scope()).await);
    assert_eq!(store.settings().point_name, "Gems");
    assert_eq!(store.settings().expiries_in_days, Some(90));
}

#[tokio::test]
async fn test_points_create_then_update() {
    let source = MockSource::new();
    let mut store = PointsStore::new("");
    store.load(&source, &scope()).await;

    store.set_point_name("Stars");
    store.set_custom_logo(LogoUpload::new("star.png", vec![0x89]));
    store.save(&source).await.unwrap();
    assert!(store.is_edit_mode());
    assert!(store.pending_upload().is_none());

    store.select_logo(1);
    store.save(&source).await.unwrap();
    assert_eq!(
        source.calls(),
        vec!["create_points:star.png", "update_points:p-new"]
    );
}

#[tokio::test]
async fn test_points_validation_blocks_save() {
    let source = MockSource::new();
    let mut store = PointsStore::new("");
    store.load(&source, &scope()).await;
    store.set_point_name("   ");

    let err = store.save(&source).await.unwrap_err();
    let errors = err.field_errors().unwrap();
    assert!(errors.get("pointName").is_some());
    assert!(errors.get("logo").is_some());
    assert_eq!(store.errors(), errors);
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_points_save_needs_scope() {
    let source = MockSource::new();
    let mut store = PointsStore::new("");
    store.begin_load(&ChannelScope::default());
    store.select_logo(0);

    let err = store.save(&source).await.unwrap_err();
    assert!(matches!(err, ConsoleError::MissingScope));
    assert!(source.calls().is_empty());
}

// =============================================================================
// Ways to earn
// =============================================================================

fn add_christmas(store: &mut EarnStore) {
    let events = store.events_mut();
    events.set_add_name("Christmas");
    events.set_add_points("150");
    events.set_add_date(NaiveDate::from_ymd_opt(2025, 12, 25));
    store.add_event(today()).unwrap();
}

#[tokio::test]
async fn test_earn_save_adopts_server_ids() {
    let source = MockSource::new();
    let mut store = EarnStore::new();
    store.load(&source, &scope()).await;

    store.set_rule_active(EarnRuleKind::SignUp, true);
    assert_eq!(store.set_rule_points(EarnRuleKind::SignUp, "0100"), "100");
    add_christmas(&mut store);
    assert!(store.is_dirty());

    store.save(&source).await.unwrap();
    assert!(!store.is_dirty());
    assert!(store.is_edit_mode());
    assert_eq!(store.events().items()[0].id.as_deref(), Some("e0"));

    store.save(&source).await.unwrap();
    assert_eq!(source.calls(), vec!["create_collect", "update_collect:col-new"]);
}

#[tokio::test]
async fn test_enabled_rule_without_points_is_rejected() {
    let source = MockSource::new();
    let mut store = EarnStore::new();
    store.load(&source, &scope()).await;
    store.set_rule_active(EarnRuleKind::SignUp, true);
    store.set_rule_active(EarnRuleKind::Newsletter, true);

    let err = store.save(&source).await.unwrap_err();
    assert_eq!(
        err.field_errors().unwrap().get("earnRules"),
        Some("Please enter a value of at least 1 for: Sign up, Subscribing to newsletter")
    );
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_leave_prompt_then_discard() {
    let source = MockSource::new().with_collect(Reply::Data(CollectSettings::default()));
    let mut store = EarnStore::new();
    store.load(&source, &scope()).await;
    add_christmas(&mut store);

    let mut port = RecordingPort::default();
    assert_eq!(store.request_leave("/dashboard", &mut port), LeaveDecision::Prompt);
    assert_eq!(port.prompted, vec!["/dashboard"]);
    assert!(store.before_unload().is_some());

    assert_eq!(store.discard_then_leave().as_deref(), Some("/dashboard"));
    assert!(store.events().items().is_empty());
    assert!(!store.is_dirty());
}

#[tokio::test]
async fn test_leave_prompt_then_save() {
    let source = MockSource::new();
    let mut store = EarnStore::new();
    store.load(&source, &scope()).await;
    add_christmas(&mut store);

    let mut port = RecordingPort::default();
    store.request_leave("/points", &mut port);
    let (_, target) = store.save_then_leave(&source).await.unwrap();
    assert_eq!(target.as_deref(), Some("/points"));
    assert!(!store.is_dirty());
}

#[tokio::test]
async fn test_refresh_skipped_while_dirty() {
    let source = MockSource::new();
    let mut store = EarnStore::new();
    store.load(&source, &scope()).await;
    add_christmas(&mut store);

    assert!(!store.refresh(&source).await);
    assert_eq!(store.events().items().len(), 1);
}

// =============================================================================
// Ways to redeem
// =============================================================================

async fn loaded_redeem(source: &MockSource) -> RedeemStore {
    let mut store = RedeemStore::new();
    store.load(source, &scope()).await;
    store
}

fn three_coupons() -> Vec<RedeemCoupon> {
    vec![
        coupon("r1", 100, true),
        coupon("r2", 200, true),
        coupon("r3", 300, false),
    ]
}

#[tokio::test]
async fn test_bulk_delete_best_effort() {
    let source = MockSource::new()
        .with_coupons(three_coupons())
        .failing(&["r2"]);
    let mut store = loaded_redeem(&source).await;

    let outcome = store
        .bulk_delete(&source, &BulkSelection::All, BulkDeletePolicy::BestEffort)
        .await
        .unwrap();
    assert_eq!(outcome.deleted, vec!["r1", "r3"]);
    assert_eq!(outcome.failed_ids, vec!["r2"]);
    assert!(!outcome.is_complete());

    let left: Vec<_> = store.coupons().iter().filter_map(|c| c.id.as_deref()).collect();
    assert_eq!(left, vec!["r2"]);
    assert!(!store.has_unsaved_changes());
}

#[tokio::test]
async fn test_bulk_delete_all_or_nothing() {
    let source = MockSource::new()
        .with_coupons(three_coupons())
        .failing(&["r2"]);
    let mut store = loaded_redeem(&source).await;

    let err = store
        .bulk_delete(&source, &BulkSelection::All, BulkDeletePolicy::AllOrNothing)
        .await
        .unwrap_err();
    match err {
        ConsoleError::PartialDelete { failed_ids, total } => {
            assert_eq!(failed_ids, vec!["r2"]);
            assert_eq!(total, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.coupons().len(), 3);
}

#[tokio::test]
async fn test_bulk_delete_selected_ids() {
    let source = MockSource::new().with_coupons(three_coupons());
    let mut store = loaded_redeem(&source).await;

    let selection = BulkSelection::Ids(vec!["r3".into()]);
    let outcome = store
        .bulk_delete(&source, &selection, BulkDeletePolicy::AllOrNothing)
        .await
        .unwrap();
    assert!(outcome.is_complete());
    assert_eq!(source.calls(), vec!["delete:r3"]);
    assert_eq!(store.coupons().len(), 2);
}

#[tokio::test]
async fn test_save_active_changes_sends_only_changed() {
    let source = MockSource::new().with_coupons(three_coupons());
    let mut store = loaded_redeem(&source).await;

    store.toggle_active("r1", false);
    store.toggle_active("r3", false);
    assert!(store.has_unsaved_changes());

    assert_eq!(store.save_active_changes(&source).await.unwrap(), 1);
    assert_eq!(source.calls(), vec!["set_active:r1:false"]);
    assert!(!store.has_unsaved_changes());
}

#[tokio::test]
async fn test_create_keeps_pending_toggles() {
    let source = MockSource::new().with_coupons(three_coupons());
    let mut store = loaded_redeem(&source).await;
    store.toggle_active("r1", false);

    let form = CouponForm::Percentage {
        point_value: "750".into(),
        discount: "20".into(),
        expire: "30".into(),
        restriction: RestrictionChoice::AllProducts,
    };
    let created = store.create_coupon(&source, form).await.unwrap();
    assert_eq!(created.id.as_deref(), Some("r-new"));
    assert_eq!(store.coupons().len(), 4);
    assert_eq!(store.pending_toggles(), vec![("r1".to_string(), false)]);
}

#[tokio::test]
async fn test_update_coupon_replaces_terms() {
    let source = MockSource::new().with_coupons(three_coupons());
    let mut store = loaded_redeem(&source).await;

    let form = CouponForm::FreeShipping {
        point_value: "900".into(),
        expire: String::new(),
        minimum_purchase: None,
    };
    store.update_coupon(&source, "r3", form).await.unwrap();

    let updated = store.coupon("r3").unwrap();
    assert_eq!(updated.coupon.value, 900);
    assert!(!updated.is_active());
    assert!(!store.has_unsaved_changes());
}

#[tokio::test]
async fn test_invalid_coupon_form_is_not_sent() {
    let source = MockSource::new();
    let mut store = loaded_redeem(&source).await;

    let form = CouponForm::FreeProduct {
        point_value: "300".into(),
        expire: String::new(),
        products: Vec::new(),
    };
    let err = store.create_coupon(&source, form).await.unwrap_err();
    assert!(err.field_errors().unwrap().get("products").is_some());
    assert!(source.calls().is_empty());
}
