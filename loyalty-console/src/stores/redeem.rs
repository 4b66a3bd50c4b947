//! Ways-to-redeem coupons

use loyalty_client::ClientResult;
use rust_decimal::Decimal;
use shared::form::{FloatPolicy, IntegerPolicy, sanitize_float, sanitize_integer};
use shared::models::{CatalogRef, CouponDraft, RedeemCoupon, RedeemType};
use shared::validation::{
    FieldErrors, validate_fixed_discount, validate_free_product, validate_free_shipping,
    validate_percentage_discount,
};
use std::str::FromStr;

use super::source::SettingsSource;
use super::tokens::{LoadRequest, LoadTicket, RequestTokens};
use crate::context::ChannelScope;
use crate::error::{ConsoleError, ConsoleResult};
use crate::guard::{ChangeGuard, LeaveDecision, NavigationPort};
use crate::reconcile::{BulkDeletePolicy, BulkSelection, Reconcilable};

/// Which products a percentage coupon applies to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RestrictionChoice {
    #[default]
    AllProducts,
    Products(Vec<CatalogRef>),
    Collections(Vec<CatalogRef>),
}

/// Raw create / edit form, one variant per coupon type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponForm {
    Percentage {
        point_value: String,
        discount: String,
        expire: String,
        restriction: RestrictionChoice,
    },
    FixedDiscount {
        points_per_unit: String,
        expire: String,
        /// `None` when the per-redemption cap is off
        max_points: Option<String>,
    },
    FreeShipping {
        point_value: String,
        expire: String,
        /// `None` when the minimum purchase toggle is off
        minimum_purchase: Option<String>,
    },
    FreeProduct {
        point_value: String,
        expire: String,
        products: Vec<CatalogRef>,
    },
}

impl CouponForm {
    pub fn redeem_type(&self) -> RedeemType {
        match self {
            Self::Percentage { .. } => RedeemType::Purchase,
            Self::FixedDiscount { .. } => RedeemType::FixedDiscount,
            Self::FreeShipping { .. } => RedeemType::FreeShipping,
            Self::FreeProduct { .. } => RedeemType::FreeProduct,
        }
    }

    /// Pre-fill the edit form from a stored coupon
    pub fn from_coupon(coupon: &RedeemCoupon) -> Self {
        let details = &coupon.coupon;
        let point_value = details.value.to_string();
        let expire = details.expire.map(|d| d.to_string()).unwrap_or_default();
        let restriction = &details.restriction;

        match coupon.redeem_type {
            RedeemType::Purchase => Self::Percentage {
                point_value,
                discount: details.discount_amount.to_string(),
                expire,
                restriction: if restriction.selected_items.status {
                    RestrictionChoice::Products(restriction.selected_items.items.clone())
                } else if restriction.selected_collections.status {
                    RestrictionChoice::Collections(
                        restriction.selected_collections.collections.clone(),
                    )
                } else {
                    RestrictionChoice::AllProducts
                },
            },
            RedeemType::FixedDiscount => Self::FixedDiscount {
                points_per_unit: point_value,
                expire,
                max_points: details.max_points_per_redemption.map(|max| max.to_string()),
            },
            RedeemType::FreeShipping => Self::FreeShipping {
                point_value,
                expire,
                minimum_purchase: details
                    .minimum_purchase_amount
                    .map(|amount| amount.normalize().to_string()),
            },
            RedeemType::FreeProduct => Self::FreeProduct {
                point_value,
                expire,
                products: restriction.selected_items.items.clone(),
            },
        }
    }

    /// Apply the input sanitizers each field uses while typing
    pub fn sanitized(mut self) -> Self {
        let amount = |text: &mut String, policy| *text = sanitize_integer(text, policy);
        match &mut self {
            Self::Percentage {
                point_value,
                discount,
                expire,
                ..
            } => {
                amount(point_value, IntegerPolicy::POINT_VALUE);
                amount(discount, IntegerPolicy::DISCOUNT_PERCENT);
                amount(expire, IntegerPolicy::EXPIRY_DAYS);
            }
            Self::FixedDiscount {
                points_per_unit,
                expire,
                max_points,
            } => {
                amount(points_per_unit, IntegerPolicy::POINT_VALUE);
                amount(expire, IntegerPolicy::EXPIRY_DAYS);
                if let Some(max) = max_points {
                    amount(max, IntegerPolicy::POINT_VALUE);
                }
            }
            Self::FreeShipping {
                point_value,
                expire,
                minimum_purchase,
            } => {
                amount(point_value, IntegerPolicy::POINT_VALUE);
                amount(expire, IntegerPolicy::EXPIRY_DAYS);
                if let Some(min) = minimum_purchase {
                    *min = sanitize_float(min, FloatPolicy::AMOUNT);
                }
            }
            Self::FreeProduct {
                point_value,
                expire,
                ..
            } => {
                amount(point_value, IntegerPolicy::POINT_VALUE);
                amount(expire, IntegerPolicy::EXPIRY_DAYS);
            }
        }
        self
    }

    pub fn validate(&self) -> FieldErrors {
        match self {
            Self::Percentage {
                point_value,
                discount,
                expire,
                restriction,
            } => {
                let mut errors = validate_percentage_discount(point_value, discount, expire);
                match restriction {
                    RestrictionChoice::Products(items) if items.is_empty() => {
                        errors.insert("restriction", "Please select at least one product");
                    }
                    RestrictionChoice::Collections(items) if items.is_empty() => {
                        errors.insert("restriction", "Please select at least one collection");
                    }
                    _ => {}
                }
                errors
            }
            Self::FixedDiscount {
                points_per_unit,
                expire,
                max_points,
            } => validate_fixed_discount(points_per_unit, expire, max_points.as_deref()),
            Self::FreeShipping {
                point_value,
                expire,
                minimum_purchase,
            } => validate_free_shipping(point_value, expire, minimum_purchase.as_deref()),
            Self::FreeProduct {
                point_value,
                expire,
                products,
            } => validate_free_product(point_value, expire, products.len()),
        }
    }

    /// Validated request body
    pub fn to_draft(&self) -> Result<CouponDraft, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let draft = match self {
            Self::Percentage {
                point_value,
                discount,
                expire,
                restriction,
            } => {
                let draft =
                    CouponDraft::percentage(whole(point_value), whole(discount), days(expire));
                match restriction {
                    RestrictionChoice::AllProducts => draft,
                    RestrictionChoice::Products(items) => draft.restrict_to_products(items.clone()),
                    RestrictionChoice::Collections(collections) => {
                        draft.restrict_to_collections(collections.clone())
                    }
                }
            }
            Self::FixedDiscount {
                points_per_unit,
                expire,
                max_points,
            } => CouponDraft::fixed_discount(
                whole(points_per_unit),
                days(expire),
                max_points.as_deref().map(whole),
            ),
            Self::FreeShipping {
                point_value,
                expire,
                minimum_purchase,
            } => CouponDraft::free_shipping(
                whole(point_value),
                days(expire),
                minimum_purchase
                    .as_deref()
                    .and_then(|m| Decimal::from_str(m.trim().trim_end_matches('.')).ok()),
            ),
            Self::FreeProduct {
                point_value,
                expire,
                products,
            } => CouponDraft::free_product(whole(point_value), days(expire), products.clone()),
        };
        Ok(draft)
    }
}

// Only called after validation, so the text is a whole number in range.
fn whole(text: &str) -> u32 {
    text.trim().parse().unwrap_or(0)
}

fn days(text: &str) -> Option<u32> {
    text.trim().parse().ok().filter(|d| *d > 0)
}

/// Result of a bulk delete that was not rejected outright
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteOutcome {
    pub deleted: Vec<String>,
    pub failed_ids: Vec<String>,
}

impl BulkDeleteOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed_ids.is_empty()
    }

    pub fn total(&self) -> usize {
        self.deleted.len() + self.failed_ids.len()
    }
}

#[derive(Debug)]
pub struct RedeemStore {
    coupons: Vec<RedeemCoupon>,
    guard: ChangeGuard<Vec<RedeemCoupon>>,
    scope: ChannelScope,
    tokens: RequestTokens,
    errors: FieldErrors,
    loading: bool,
}

impl Default for RedeemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RedeemStore {
    pub fn new() -> Self {
        Self {
            coupons: Vec::new(),
            guard: ChangeGuard::new(Vec::new()),
            scope: ChannelScope::default(),
            tokens: RequestTokens::default(),
            errors: FieldErrors::new(),
            loading: false,
        }
    }

    pub fn coupons(&self) -> &[RedeemCoupon] {
        &self.coupons
    }

    pub fn coupon(&self, coupon_id: &str) -> Option<&RedeemCoupon> {
        self.coupons.iter().find(|c| c.server_id() == Some(coupon_id))
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn adopt(&mut self, coupons: Vec<RedeemCoupon>) {
        self.guard.reset(&coupons);
        self.coupons = coupons;
        self.errors = FieldErrors::new();
    }

    fn scope_ids(&self) -> ConsoleResult<(String, String)> {
        self.scope
            .resolved()
            .map(|(s, c)| (s.to_string(), c.to_string()))
            .ok_or(ConsoleError::MissingScope)
    }

    /// Apply an already persisted change to both the live list and the
    /// snapshot, so pending toggles stay pending
    fn apply_persisted(&mut self, change: impl Fn(&mut Vec<RedeemCoupon>)) {
        change(&mut self.coupons);
        let mut saved = self.guard.snapshot().clone();
        change(&mut saved);
        self.guard.mark_saved(&saved);
    }

    // ========== Load ==========

    pub fn begin_load(&mut self, scope: &ChannelScope) -> Option<LoadRequest> {
        self.scope = scope.clone();
        let (_, request) = LoadRequest::issue(&mut self.tokens, scope);
        if request.is_none() {
            self.adopt(Vec::new());
        }
        self.loading = request.is_some();
        request
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        outcome: ClientResult<Vec<RedeemCoupon>>,
    ) -> bool {
        if !self.tokens.is_current(ticket) {
            tracing::debug!(ticket = ticket.value(), "Discarding stale redeem response");
            return false;
        }
        self.loading = false;

        match outcome {
            Ok(coupons) => self.adopt(coupons),
            Err(e) if e.is_not_found() => self.adopt(Vec::new()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load coupons, keeping current list");
            }
        }
        true
    }

    pub async fn load<S>(&mut self, source: &S, scope: &ChannelScope) -> bool
    where
        S: SettingsSource + ?Sized,
    {
        let Some(request) = self.begin_load(scope) else {
            return true;
        };
        let outcome = source
            .load_coupons(&request.store_id, &request.channel_id)
            .await;
        self.finish_load(request.ticket, outcome)
    }

    /// Re-fetch the list; the backend is the reconciliation point
    pub async fn refresh<S>(&mut self, source: &S) -> bool
    where
        S: SettingsSource + ?Sized,
    {
        let scope = self.scope.clone();
        self.load(source, &scope).await
    }

    // ========== Active toggles ==========

    /// Flip a coupon locally; saved by [`RedeemStore::save_active_changes`]
    pub fn toggle_active(&mut self, coupon_id: &str, active: bool) -> bool {
        match self
            .coupons
            .iter_mut()
            .find(|c| c.server_id() == Some(coupon_id))
        {
            Some(coupon) => {
                coupon.coupon.active = active;
                true
            }
            None => false,
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.guard.is_dirty(&self.coupons)
    }

    /// Coupons whose active flag differs from the last save
    pub fn pending_toggles(&self) -> Vec<(String, bool)> {
        let saved = self.guard.snapshot();
        self.coupons
            .iter()
            .filter_map(|coupon| {
                let id = coupon.server_id()?;
                let before = saved.iter().find(|s| s.server_id() == Some(id))?;
                (before.coupon.active != coupon.coupon.active)
                    .then(|| (id.to_string(), coupon.coupon.active))
            })
            .collect()
    }

    /// Push changed active flags; returns how many were sent
    pub async fn save_active_changes<S>(&mut self, source: &S) -> ConsoleResult<usize>
    where
        S: SettingsSource + ?Sized,
    {
        let (store_id, channel_id) = self.scope_ids()?;
        let toggles = self.pending_toggles();
        let sent = push_toggles(source, &store_id, &channel_id, &toggles).await?;
        self.guard.mark_saved(&self.coupons);
        Ok(sent)
    }

    pub fn request_leave(&mut self, target: &str, port: &mut impl NavigationPort) -> LeaveDecision {
        self.guard.route(&self.coupons, target, port)
    }

    pub fn before_unload(&self) -> Option<&'static str> {
        self.guard.before_unload(&self.coupons)
    }

    pub fn cancel_leave(&mut self) {
        self.guard.cancel_leave();
    }

    pub fn navigation_settled(&mut self) {
        self.guard.navigation_settled();
    }

    /// Push pending toggles, then release the pending navigation target
    pub async fn save_then_leave<S>(&mut self, source: &S) -> ConsoleResult<(usize, Option<String>)>
    where
        S: SettingsSource + ?Sized,
    {
        let (store_id, channel_id) = self.scope_ids()?;
        let toggles = self.pending_toggles();
        let save = push_toggles(source, &store_id, &channel_id, &toggles);
        self.guard.save_then_leave(&self.coupons, save).await
    }

    /// Revert every toggle; returns the pending navigation target
    pub fn discard_changes(&mut self) -> Option<String> {
        self.guard.discard_then_leave(&mut self.coupons)
    }

    // ========== CRUD ==========

    pub async fn create_coupon<S>(&mut self, source: &S, form: CouponForm) -> ConsoleResult<RedeemCoupon>
    where
        S: SettingsSource + ?Sized,
    {
        let draft = self.checked_draft(form)?;
        let (store_id, channel_id) = self.scope_ids()?;

        let response = source.create_coupon(&store_id, &channel_id, &draft).await?;
        if !response.success {
            return Err(ConsoleError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "Failed to create coupon".to_string()),
            ));
        }

        let created = response
            .data
            .unwrap_or_else(|| draft.to_coupon(None, true));
        tracing::info!(coupon_id = ?created.id, kind = ?created.redeem_type, "Coupon created");

        let pushed = created.clone();
        self.apply_persisted(|list| list.push(pushed.clone()));
        Ok(created)
    }

    /// Replace a coupon's terms; its local active flag is left alone
    pub async fn update_coupon<S>(
        &mut self,
        source: &S,
        coupon_id: &str,
        form: CouponForm,
    ) -> ConsoleResult<RedeemCoupon>
    where
        S: SettingsSource + ?Sized,
    {
        let active = self
            .coupon(coupon_id)
            .map(RedeemCoupon::is_active)
            .ok_or_else(|| ConsoleError::Rejected("Coupon not found".to_string()))?;
        let draft = self.checked_draft(form)?;
        let (store_id, channel_id) = self.scope_ids()?;

        let response = source
            .update_coupon(coupon_id, &store_id, &channel_id, &draft)
            .await?;
        if !response.success {
            return Err(ConsoleError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "Failed to update coupon".to_string()),
            ));
        }

        let updated = response
            .data
            .unwrap_or_else(|| draft.to_coupon(Some(coupon_id.to_string()), active));
        tracing::info!(coupon_id, "Coupon updated");

        self.apply_persisted(|list| {
            if let Some(slot) = list.iter_mut().find(|c| c.server_id() == Some(coupon_id)) {
                let active = slot.coupon.active;
                *slot = updated.clone();
                slot.coupon.active = active;
            }
        });
        Ok(updated)
    }

    pub async fn delete_coupon<S>(&mut self, source: &S, coupon_id: &str) -> ConsoleResult<()>
    where
        S: SettingsSource + ?Sized,
    {
        let (store_id, channel_id) = self.scope_ids()?;
        source.delete_coupon(coupon_id, &store_id, &channel_id).await?;
        tracing::info!(coupon_id, "Coupon deleted");

        self.apply_persisted(|list| list.retain(|c| c.server_id() != Some(coupon_id)));
        Ok(())
    }

    /// Delete the selected coupons concurrently
    ///
    /// Deletes that succeeded server-side are never rolled back. Under
    /// [`BulkDeletePolicy::BestEffort`] they leave the local list and the
    /// failures are reported in the outcome; under
    /// [`BulkDeletePolicy::AllOrNothing`] any failure is an error and the local
    /// list waits for the next refresh.
    pub async fn bulk_delete<S>(
        &mut self,
        source: &S,
        selection: &BulkSelection,
        policy: BulkDeletePolicy,
    ) -> ConsoleResult<BulkDeleteOutcome>
    where
        S: SettingsSource + ?Sized,
    {
        let (store_id, channel_id) = self.scope_ids()?;
        let ids = selection.resolve(&self.coupons);
        if ids.is_empty() {
            return Ok(BulkDeleteOutcome::default());
        }

        let report = source.delete_coupons(&ids, &store_id, &channel_id).await;
        let outcome = BulkDeleteOutcome {
            failed_ids: report.failed_ids(),
            deleted: report.deleted,
        };

        if !outcome.is_complete() {
            tracing::warn!(
                failed = outcome.failed_ids.len(),
                total = outcome.total(),
                ?policy,
                "Bulk coupon delete partially failed"
            );
            if policy == BulkDeletePolicy::AllOrNothing {
                return Err(ConsoleError::PartialDelete {
                    total: outcome.total(),
                    failed_ids: outcome.failed_ids,
                });
            }
        }

        let deleted = outcome.deleted.clone();
        self.apply_persisted(|list| {
            list.retain(|c| c.server_id().is_none_or(|id| !deleted.iter().any(|d| d == id)))
        });
        tracing::info!(deleted = outcome.deleted.len(), "Coupons deleted");
        Ok(outcome)
    }

    fn checked_draft(&mut self, form: CouponForm) -> ConsoleResult<CouponDraft> {
        match form.sanitized().to_draft() {
            Ok(draft) => {
                self.errors = FieldErrors::new();
                Ok(draft)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(ConsoleError::Validation(errors))
            }
        }
    }
}

async fn push_toggles<S>(
    source: &S,
    store_id: &str,
    channel_id: &str,
    toggles: &[(String, bool)],
) -> ConsoleResult<usize>
where
    S: SettingsSource + ?Sized,
{
    for (coupon_id, active) in toggles {
        let response = source
            .set_coupon_active(coupon_id, store_id, channel_id, *active)
            .await?;
        if !response.success {
            return Err(ConsoleError::Rejected(response.message.unwrap_or_else(|| {
                format!("Failed to update coupon {coupon_id}")
            })));
        }
    }
    if !toggles.is_empty() {
        tracing::info!(count = toggles.len(), "Coupon active flags saved");
    }
    Ok(toggles.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{CouponDetails, TargetType};

    fn percentage(point_value: &str, discount: &str) -> CouponForm {
        CouponForm::Percentage {
            point_value: point_value.into(),
            discount: discount.into(),
            expire: String::new(),
            restriction: RestrictionChoice::AllProducts,
        }
    }

    #[test]
    fn test_percentage_draft() {
        let draft = percentage("500", "10").to_draft().unwrap();
        assert_eq!(draft.redeem_type, RedeemType::Purchase);
        assert_eq!(draft.point_value, 500);
        assert_eq!(draft.discount_amount, 10);
        assert_eq!(draft.expire, None);
        assert!(draft.product_restriction_disabled);
    }

    #[test]
    fn test_percentage_rejects_out_of_range() {
        let errors = percentage("0", "101").validate();
        assert!(errors.get("pointValue").is_some());
        assert!(errors.get("discountAmount").is_some());
    }

    #[test]
    fn test_sanitizing_snaps_to_ceiling() {
        let form = percentage("250000", "150").sanitized();
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.point_value, 100_000);
        assert_eq!(draft.discount_amount, 100);
    }

    #[test]
    fn test_empty_restriction_is_rejected() {
        let form = CouponForm::Percentage {
            point_value: "100".into(),
            discount: "5".into(),
            expire: "30".into(),
            restriction: RestrictionChoice::Collections(Vec::new()),
        };
        assert!(form.validate().get("restriction").is_some());
    }

    #[test]
    fn test_fixed_discount_and_shipping() {
        let fixed = CouponForm::FixedDiscount {
            points_per_unit: "100".into(),
            expire: String::new(),
            max_points: Some("2000".into()),
        }
        .to_draft()
        .unwrap();
        assert_eq!(fixed.discount_amount, 1);
        assert_eq!(fixed.max_points_per_redemption, Some(2000));

        let shipping = CouponForm::FreeShipping {
            point_value: "800".into(),
            expire: "30".into(),
            minimum_purchase: Some("25.".into()),
        }
        .to_draft()
        .unwrap();
        assert_eq!(shipping.target_type, TargetType::ShippingLine);
        assert_eq!(shipping.minimum_purchase_amount, Some(Decimal::new(25, 0)));
        assert_eq!(shipping.expire, Some(30));
    }

    #[test]
    fn test_free_product_needs_products() {
        let form = CouponForm::FreeProduct {
            point_value: "300".into(),
            expire: String::new(),
            products: Vec::new(),
        };
        assert!(form.validate().get("products").is_some());
    }

    #[test]
    fn test_form_round_trips_through_coupon() {
        let draft = CouponDraft::percentage(400, 15, Some(60))
            .restrict_to_products(vec![CatalogRef::new(7, "Mug")]);
        let coupon = draft.to_coupon(Some("r1".into()), true);

        let form = CouponForm::from_coupon(&coupon);
        assert_eq!(form.to_draft().unwrap(), draft);
    }

    #[test]
    fn test_limits_round_trip_through_coupon() {
        let shipping = CouponDraft::free_shipping(800, Some(30), Some(Decimal::new(5000, 2)));
        let form = CouponForm::from_coupon(&shipping.to_coupon(Some("r2".into()), true));
        match &form {
            CouponForm::FreeShipping { minimum_purchase, .. } => {
                assert_eq!(minimum_purchase.as_deref(), Some("50"));
            }
            other => panic!("unexpected form {other:?}"),
        }
        assert_eq!(form.to_draft().unwrap(), shipping);

        let fixed = CouponDraft::fixed_discount(100, None, Some(2000));
        let form = CouponForm::from_coupon(&fixed.to_coupon(Some("r3".into()), true));
        assert_eq!(form.to_draft().unwrap(), fixed);
    }

    #[test]
    fn test_limits_off_stay_off() {
        let shipping = CouponDraft::free_shipping(800, None, None);
        let form = CouponForm::from_coupon(&shipping.to_coupon(None, true));
        assert_eq!(form.to_draft().unwrap().minimum_purchase_amount, None);
    }

    #[test]
    fn test_pending_toggles_only_lists_changes() {
        let coupon = |id: &str, active: bool| RedeemCoupon {
            id: Some(id.into()),
            redeem_type: RedeemType::Purchase,
            coupon: CouponDetails {
                active,
                ..Default::default()
            },
        };
        let mut store = RedeemStore::new();
        store.adopt(vec![coupon("r1", true), coupon("r2", false)]);
        assert!(!store.has_unsaved_changes());

        assert!(store.toggle_active("r2", true));
        assert!(!store.toggle_active("missing", true));
        assert!(store.has_unsaved_changes());
        assert_eq!(store.pending_toggles(), vec![("r2".to_string(), true)]);

        store.discard_changes();
        assert!(!store.has_unsaved_changes());
        assert!(!store.coupon("r2").unwrap().is_active());
    }
}
