//! Ways-to-redeem coupons

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Coupon flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedeemType {
    /// Percentage off the order
    #[default]
    Purchase,
    FixedDiscount,
    FreeShipping,
    FreeProduct,
}

impl RedeemType {
    pub const ALL: [RedeemType; 4] = [
        Self::Purchase,
        Self::FixedDiscount,
        Self::FreeShipping,
        Self::FreeProduct,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Purchase => "Percentage Discount",
            Self::FixedDiscount => "Fixed Discount",
            Self::FreeShipping => "Free Shipping",
            Self::FreeProduct => "Free Product",
        }
    }

    /// What the discount applies to on the storefront
    pub fn target_type(&self) -> TargetType {
        match self {
            Self::FreeShipping => TargetType::ShippingLine,
            _ => TargetType::LineItem,
        }
    }
}

impl fmt::Display for RedeemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    LineItem,
    ShippingLine,
}

/// Whether a restricted coupon targets products or collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestrictionType {
    #[default]
    Product,
    Collection,
}

/// Catalog entity (product or collection) picked for a restriction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

impl CatalogRef {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemSelection {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub items: Vec<CatalogRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionSelection {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub collections: Vec<CatalogRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRestriction {
    #[serde(default)]
    pub selected_items: ItemSelection,
    #[serde(default)]
    pub selected_collections: CollectionSelection,
}

impl CouponRestriction {
    pub fn is_restricted(&self) -> bool {
        self.selected_items.status || self.selected_collections.status
    }
}

/// Coupon parameters as stored by the backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponDetails {
    /// Point cost
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub discount_amount: u32,
    #[serde(default)]
    pub has_expiry: bool,
    /// Days after issue; `None` means the coupon never expires
    #[serde(default, deserialize_with = "lenient_days")]
    pub expire: Option<u32>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub restriction: CouponRestriction,
    /// Free shipping only
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub minimum_purchase_amount: Option<Decimal>,
    /// Fixed discount only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_points_per_redemption: Option<u32>,
}

/// Redemption rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemCoupon {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub redeem_type: RedeemType,
    #[serde(default)]
    pub coupon: CouponDetails,
}

impl RedeemCoupon {
    pub fn is_active(&self) -> bool {
        self.coupon.active
    }

    /// Same type, cost and discount
    pub fn same_shape(&self, other: &RedeemCoupon) -> bool {
        self.redeem_type == other.redeem_type
            && self.coupon.value == other.coupon.value
            && self.coupon.discount_amount == other.coupon.discount_amount
    }

    /// One-line summary for tables and the dashboard
    pub fn summary(&self) -> String {
        match self.redeem_type {
            RedeemType::Purchase => format!(
                "{}% off for {} points",
                self.coupon.discount_amount, self.coupon.value
            ),
            RedeemType::FixedDiscount => format!("1 off per {} points", self.coupon.value),
            RedeemType::FreeShipping => format!("Free shipping for {} points", self.coupon.value),
            RedeemType::FreeProduct => format!("Free product for {} points", self.coupon.value),
        }
    }
}

/// Create / update body for a coupon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouponDraft {
    #[serde(rename = "redeemType")]
    pub redeem_type: RedeemType,
    pub target_type: TargetType,
    #[serde(rename = "pointValue")]
    pub point_value: u32,
    #[serde(rename = "discountAmount")]
    pub discount_amount: u32,
    pub expire: Option<u32>,
    #[serde(rename = "selectedItems")]
    pub selected_items: Vec<CatalogRef>,
    #[serde(rename = "selectedCollections")]
    pub selected_collections: Vec<CatalogRef>,
    /// `true` means the coupon applies to every product
    #[serde(rename = "seletedProductDisable")]
    pub product_restriction_disabled: bool,
    #[serde(rename = "currentRestrictionType")]
    pub restriction_type: RestrictionType,
    #[serde(
        rename = "minimumPurchaseAmount",
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub minimum_purchase_amount: Option<Decimal>,
    #[serde(rename = "maxPointsPerRedemption", skip_serializing_if = "Option::is_none")]
    pub max_points_per_redemption: Option<u32>,
}

impl CouponDraft {
    fn base(redeem_type: RedeemType, point_value: u32, expire: Option<u32>) -> Self {
        Self {
            redeem_type,
            target_type: redeem_type.target_type(),
            point_value,
            discount_amount: 0,
            expire,
            selected_items: Vec::new(),
            selected_collections: Vec::new(),
            product_restriction_disabled: true,
            restriction_type: RestrictionType::Product,
            minimum_purchase_amount: None,
            max_points_per_redemption: None,
        }
    }

    /// Percentage discount for `point_value` points
    pub fn percentage(point_value: u32, discount_amount: u32, expire: Option<u32>) -> Self {
        Self {
            discount_amount,
            ..Self::base(RedeemType::Purchase, point_value, expire)
        }
    }

    /// One currency unit off per `points_per_unit` points
    pub fn fixed_discount(points_per_unit: u32, expire: Option<u32>, max_points: Option<u32>) -> Self {
        Self {
            discount_amount: 1,
            max_points_per_redemption: max_points,
            ..Self::base(RedeemType::FixedDiscount, points_per_unit, expire)
        }
    }

    pub fn free_shipping(point_value: u32, expire: Option<u32>, minimum_purchase: Option<Decimal>) -> Self {
        Self {
            minimum_purchase_amount: minimum_purchase,
            ..Self::base(RedeemType::FreeShipping, point_value, expire)
        }
    }

    pub fn free_product(point_value: u32, expire: Option<u32>, products: Vec<CatalogRef>) -> Self {
        Self {
            selected_items: products,
            product_restriction_disabled: false,
            ..Self::base(RedeemType::FreeProduct, point_value, expire)
        }
    }

    /// Limit to the given products
    pub fn restrict_to_products(mut self, items: Vec<CatalogRef>) -> Self {
        self.product_restriction_disabled = false;
        self.restriction_type = RestrictionType::Product;
        self.selected_items = items;
        self.selected_collections.clear();
        self
    }

    /// Limit to the given collections
    pub fn restrict_to_collections(mut self, collections: Vec<CatalogRef>) -> Self {
        self.product_restriction_disabled = false;
        self.restriction_type = RestrictionType::Collection;
        self.selected_collections = collections;
        self.selected_items.clear();
        self
    }

    /// The coupon the backend is expected to store for this draft
    pub fn to_coupon(&self, id: Option<String>, active: bool) -> RedeemCoupon {
        let restricted = !self.product_restriction_disabled;
        RedeemCoupon {
            id,
            redeem_type: self.redeem_type,
            coupon: CouponDetails {
                value: self.point_value,
                discount_amount: self.discount_amount,
                has_expiry: self.expire.is_some(),
                expire: self.expire,
                active,
                restriction: CouponRestriction {
                    selected_items: ItemSelection {
                        status: restricted && self.restriction_type == RestrictionType::Product,
                        items: self.selected_items.clone(),
                    },
                    selected_collections: CollectionSelection {
                        status: restricted && self.restriction_type == RestrictionType::Collection,
                        collections: self.selected_collections.clone(),
                    },
                },
                minimum_purchase_amount: self.minimum_purchase_amount,
                max_points_per_redemption: self.max_points_per_redemption,
            },
        }
    }
}

/// Expiry days arrive as a number, a numeric string, an empty string or null
fn lenient_days<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(0)) | None => None,
        Some(Raw::Number(days)) => Some(days),
        Some(Raw::Text(text)) => text.trim().parse::<u32>().ok().filter(|d| *d > 0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coupon_from_server() {
        let json = r#"{
            "_id": "r1",
            "redeemType": "purchase",
            "coupon": {
                "value": 500,
                "discountAmount": 10,
                "hasExpiry": true,
                "expire": "30",
                "active": true,
                "restriction": {
                    "selectedItems": {"status": true, "items": [{"id": 77, "name": "Mug"}]}
                }
            }
        }"#;
        let coupon: RedeemCoupon = serde_json::from_str(json).unwrap();
        assert_eq!(coupon.id.as_deref(), Some("r1"));
        assert_eq!(coupon.redeem_type, RedeemType::Purchase);
        assert_eq!(coupon.coupon.expire, Some(30));
        assert!(coupon.is_active());
        assert!(coupon.coupon.restriction.is_restricted());
        assert!(!coupon.coupon.restriction.selected_collections.status);
        assert_eq!(coupon.summary(), "10% off for 500 points");
    }

    #[test]
    fn test_expire_variants() {
        for (raw, expected) in [
            ("null", None),
            ("\"\"", None),
            ("0", None),
            ("45", Some(45)),
            ("\" 7 \"", Some(7)),
        ] {
            let json = format!(r#"{{"expire": {raw}}}"#);
            let details: CouponDetails = serde_json::from_str(&json).unwrap();
            assert_eq!(details.expire, expected, "input {raw}");
        }
    }

    #[test]
    fn test_percentage_draft_wire_shape() {
        let draft = CouponDraft::percentage(1000, 15, None);
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["redeemType"], "purchase");
        assert_eq!(value["target_type"], "line_item");
        assert_eq!(value["pointValue"], 1000);
        assert_eq!(value["discountAmount"], 15);
        assert!(value["expire"].is_null());
        assert_eq!(value["seletedProductDisable"], true);
        assert_eq!(value["currentRestrictionType"], "product");
        assert!(value.get("minimumPurchaseAmount").is_none());
    }

    #[test]
    fn test_restriction_switch_clears_other_side() {
        let draft = CouponDraft::percentage(100, 5, Some(30))
            .restrict_to_products(vec![CatalogRef::new(1, "Mug")])
            .restrict_to_collections(vec![CatalogRef::new(9, "Summer")]);
        assert!(draft.selected_items.is_empty());
        assert_eq!(draft.restriction_type, RestrictionType::Collection);

        let coupon = draft.to_coupon(None, true);
        assert!(coupon.coupon.has_expiry);
        assert!(coupon.coupon.restriction.selected_collections.status);
        assert!(!coupon.coupon.restriction.selected_items.status);
    }

    #[test]
    fn test_coupon_limits_from_server() {
        let json = r#"{
            "redeemType": "free_shipping",
            "coupon": {"value": 800, "minimumPurchaseAmount": 49.5, "active": true}
        }"#;
        let coupon: RedeemCoupon = serde_json::from_str(json).unwrap();
        assert_eq!(coupon.coupon.minimum_purchase_amount, Some(Decimal::new(495, 1)));
        assert_eq!(coupon.coupon.max_points_per_redemption, None);

        let value = serde_json::to_value(&coupon.coupon).unwrap();
        assert!(value.get("maxPointsPerRedemption").is_none());
    }

    #[test]
    fn test_fixed_discount_cap_survives_to_coupon() {
        let coupon = CouponDraft::fixed_discount(100, None, Some(2000)).to_coupon(None, true);
        assert_eq!(coupon.coupon.max_points_per_redemption, Some(2000));
        assert_eq!(coupon.coupon.minimum_purchase_amount, None);
    }

    #[test]
    fn test_free_shipping_targets_shipping_line() {
        let draft = CouponDraft::free_shipping(800, None, Some(Decimal::new(5000, 2)));
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["target_type"], "shipping_line");
        assert_eq!(value["minimumPurchaseAmount"], serde_json::json!(50.0));
    }
}
