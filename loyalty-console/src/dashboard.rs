//! Program overview shown on the dashboard

use chrono::NaiveDate;
use serde::Serialize;
use shared::models::{CollectSettings, PointSettings, RedeemCoupon, Tier};

/// One onboarding step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupStep {
    pub title: &'static str,
    pub route: &'static str,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub points_configured: bool,
    pub point_name: String,
    pub tiers_enabled: bool,
    pub tiers: Vec<Tier>,
    pub enabled_earn_rules: Vec<&'static str>,
    pub events_active: bool,
    pub upcoming_events: usize,
    pub active_coupons: usize,
    pub inactive_coupons: usize,
    pub steps: Vec<SetupStep>,
}

impl DashboardSummary {
    pub fn compute(
        points: &PointSettings,
        collect: &CollectSettings,
        coupons: &[RedeemCoupon],
        today: NaiveDate,
    ) -> Self {
        let enabled_earn_rules = collect.enabled_rules();
        let active_coupons = coupons.iter().filter(|c| c.is_active()).count();
        let upcoming_events = collect
            .event
            .events
            .iter()
            .filter(|e| e.is_upcoming() && e.date() >= today)
            .count();

        let steps = vec![
            SetupStep {
                title: "Set up your points",
                route: "/points",
                done: points.is_persisted(),
            },
            SetupStep {
                title: "Choose ways to earn",
                route: "/ways-to-earn",
                done: !enabled_earn_rules.is_empty(),
            },
            SetupStep {
                title: "Create ways to redeem",
                route: "/ways-to-redeem",
                done: active_coupons > 0,
            },
        ];

        Self {
            points_configured: points.is_persisted(),
            point_name: points.point_name.clone(),
            tiers_enabled: points.tier_status,
            tiers: points.tier.clone(),
            enabled_earn_rules,
            events_active: collect.event.active,
            upcoming_events,
            active_coupons,
            inactive_coupons: coupons.len() - active_coupons,
            steps,
        }
    }

    pub fn completed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.done).count()
    }

    /// Every setup step is done
    pub fn program_active(&self) -> bool {
        self.completed_steps() == self.steps.len()
    }

    /// First step still to do
    pub fn next_step(&self) -> Option<&SetupStep> {
        self.steps.iter().find(|s| !s.done)
    }
}
