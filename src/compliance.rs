//! Compliance gate: pre-trade predicates and post-trade reporting.
//!
//! The gate is a replaceable policy boundary. Real KYC/AML lookups, position
//! limits, and regulator wire formats belong behind [`ComplianceGate`], not
//! inside the matching engine. Defaults are permissive.

use crate::types::{Order, Side, Trade};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Policy seam consulted once per submission (the two predicates in
/// conjunction) and once per executed trade.
pub trait ComplianceGate: Send + Sync {
    /// KYC/AML authorization for the submitting user. Blank users are not compliant.
    fn is_user_compliant(&self, user_id: &str) -> bool;

    /// Pre-trade risk check on the order about to enter matching.
    fn pre_trade_check(&self, order: &Order) -> bool;

    /// Post-trade regulatory reporting side-effect.
    fn report_trade(&self, trade: &Trade);

    /// Whether the user may trade this instrument. Default policy: allow.
    fn is_authorized_for_instrument(&self, _user_id: &str, _instrument: &str) -> bool {
        true
    }

    /// Whether a trade of this value crosses an enhanced-reporting threshold.
    /// Default policy: never.
    fn requires_enhanced_reporting(&self, _trade_value: Decimal) -> bool {
        false
    }
}

/// Permissive gate that logs its decisions. Production deployments replace
/// this with an implementation backed by real compliance systems.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultComplianceGate;

impl ComplianceGate for DefaultComplianceGate {
    fn is_user_compliant(&self, user_id: &str) -> bool {
        if user_id.trim().is_empty() {
            return false;
        }
        debug!(user_id, "checking KYC/AML status");
        true
    }

    fn pre_trade_check(&self, order: &Order) -> bool {
        if order.side == Side::Sell {
            debug!(
                user_id = %order.user_id,
                instrument = %order.instrument,
                "checking holdings for sell order"
            );
        }
        true
    }

    fn report_trade(&self, trade: &Trade) {
        info!(trade_id = %trade.id, "reporting trade to regulator");
        if self.requires_enhanced_reporting(trade.amount()) {
            info!(trade_id = %trade.id, amount = %trade.amount(), "enhanced reporting required");
        }
    }
}

/// Gate that records reported trades in memory, for tests. Clone shares the
/// same backing buffer. `compliant = false` makes both predicates fail.
#[derive(Clone)]
pub struct RecordingComplianceGate {
    reported: Arc<Mutex<Vec<Trade>>>,
    compliant: bool,
}

impl RecordingComplianceGate {
    pub fn new() -> Self {
        Self {
            reported: Arc::new(Mutex::new(Vec::new())),
            compliant: true,
        }
    }

    /// A gate that rejects every submission.
    pub fn denying() -> Self {
        Self {
            compliant: false,
            ..Self::new()
        }
    }

    pub fn reported(&self) -> Vec<Trade> {
        self.reported.lock().expect("lock").clone()
    }
}

impl Default for RecordingComplianceGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplianceGate for RecordingComplianceGate {
    fn is_user_compliant(&self, user_id: &str) -> bool {
        self.compliant && !user_id.trim().is_empty()
    }

    fn pre_trade_check(&self, _order: &Order) -> bool {
        self.compliant
    }

    fn report_trade(&self, trade: &Trade) {
        self.reported.lock().expect("lock").push(trade.clone());
    }
}
