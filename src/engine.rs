//! Submission facade: compliance, persistence, matching, reporting.
//!
//! [`MatchingEngine::process_order`] is the single entry point for order
//! submissions. It is the sole writer of order and trade documents; ledger
//! index writes go through the engine's [`Ledger`]. Submissions on the same
//! instrument are serialised by a per-instrument lock; different instruments
//! proceed in parallel.

use crate::compliance::ComplianceGate;
use crate::error::EngineError;
use crate::ledger::Ledger;
use crate::matching::{encode_record, match_against_book};
use crate::store::{keys, MarketStore};
use crate::types::{Order, OrderStatus, Trade};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub struct MatchingEngine {
    store: Arc<dyn MarketStore>,
    gate: Arc<dyn ComplianceGate>,
    ledger: Ledger,
    /// One lock per instrument; submissions for an instrument run one at a time.
    instrument_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MatchingEngine {
    pub fn new(store: Arc<dyn MarketStore>, gate: Arc<dyn ComplianceGate>) -> Self {
        let ledger = Ledger::new(store.clone());
        Self {
            store,
            gate,
            ledger,
            instrument_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Ledger view backed by the same store.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Processes an incoming order and returns the trades it executed, in
    /// match order.
    ///
    /// Sequence: validate, consult compliance, persist the aggressor, match
    /// against the opposite book, rest any residual quantity, re-persist with
    /// final status, report each trade. Compliance rejection and invalid
    /// input leave no state behind; a store failure mid-sequence leaves the
    /// submission indeterminate and the caller must reconcile by document
    /// lookup.
    pub fn process_order(&self, mut aggressor: Order) -> Result<Vec<Trade>, EngineError> {
        validate(&aggressor)?;

        if !self.gate.is_user_compliant(&aggressor.user_id)
            || !self.gate.pre_trade_check(&aggressor)
        {
            return Err(EngineError::ComplianceRejected(aggressor.id));
        }

        let lock = self.instrument_lock(&aggressor.instrument);
        let _serialised = lock.lock().expect("lock");

        // Persisted before matching so ledger user lookups resolve the
        // aggressor's side of trades executed below.
        self.store
            .doc_put(&keys::order(&aggressor.id), &encode_record(&aggressor, "order")?)?;

        let trades = match_against_book(self.store.as_ref(), &self.ledger, &mut aggressor)?;

        if aggressor.remaining_quantity > Decimal::ZERO {
            let book_key = keys::book(aggressor.side, &aggressor.instrument);
            let snapshot = encode_record(&aggressor, "order")?;
            self.store.zadd(&book_key, aggressor.price, &snapshot)?;
            aggressor.status = if aggressor.remaining_quantity < aggressor.initial_quantity {
                OrderStatus::PartiallyFilled
            } else {
                OrderStatus::Open
            };
        } else {
            aggressor.status = OrderStatus::Filled;
        }

        self.store
            .doc_put(&keys::order(&aggressor.id), &encode_record(&aggressor, "order")?)?;

        debug!(
            order_id = %aggressor.id,
            instrument = %aggressor.instrument,
            trades = trades.len(),
            status = ?aggressor.status,
            "submission processed"
        );

        for trade in &trades {
            self.gate.report_trade(trade);
        }
        Ok(trades)
    }

    /// Authoritative order state by id. Orders are never deleted; filled
    /// orders remain retrievable.
    pub fn order(&self, order_id: &str) -> Result<Option<Order>, EngineError> {
        let key = keys::order(order_id);
        let Some(json) = self.store.doc_get(&key)? else {
            return Ok(None);
        };
        let order = serde_json::from_str(&json).map_err(|err| EngineError::MalformedRecord {
            key,
            reason: err.to_string(),
        })?;
        Ok(Some(order))
    }

    fn instrument_lock(&self, instrument: &str) -> Arc<Mutex<()>> {
        self.instrument_locks
            .lock()
            .expect("lock")
            .entry(instrument.to_string())
            .or_default()
            .clone()
    }
}

fn validate(order: &Order) -> Result<(), EngineError> {
    if order.instrument.trim().is_empty() {
        return Err(EngineError::InvalidInput("instrument must not be blank".into()));
    }
    if order.user_id.trim().is_empty() {
        return Err(EngineError::InvalidInput("userId must not be blank".into()));
    }
    if order.price <= Decimal::ZERO {
        return Err(EngineError::InvalidInput(format!(
            "price must be positive, got {}",
            order.price
        )));
    }
    if order.initial_quantity <= Decimal::ZERO {
        return Err(EngineError::InvalidInput(format!(
            "quantity must be positive, got {}",
            order.initial_quantity
        )));
    }
    Ok(())
}
