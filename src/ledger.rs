//! Trade ledger: index maintenance and filtered history queries.
//!
//! [`Ledger::record_trade`] maintains the user/instrument/day tag sets for a
//! trade the engine has already persisted. [`Ledger::query`] seeds from the
//! most selective index, loads candidate trade documents, and post-filters by
//! user, instrument, day range, and monetary value.

use crate::error::StoreError;
use crate::store::{keys, MarketStore};
use crate::types::Trade;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;

/// Optional filters for a ledger query. Empty strings are treated as absent.
#[derive(Clone, Debug, Default)]
pub struct LedgerQuery {
    /// Matches trades where the user is buyer or seller.
    pub user_id: Option<String>,
    pub instrument: Option<String>,
    /// Inclusive `YYYYMMDD` bounds compared against the trade timestamp's day.
    pub start_day: Option<String>,
    pub end_day: Option<String>,
    /// Inclusive bounds on price × quantity.
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl LedgerQuery {
    fn user(&self) -> Option<&str> {
        non_empty(&self.user_id)
    }

    fn instr(&self) -> Option<&str> {
        non_empty(&self.instrument)
    }

    fn start(&self) -> Option<&str> {
        non_empty(&self.start_day)
    }

    fn end(&self) -> Option<&str> {
        non_empty(&self.end_day)
    }
}

fn non_empty(opt: &Option<String>) -> Option<&str> {
    opt.as_deref().filter(|s| !s.is_empty())
}

/// Sole writer of the ledger index sets; read-through query access to trades.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn MarketStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Indexes a persisted trade under buyer-user, seller-user, instrument,
    /// and the indexing clock's current day. Idempotent: sets deduplicate.
    ///
    /// The day key intentionally uses the clock at indexing time rather than
    /// the trade's own timestamp; the two agree except across midnight.
    pub fn record_trade(&self, trade: &Trade) -> Result<(), StoreError> {
        let trade_key = keys::trade(&trade.id);

        if let Some(buyer) = self.order_user_id(&trade.buyer_order_id)? {
            self.store.sadd(&keys::user_trades(&buyer), &trade_key)?;
        }
        if let Some(seller) = self.order_user_id(&trade.seller_order_id)? {
            self.store.sadd(&keys::user_trades(&seller), &trade_key)?;
        }
        self.store
            .sadd(&keys::instrument_trades(&trade.instrument), &trade_key)?;
        self.store
            .sadd(&keys::daily_trades(&today()), &trade_key)?;
        Ok(())
    }

    /// Returns the trades matching every given filter, in no guaranteed order.
    ///
    /// Seeds candidates from the most selective index available
    /// (user > instrument > start day), falling back to a full scan of the
    /// trade prefix only when no seed filter is given. Candidates that fail
    /// to load or decode are skipped with a diagnostic.
    pub fn query(&self, query: &LedgerQuery) -> Result<Vec<Trade>, StoreError> {
        let candidate_keys = if let Some(user) = query.user() {
            self.store.smembers(&keys::user_trades(user))?
        } else if let Some(instrument) = query.instr() {
            self.store.smembers(&keys::instrument_trades(instrument))?
        } else if let Some(start) = query.start() {
            self.store.smembers(&keys::daily_trades(start))?
        } else {
            self.store.scan_prefix(keys::TRADE_PREFIX)?
        };

        let mut trades = Vec::new();
        for key in candidate_keys {
            let Some(json) = self.store.doc_get(&key)? else {
                continue;
            };
            let trade: Trade = match serde_json::from_str(&json) {
                Ok(t) => t,
                Err(err) => {
                    warn!(%key, %err, "skipping malformed trade document");
                    continue;
                }
            };
            if self.matches(&trade, query)? {
                trades.push(trade);
            }
        }
        Ok(trades)
    }

    fn matches(&self, trade: &Trade, query: &LedgerQuery) -> Result<bool, StoreError> {
        if let Some(user) = query.user() {
            let buyer = self.order_user_id(&trade.buyer_order_id)?;
            let seller = self.order_user_id(&trade.seller_order_id)?;
            if buyer.as_deref() != Some(user) && seller.as_deref() != Some(user) {
                return Ok(false);
            }
        }

        if let Some(instrument) = query.instr() {
            if instrument != trade.instrument {
                return Ok(false);
            }
        }

        if query.start().is_some() || query.end().is_some() {
            let Some(day) = trade_day(&trade.timestamp) else {
                return Ok(false);
            };
            if let Some(start) = query.start() {
                if day.as_str() < start {
                    return Ok(false);
                }
            }
            if let Some(end) = query.end() {
                if day.as_str() > end {
                    return Ok(false);
                }
            }
        }

        let amount = trade.amount();
        if let Some(min) = query.min_amount {
            if amount < min {
                return Ok(false);
            }
        }
        if let Some(max) = query.max_amount {
            if amount > max {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Recovers a user id from the referenced order document. Missing or
    /// malformed documents yield `None`: the user is treated as unknown.
    fn order_user_id(&self, order_id: &str) -> Result<Option<String>, StoreError> {
        let key = keys::order(order_id);
        let Some(json) = self.store.doc_get(&key)? else {
            return Ok(None);
        };
        match serde_json::from_str::<crate::types::Order>(&json) {
            Ok(order) => Ok(Some(order.user_id)),
            Err(err) => {
                warn!(%key, %err, "skipping malformed order document during user lookup");
                Ok(None)
            }
        }
    }
}

/// The indexing clock's current day, `YYYYMMDD`.
pub fn today() -> String {
    Utc::now().format("%Y%m%d").to_string()
}

/// `YYYYMMDD` day of an ISO-8601 timestamp (first ten characters, dashes
/// stripped). `None` if the timestamp is too short to carry a date.
fn trade_day(timestamp: &str) -> Option<String> {
    let date = timestamp.get(0..10)?;
    Some(date.replace('-', ""))
}
