//! Price-time priority matching against the store-backed book.
//!
//! [`match_against_book`] runs one aggressor against the opposite side of its
//! instrument: fills at the resting price, persists and indexes each trade,
//! and removes or re-queues the consumed resting snapshots. The caller (the
//! engine) owns compliance, aggressor persistence, and residual insertion.

use crate::error::EngineError;
use crate::ledger::Ledger;
use crate::store::{keys, MarketStore};
use crate::types::{Order, OrderStatus, Side, Trade};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Serializes a record the engine constructed itself. Failure here is a
/// programming error, surfaced as [`EngineError::InternalEncodeError`].
pub(crate) fn encode_record<T: serde::Serialize>(
    value: &T,
    what: &'static str,
) -> Result<String, EngineError> {
    serde_json::to_string(value).map_err(|err| EngineError::InternalEncodeError {
        what,
        reason: err.to_string(),
    })
}

/// Matches the aggressor against the opposite book in priority order:
/// lowest ask first for a buy, highest bid first for a sell, FIFO within a
/// price level. Mutates the aggressor's remaining quantity and returns the
/// executed trades in match order.
///
/// Malformed book entries are skipped with a diagnostic; the first
/// non-crossing entry ends the walk, since no later entry can cross either.
pub(crate) fn match_against_book(
    store: &dyn MarketStore,
    ledger: &Ledger,
    aggressor: &mut Order,
) -> Result<Vec<Trade>, EngineError> {
    let opposite_key = keys::book(aggressor.side.opposite(), &aggressor.instrument);
    let entries = match aggressor.side {
        Side::Buy => store.zrange_asc(&opposite_key)?,
        Side::Sell => store.zrange_desc(&opposite_key)?,
    };

    let mut trades = Vec::new();
    for (level_price, member) in entries {
        let mut resting: Order = match serde_json::from_str(&member) {
            Ok(order) => order,
            Err(err) => {
                warn!(book = %opposite_key, %err, "skipping malformed book entry");
                continue;
            }
        };

        let crosses = match aggressor.side {
            Side::Buy => aggressor.price >= level_price,
            Side::Sell => aggressor.price <= level_price,
        };
        if !crosses || aggressor.remaining_quantity.is_zero() {
            break;
        }

        let quantity = aggressor.remaining_quantity.min(resting.remaining_quantity);
        aggressor.remaining_quantity -= quantity;
        resting.remaining_quantity -= quantity;

        let trade = Trade::from_match(aggressor, &resting, resting.price, quantity);
        store.doc_put(&keys::trade(&trade.id), &encode_record(&trade, "trade")?)?;
        ledger.record_trade(&trade)?;
        debug!(
            trade_id = %trade.id,
            price = %trade.price,
            quantity = %trade.quantity,
            "executed fill"
        );
        trades.push(trade);

        // The consumed snapshot leaves the book; a partially filled resting
        // order re-queues with its updated remaining quantity.
        store.zrem(&opposite_key, &member)?;
        if resting.remaining_quantity > Decimal::ZERO {
            resting.status = OrderStatus::PartiallyFilled;
            let snapshot = encode_record(&resting, "order")?;
            store.zadd(&opposite_key, resting.price, &snapshot)?;
        } else {
            resting.status = OrderStatus::Filled;
        }
        store.doc_put(&keys::order(&resting.id), &encode_record(&resting, "order")?)?;
    }

    Ok(trades)
}
