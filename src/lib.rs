//! # Bond Matching Engine
//!
//! Limit-order matching engine and trade ledger for a bond marketplace:
//! per-instrument order books with price-time priority, partial-fill
//! accounting, and multi-dimensional trade history queries over a
//! document/sorted-set/tag-set store.
//!
//! ## Entry points
//!
//! [`MatchingEngine::process_order`] submits an order and returns the trades
//! it executed; [`Ledger::query`] filters trade history by user, instrument,
//! day range, and monetary value. Both sit on a [`MarketStore`] (in-process
//! [`MemoryStore`] by default) behind a pluggable [`ComplianceGate`].
//!
//! ## Example
//!
//! ```rust
//! use bond_matching_engine::{DefaultComplianceGate, MatchingEngine, MemoryStore, Order, Side};
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let engine = MatchingEngine::new(Arc::new(MemoryStore::new()), Arc::new(DefaultComplianceGate));
//! let ask = Order::new("GOVT10Y", Side::Sell, Decimal::new(9850, 2), Decimal::from(1000), "U2");
//! engine.process_order(ask).unwrap();
//!
//! let bid = Order::new("GOVT10Y", Side::Buy, Decimal::new(9860, 2), Decimal::from(1000), "U1");
//! let trades = engine.process_order(bid).unwrap();
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].price, Decimal::new(9850, 2)); // execution at the resting price
//! ```

pub mod api;
pub mod compliance;
pub mod engine;
pub mod error;
pub mod ledger;
mod matching;
pub mod order_gen;
pub mod store;
pub mod types;

pub use compliance::{ComplianceGate, DefaultComplianceGate, RecordingComplianceGate};
pub use engine::MatchingEngine;
pub use error::{EngineError, StoreError};
pub use ledger::{Ledger, LedgerQuery};
pub use store::{keys, MarketStore, MemoryStore};
pub use types::{Order, OrderRequest, OrderStatus, Side, Trade};
