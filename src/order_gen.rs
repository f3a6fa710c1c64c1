//! Deterministic synthetic order flow for tests and benchmarks.
//!
//! Same config (including seed) produces the same sequence of order
//! requests, which keeps property tests and benchmarks reproducible.

use crate::types::{Order, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Configuration for the synthetic order stream. All ranges are inclusive.
#[derive(Clone, Debug)]
pub struct FlowConfig {
    /// RNG seed. Same seed produces the same stream.
    pub seed: u64,
    /// Instrument for all generated orders.
    pub instrument: String,
    /// Number of orders produced by [`OrderFlow::all_orders`].
    pub num_orders: usize,
    /// Probability of Buy (0.0..=1.0). Sell otherwise.
    pub buy_ratio: f64,
    /// Price range in hundredths (9850 means 98.50).
    pub price_min_cents: i64,
    pub price_max_cents: i64,
    /// Quantity range, whole units.
    pub quantity_min: u64,
    pub quantity_max: u64,
    /// Number of distinct user ids (USER_001..).
    pub num_users: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            instrument: "GOVT10Y".to_string(),
            num_orders: 1000,
            buy_ratio: 0.5,
            price_min_cents: 9500,
            price_max_cents: 10500,
            quantity_min: 100,
            quantity_max: 10_000,
            num_users: 5,
        }
    }
}

/// Deterministic order stream. Create with [`OrderFlow::new`]; call
/// [`OrderFlow::next_order`] or collect with [`OrderFlow::all_orders`].
pub struct OrderFlow {
    rng: StdRng,
    config: FlowConfig,
}

impl OrderFlow {
    pub fn new(config: FlowConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { rng, config }
    }

    /// Generates the next order. Advances the RNG.
    pub fn next_order(&mut self) -> Order {
        let side = if self.rng.gen::<f64>() < self.config.buy_ratio {
            Side::Buy
        } else {
            Side::Sell
        };
        let cents = self
            .rng
            .gen_range(self.config.price_min_cents..=self.config.price_max_cents);
        let price = Decimal::new(cents, 2);
        let quantity = Decimal::from(
            self.rng
                .gen_range(self.config.quantity_min..=self.config.quantity_max),
        );
        let user = self.rng.gen_range(1..=self.config.num_users.max(1));
        Order::new(
            self.config.instrument.clone(),
            side,
            price,
            quantity,
            format!("USER_{user:03}"),
        )
    }

    /// Returns exactly `n` orders, advancing the stream.
    pub fn take_orders(&mut self, n: usize) -> Vec<Order> {
        (0..n).map(|_| self.next_order()).collect()
    }

    /// Returns the full stream as defined by `config.num_orders`.
    pub fn all_orders(&mut self) -> Vec<Order> {
        self.take_orders(self.config.num_orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let config = FlowConfig {
            seed: 7,
            num_orders: 50,
            ..Default::default()
        };
        let a = OrderFlow::new(config.clone()).all_orders();
        let b = OrderFlow::new(config).all_orders();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.side, y.side);
            assert_eq!(x.price, y.price);
            assert_eq!(x.initial_quantity, y.initial_quantity);
            assert_eq!(x.user_id, y.user_id);
        }
    }

    #[test]
    fn generated_orders_stay_inside_configured_ranges() {
        let config = FlowConfig {
            seed: 3,
            num_orders: 200,
            price_min_cents: 9800,
            price_max_cents: 9900,
            quantity_min: 10,
            quantity_max: 20,
            ..Default::default()
        };
        for order in OrderFlow::new(config).all_orders() {
            assert!(order.price >= Decimal::new(9800, 2));
            assert!(order.price <= Decimal::new(9900, 2));
            assert!(order.initial_quantity >= Decimal::from(10));
            assert!(order.initial_quantity <= Decimal::from(20));
            assert!(order.user_id.starts_with("USER_"));
        }
    }
}
