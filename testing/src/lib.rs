//! # Storefront Testing
//!
//! Testing utilities for the storefront backend.
//!
//! This crate provides:
//! - [`InMemoryStore`]: every store trait behind one mutex, used by tests and
//!   by the server when no database is configured
//! - [`RecordingMailer`]: captures outgoing email, optionally failing
//! - Deterministic clocks ([`FixedClock`], [`ManualClock`])
//! - [`TestHarness`]: a wired [`Environment`](storefront_core::Environment)
//!   with seeding helpers
//! - proptest strategies for order line items
//!
//! ## Example
//!
//! ```ignore
//! use storefront_testing::TestHarness;
//! use storefront_core::domain::order::LineItem;
//! use storefront_core::Role;
//!
//! #[tokio::test]
//! async fn test_order_flow() {
//!     let harness = TestHarness::new();
//!     let buyer = harness.seed_user("Ada", Role::Customer).await;
//!     let lamp = harness.seed_product("Lamp", 5, 1999).await;
//!
//!     let order = harness
//!         .orders()
//!         .place_order(buyer.id, vec![LineItem::new(lamp.id, 3)])
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(harness.stock_of(lamp.id).await, 2);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]

mod harness;
mod mailer;
mod memory_store;

use chrono::{DateTime, Utc};
use storefront_core::environment::Clock;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_testing::mocks::FixedClock;
    /// use storefront_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to.
    ///
    /// Lets tests order records by creation time without sleeping.
    #[derive(Debug)]
    pub struct ManualClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        /// Create a clock starting at `time`.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Move the clock forward.
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// proptest strategies for storefront types.
pub mod strategies {
    use proptest::prelude::*;
    use storefront_core::ProductId;
    use storefront_core::domain::order::LineItem;

    /// Non-empty line item lists drawn from `products`, quantities 1..=`max_quantity`.
    ///
    /// Products may repeat, which exercises line aggregation.
    pub fn line_items(
        products: Vec<ProductId>,
        max_quantity: u32,
    ) -> impl Strategy<Value = Vec<LineItem>> {
        let count = products.len().max(1);
        proptest::collection::vec(
            (0..count, 1..=max_quantity.max(1)),
            1..=count * 2,
        )
        .prop_map(move |picks| {
            picks
                .into_iter()
                .filter_map(|(index, quantity)| {
                    products.get(index).map(|id| LineItem::new(*id, quantity))
                })
                .collect()
        })
    }
}

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
/// Honours `RUST_LOG`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use harness::TestHarness;
pub use mailer::RecordingMailer;
pub use memory_store::InMemoryStore;
pub use mocks::{FixedClock, ManualClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(test_clock().now());
        let before = clock.now();
        clock.advance(chrono::Duration::seconds(5));
        assert_eq!(clock.now() - before, chrono::Duration::seconds(5));
    }
}
