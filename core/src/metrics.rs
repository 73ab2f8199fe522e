//! Metric names and descriptions.
//!
//! Recording happens through the `metrics` facade; the server installs the
//! Prometheus exporter and calls [`register_metrics`] once at startup.

use ::metrics::describe_counter;

/// Orders committed.
pub const ORDERS_PLACED_TOTAL: &str = "storefront_orders_placed_total";
/// Orders rejected during validation or commit.
pub const ORDERS_REJECTED_TOTAL: &str = "storefront_orders_rejected_total";
/// Order status changes.
pub const ORDER_STATUS_UPDATES_TOTAL: &str = "storefront_order_status_updates_total";
/// Ratings accepted.
pub const RATINGS_ADDED_TOTAL: &str = "storefront_ratings_added_total";
/// Login attempts, labelled by outcome.
pub const LOGINS_TOTAL: &str = "storefront_logins_total";
/// Accounts registered.
pub const REGISTRATIONS_TOTAL: &str = "storefront_registrations_total";
/// Side effects delivered, labelled by kind.
pub const EFFECTS_DISPATCHED_TOTAL: &str = "storefront_effects_dispatched_total";
/// Side effects that could not be delivered, labelled by kind.
pub const EFFECTS_FAILED_TOTAL: &str = "storefront_effects_failed_total";
/// Side effects dropped because the queue was full, labelled by kind.
pub const EFFECTS_DROPPED_TOTAL: &str = "storefront_effects_dropped_total";

/// Register descriptions for every storefront metric.
pub fn register_metrics() {
    describe_counter!(ORDERS_PLACED_TOTAL, "Total number of orders placed");
    describe_counter!(
        ORDERS_REJECTED_TOTAL,
        "Total number of orders rejected, labelled by reason"
    );
    describe_counter!(
        ORDER_STATUS_UPDATES_TOTAL,
        "Total number of order status changes, labelled by new status"
    );
    describe_counter!(RATINGS_ADDED_TOTAL, "Total number of ratings accepted");
    describe_counter!(LOGINS_TOTAL, "Total login attempts, labelled by outcome");
    describe_counter!(REGISTRATIONS_TOTAL, "Total number of accounts registered");
    describe_counter!(
        EFFECTS_DISPATCHED_TOTAL,
        "Total side effects delivered, labelled by kind"
    );
    describe_counter!(
        EFFECTS_FAILED_TOTAL,
        "Total side effects that failed delivery, labelled by kind"
    );
    describe_counter!(
        EFFECTS_DROPPED_TOTAL,
        "Total side effects dropped on a full queue, labelled by kind"
    );
}
