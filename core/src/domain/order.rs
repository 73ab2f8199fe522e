//! Orders and the order-placement rules.
//!
//! [`plan_order`] is the validation half of order placement: it checks every
//! line item against a stock snapshot and either approves the whole order or
//! reports every failing line. It never mutates anything. The persistence
//! layer then applies the approved plan with a conditional decrement
//! (see `OrderStore::commit_order`), so a concurrent order that drained stock
//! between planning and commit is still rejected.

use crate::domain::account::UserSummary;
use crate::types::{Money, OrderId, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Status
// ============================================================================

/// Order lifecycle status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, awaiting fulfilment
    #[default]
    Pending,
    /// Delivered; unlocks rating the contained products
    Completed,
    /// Cancelled by an administrator
    Cancelled,
}

impl OrderStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Completed, Self::Cancelled];

    /// Wire/database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Allowed `(from, to)` status changes.
    ///
    /// Every pair is currently allowed, including re-opening cancelled
    /// orders. Cancellation does not restore stock.
    pub const TRANSITIONS: [(Self, Self); 9] = [
        (Self::Pending, Self::Pending),
        (Self::Pending, Self::Completed),
        (Self::Pending, Self::Cancelled),
        (Self::Completed, Self::Pending),
        (Self::Completed, Self::Completed),
        (Self::Completed, Self::Cancelled),
        (Self::Cancelled, Self::Pending),
        (Self::Cancelled, Self::Completed),
        (Self::Cancelled, Self::Cancelled),
    ];

    /// Whether an administrator may move an order from `self` to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        Self::TRANSITIONS.contains(&(self, next))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status")]
pub struct InvalidStatus(pub String);

impl FromStr for OrderStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

/// A (product, quantity) pair within a cart or an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineItem {
    /// Product being bought
    #[serde(rename = "product")]
    pub product_id: ProductId,
    /// Units requested
    pub quantity: u32,
}

impl LineItem {
    /// Create a new line item.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order id
    pub id: OrderId,
    /// Buyer profile
    #[serde(rename = "user")]
    pub user_id: UserId,
    /// Line items, one per product
    #[serde(rename = "products")]
    pub items: Vec<LineItem>,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a pending order from an approved plan.
    #[must_use]
    pub fn pending(id: OrderId, user_id: UserId, plan: OrderPlan, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            items: plan.lines,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Products contained in the order.
    pub fn product_ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.items.iter().map(|item| item.product_id)
    }

    /// Whether the order contains the given product.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }
}

/// Order line joined with product name and price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    /// Product id
    pub product: ProductId,
    /// Product name, when the product still exists
    pub product_name: Option<String>,
    /// Current unit price, when the product still exists
    pub price: Option<Money>,
    /// Units ordered
    pub quantity: u32,
}

/// Order joined with buyer and product details, as returned by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    /// Order id
    pub id: OrderId,
    /// Buyer id
    pub user: UserId,
    /// Buyer name and email, when the profile still exists
    pub buyer: Option<UserSummary>,
    /// Lines with product details
    pub products: Vec<OrderLineView>,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Planning
// ============================================================================

/// Stock snapshot of a single product, input to [`plan_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLevel {
    /// Product name, used in error messages
    pub product_name: String,
    /// Units available
    pub available: u32,
}

/// A line that cannot be served from current stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortfall {
    /// Product id
    pub product_id: ProductId,
    /// Product name
    pub product_name: String,
    /// Units requested across all lines for this product
    pub requested: u32,
    /// Units available
    pub available: u32,
}

/// An order approved against a stock snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    /// One line per distinct product, in first-seen order
    pub lines: Vec<LineItem>,
}

/// Why an order cannot be placed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// No line items at all.
    #[error("Order must contain at least one product")]
    Empty,

    /// A line asks for zero units.
    #[error("Quantity for product {0} must be at least 1")]
    ZeroQuantity(ProductId),

    /// Some products do not exist.
    #[error("Product {} not found", join(.0))]
    UnknownProducts(Vec<ProductId>),

    /// Some products do not have enough stock.
    #[error("Not enough stock for {}", shortfall_names(.0))]
    InsufficientStock(Vec<Shortfall>),
}

fn join(ids: &[ProductId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Comma-separated product names of a shortfall list.
#[must_use]
pub fn shortfall_names(shortfalls: &[Shortfall]) -> String {
    shortfalls
        .iter()
        .map(|s| s.product_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Merge lines for the same product by summing their quantities.
///
/// Keeps the order in which products first appear. Quantities saturate at
/// `u32::MAX`, which no stock level can satisfy.
#[must_use]
pub fn aggregate_lines(items: &[LineItem]) -> Vec<LineItem> {
    let mut lines: Vec<LineItem> = Vec::with_capacity(items.len());
    for item in items {
        match lines.iter_mut().find(|l| l.product_id == item.product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => lines.push(*item),
        }
    }
    lines
}

/// Validate every line of an order against a stock snapshot.
///
/// All lines are checked before anything is decided: unknown products are
/// reported together, then every shortfall is reported together. Duplicate
/// lines for one product are summed before comparing with stock.
///
/// # Errors
///
/// Returns [`PlanError`] describing every failing line.
pub fn plan_order(
    items: &[LineItem],
    stock: &HashMap<ProductId, StockLevel>,
) -> Result<OrderPlan, PlanError> {
    if items.is_empty() {
        return Err(PlanError::Empty);
    }
    if let Some(item) = items.iter().find(|i| i.quantity == 0) {
        return Err(PlanError::ZeroQuantity(item.product_id));
    }

    let lines = aggregate_lines(items);

    let unknown: Vec<ProductId> = lines
        .iter()
        .filter(|l| !stock.contains_key(&l.product_id))
        .map(|l| l.product_id)
        .collect();
    if !unknown.is_empty() {
        return Err(PlanError::UnknownProducts(unknown));
    }

    let shortfalls: Vec<Shortfall> = lines
        .iter()
        .filter_map(|line| {
            let level = stock.get(&line.product_id)?;
            (level.available < line.quantity).then(|| Shortfall {
                product_id: line.product_id,
                product_name: level.product_name.clone(),
                requested: line.quantity,
                available: level.available,
            })
        })
        .collect();
    if !shortfalls.is_empty() {
        return Err(PlanError::InsufficientStock(shortfalls));
    }

    Ok(OrderPlan { lines })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn stock(entries: &[(ProductId, &str, u32)]) -> HashMap<ProductId, StockLevel> {
        entries
            .iter()
            .map(|(id, name, available)| {
                (
                    *id,
                    StockLevel {
                        product_name: (*name).to_string(),
                        available: *available,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_plan_accepts_available_stock() {
        let p = ProductId::new();
        let plan = plan_order(&[LineItem::new(p, 3)], &stock(&[(p, "Lamp", 5)])).unwrap();
        assert_eq!(plan.lines, vec![LineItem::new(p, 3)]);
    }

    #[test]
    fn test_plan_reports_every_shortfall() {
        let a = ProductId::new();
        let b = ProductId::new();
        let c = ProductId::new();
        let levels = stock(&[(a, "Lamp", 1), (b, "Desk", 10), (c, "Chair", 0)]);

        let err = plan_order(
            &[LineItem::new(a, 2), LineItem::new(b, 1), LineItem::new(c, 1)],
            &levels,
        )
        .unwrap_err();

        match err {
            PlanError::InsufficientStock(shortfalls) => {
                let ids: Vec<_> = shortfalls.iter().map(|s| s.product_id).collect();
                assert_eq!(ids, vec![a, c]);
                assert_eq!(shortfalls[0].requested, 2);
                assert_eq!(shortfalls[0].available, 1);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_sums_duplicate_lines_before_checking() {
        let p = ProductId::new();
        let levels = stock(&[(p, "Lamp", 5)]);

        let err = plan_order(&[LineItem::new(p, 3), LineItem::new(p, 3)], &levels).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Not enough stock for Lamp",
            "two lines of 3 must not pass against stock of 5"
        );
    }

    #[test]
    fn test_plan_rejects_unknown_products_before_stock() {
        let known = ProductId::new();
        let missing = ProductId::new();
        let levels = stock(&[(known, "Lamp", 0)]);

        let err = plan_order(
            &[LineItem::new(known, 1), LineItem::new(missing, 1)],
            &levels,
        )
        .unwrap_err();

        assert_eq!(err, PlanError::UnknownProducts(vec![missing]));
    }

    #[test]
    fn test_plan_rejects_empty_and_zero_quantity() {
        let p = ProductId::new();
        assert_eq!(plan_order(&[], &HashMap::new()), Err(PlanError::Empty));
        assert_eq!(
            plan_order(&[LineItem::new(p, 0)], &stock(&[(p, "Lamp", 1)])),
            Err(PlanError::ZeroQuantity(p))
        );
    }

    #[test]
    fn test_every_transition_is_allowed() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_transition_table_has_no_duplicates() {
        let unique: HashSet<_> = OrderStatus::TRANSITIONS.iter().collect();
        assert_eq!(unique.len(), OrderStatus::TRANSITIONS.len());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("completed".parse(), Ok(OrderStatus::Completed));
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid status");
    }

    proptest! {
        #[test]
        fn prop_plan_approves_iff_every_product_has_enough(
            requests in proptest::collection::vec((0usize..4, 1u32..10), 1..8),
            available in proptest::collection::vec(0u32..20, 4),
        ) {
            let ids: Vec<ProductId> = (0..4).map(|_| ProductId::new()).collect();
            let levels: HashMap<_, _> = ids
                .iter()
                .zip(&available)
                .map(|(id, a)| (*id, StockLevel { product_name: id.to_string(), available: *a }))
                .collect();
            let items: Vec<LineItem> = requests
                .iter()
                .map(|(idx, qty)| LineItem::new(ids[*idx], *qty))
                .collect();

            let mut totals: HashMap<ProductId, u32> = HashMap::new();
            for item in &items {
                *totals.entry(item.product_id).or_default() += item.quantity;
            }
            let satisfiable = totals.iter().all(|(id, qty)| levels[id].available >= *qty);

            match plan_order(&items, &levels) {
                Ok(plan) => {
                    prop_assert!(satisfiable);
                    prop_assert_eq!(plan.lines.len(), totals.len());
                    for line in &plan.lines {
                        prop_assert_eq!(line.quantity, totals[&line.product_id]);
                    }
                }
                Err(PlanError::InsufficientStock(shortfalls)) => {
                    prop_assert!(!satisfiable);
                    for s in &shortfalls {
                        prop_assert!(s.requested > s.available);
                    }
                }
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
        }
    }
}
