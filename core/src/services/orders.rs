//! Order placement, listing and status changes.

use crate::domain::account::{User, UserSummary};
use crate::domain::catalog::Product;
use crate::domain::order::{
    LineItem, Order, OrderLineView, OrderStatus, OrderView, PlanError, StockLevel, plan_order,
};
use crate::effects::{Effect, order_placed, order_status_email, product_status_notification};
use crate::environment::Environment;
use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::metrics::{ORDER_STATUS_UPDATES_TOTAL, ORDERS_PLACED_TOTAL, ORDERS_REJECTED_TOTAL};
use crate::types::{OrderId, ProductId, UserId};
use std::collections::{HashMap, HashSet};

/// Order operations.
#[derive(Clone)]
pub struct OrderService {
    env: Environment,
}

impl OrderService {
    /// Create a new order service.
    #[must_use]
    pub const fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Place an order for `buyer`.
    ///
    /// Every line is validated before any stock moves. The approved plan is
    /// then committed with a conditional decrement per product, so an order
    /// racing with this one cannot drive stock below zero; whichever commits
    /// second fails with [`ServiceError::InsufficientStock`] and changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] for an unknown buyer or product
    /// - [`ServiceError::InvalidInput`] for an empty order or a zero quantity
    /// - [`ServiceError::InsufficientStock`] listing every short product
    #[tracing::instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn place_order(&self, buyer: UserId, items: Vec<LineItem>) -> ServiceResult<Order> {
        let Some(user) = self.env.accounts.get_user(buyer).await? else {
            return Err(ServiceError::not_found("User"));
        };

        let ids: Vec<ProductId> = items.iter().map(|item| item.product_id).collect();
        let stock: HashMap<ProductId, StockLevel> = self
            .env
            .catalog
            .products_by_ids(&ids)
            .await?
            .into_iter()
            .map(|product| {
                (
                    product.id,
                    StockLevel {
                        product_name: product.product_name,
                        available: product.quantity,
                    },
                )
            })
            .collect();

        let plan = plan_order(&items, &stock).map_err(|err| {
            let reason = match &err {
                PlanError::Empty | PlanError::ZeroQuantity(_) => "invalid",
                PlanError::UnknownProducts(_) => "unknown_product",
                PlanError::InsufficientStock(_) => "insufficient_stock",
            };
            metrics::counter!(ORDERS_REJECTED_TOTAL, "reason" => reason).increment(1);
            tracing::info!(%buyer, %err, "Order rejected during validation");
            ServiceError::from(err)
        })?;

        let order = Order::pending(OrderId::new(), buyer, plan, self.env.clock.now());
        let order = self.env.orders.commit_order(order).await.map_err(|err| {
            if matches!(err, StoreError::InsufficientStock(_)) {
                metrics::counter!(ORDERS_REJECTED_TOTAL, "reason" => "stock_race").increment(1);
                tracing::info!(%buyer, %err, "Order lost a stock race at commit");
            }
            ServiceError::from(err)
        })?;

        let admins = self.env.accounts.admin_user_ids().await.unwrap_or_else(|err| {
            tracing::warn!(order_id = %order.id, error = %err, "Could not load admins to notify");
            Vec::new()
        });
        self.env
            .outbox
            .enqueue(order_placed(&user, &order, &admins))
            .await;

        metrics::counter!(ORDERS_PLACED_TOTAL).increment(1);
        tracing::info!(order_id = %order.id, %buyer, "Order placed");
        Ok(order)
    }

    /// Every order with buyer and product details.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Unexpected`] on store failure.
    pub async fn list_all(&self) -> ServiceResult<Vec<OrderView>> {
        let orders = self.env.orders.list_orders().await?;
        self.views(orders).await
    }

    /// Orders placed by one user.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the user has no orders.
    pub async fn list_for_user(&self, user_id: UserId) -> ServiceResult<Vec<OrderView>> {
        let orders = self.env.orders.orders_for_user(user_id).await?;
        if orders.is_empty() {
            return Err(ServiceError::NotFound(
                "No orders found for this user".to_string(),
            ));
        }
        self.views(orders).await
    }

    /// Change an order's status and tell everyone who ordered its products.
    ///
    /// Cancelling does not return stock.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidInput`] ("Invalid status") for an unknown status
    /// - [`ServiceError::NotFound`] for an unknown order
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: &str) -> ServiceResult<Order> {
        let next = status
            .parse::<OrderStatus>()
            .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

        let Some(current) = self.env.orders.get_order(id).await? else {
            return Err(ServiceError::not_found("Order"));
        };
        if !current.status.can_transition_to(next) {
            return Err(ServiceError::InvalidInput(format!(
                "Cannot move order from {} to {next}",
                current.status
            )));
        }

        let Some(order) = self
            .env
            .orders
            .update_status(id, next, self.env.clock.now())
            .await?
        else {
            return Err(ServiceError::not_found("Order"));
        };

        let effects = self.status_effects(&order).await;
        self.env.outbox.enqueue(effects).await;

        metrics::counter!(ORDER_STATUS_UPDATES_TOTAL, "status" => next.as_str()).increment(1);
        tracing::info!(order_id = %id, from = %current.status, to = %next, "Order status updated");
        Ok(order)
    }

    /// One notification per distinct past buyer of any product in the order,
    /// naming the products they bought, plus the buyer's email. Lookup
    /// failures only shrink the set.
    async fn status_effects(&self, order: &Order) -> Vec<Effect> {
        let mut effects = Vec::new();

        let ids: Vec<ProductId> = order.product_ids().collect();
        let products: HashMap<ProductId, Product> = match self.env.catalog.products_by_ids(&ids).await {
            Ok(products) => products.into_iter().map(|p| (p.id, p)).collect(),
            Err(err) => {
                tracing::warn!(order_id = %order.id, error = %err, "Could not load order products");
                HashMap::new()
            }
        };

        // First-seen order keeps notifications deterministic
        let mut recipients: Vec<UserId> = Vec::new();
        let mut bought: HashMap<UserId, Vec<&str>> = HashMap::new();
        for product in ids.iter().filter_map(|id| products.get(id)) {
            match self.env.orders.buyers_of_product(product.id).await {
                Ok(buyers) => {
                    for user_id in buyers {
                        bought
                            .entry(user_id)
                            .or_insert_with(|| {
                                recipients.push(user_id);
                                Vec::new()
                            })
                            .push(product.product_name.as_str());
                    }
                }
                Err(err) => {
                    tracing::warn!(product_id = %product.id, error = %err, "Could not load buyers");
                }
            }
        }
        effects.extend(recipients.into_iter().filter_map(|user_id| {
            bought
                .get(&user_id)
                .map(|names| product_status_notification(user_id, &names.join(", "), order.status))
        }));

        match self.env.accounts.get_user(order.user_id).await {
            Ok(Some(buyer)) => effects.push(order_status_email(&buyer, order.id, order.status)),
            Ok(None) => tracing::debug!(order_id = %order.id, "Buyer no longer exists"),
            Err(err) => tracing::warn!(order_id = %order.id, error = %err, "Could not load buyer"),
        }

        effects
    }

    async fn views(&self, orders: Vec<Order>) -> ServiceResult<Vec<OrderView>> {
        let user_ids: Vec<UserId> = orders
            .iter()
            .map(|o| o.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let product_ids: Vec<ProductId> = orders
            .iter()
            .flat_map(Order::product_ids)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let users: HashMap<UserId, User> = self
            .env
            .accounts
            .users_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let products: HashMap<ProductId, Product> = self
            .env
            .catalog
            .products_by_ids(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| OrderView {
                id: order.id,
                user: order.user_id,
                buyer: users.get(&order.user_id).map(UserSummary::from),
                products: order
                    .items
                    .iter()
                    .map(|item| {
                        let product = products.get(&item.product_id);
                        OrderLineView {
                            product: item.product_id,
                            product_name: product.map(|p| p.product_name.clone()),
                            price: product.map(|p| p.price),
                            quantity: item.quantity,
                        }
                    })
                    .collect(),
                status: order.status,
                created_at: order.created_at,
                updated_at: order.updated_at,
            })
            .collect())
    }
}
