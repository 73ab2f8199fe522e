//! Product ratings.

use crate::domain::account::UserSummary;
use crate::domain::catalog::Product;
use crate::domain::rating::{MAX_RATING, MIN_RATING, NewRating, Rating, RatingView, is_valid_value};
use crate::environment::Environment;
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::RATINGS_ADDED_TOTAL;
use crate::types::{ProductId, RatingId, UserId};
use std::collections::{HashMap, HashSet};

/// Rating operations.
#[derive(Clone)]
pub struct RatingService {
    env: Environment,
}

impl RatingService {
    /// Create a new rating service.
    #[must_use]
    pub const fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Rate a product on behalf of `author`.
    ///
    /// Only buyers holding a completed order of the product may rate it. The
    /// rating insert and the recomputed product average commit together.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidInput`] when the value is outside 1..=5
    /// - [`ServiceError::NotFound`] for an unknown product
    /// - [`ServiceError::Forbidden`] when the author never completed an order of it
    #[tracing::instrument(skip(self, input), fields(product_id = %input.product))]
    pub async fn add_rating(&self, author: UserId, input: NewRating) -> ServiceResult<Rating> {
        if !is_valid_value(input.rating) {
            return Err(ServiceError::InvalidInput(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }

        if self.env.catalog.get_product(input.product).await?.is_none() {
            return Err(ServiceError::not_found("Product"));
        }

        if !self
            .env
            .orders
            .has_completed_purchase(author, input.product)
            .await?
        {
            return Err(ServiceError::Forbidden(
                "You must purchase this product before rating".to_string(),
            ));
        }

        let now = self.env.clock.now();
        let rating = Rating {
            id: RatingId::new(),
            rating: input.rating,
            message: input.message,
            user_id: author,
            product_id: input.product,
            created_at: now,
            updated_at: now,
        };

        let product: Product = self.env.ratings.add_rating(rating.clone()).await?;

        metrics::counter!(RATINGS_ADDED_TOTAL).increment(1);
        tracing::info!(
            rating_id = %rating.id,
            average = product.average_rating,
            count = product.rating_ids.len(),
            "Rating added"
        );
        Ok(rating)
    }

    /// Ratings of a product, newest first, with author name and email.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Unexpected`] on store failure.
    pub async fn list_for_product(&self, product_id: ProductId) -> ServiceResult<Vec<RatingView>> {
        let ratings = self.env.ratings.ratings_for_product(product_id).await?;

        let author_ids: Vec<UserId> = ratings
            .iter()
            .map(|r| r.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let authors: HashMap<UserId, UserSummary> = self
            .env
            .accounts
            .users_by_ids(&author_ids)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();

        Ok(ratings
            .into_iter()
            .map(|rating| RatingView {
                author: authors.get(&rating.user_id).cloned(),
                rating,
            })
            .collect())
    }
}
