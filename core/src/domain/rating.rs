//! Product ratings.

use crate::domain::account::UserSummary;
use crate::types::{ProductId, RatingId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest accepted rating value.
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating value.
pub const MAX_RATING: u8 = 5;

/// A rating left by a buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// Rating id
    pub id: RatingId,
    /// Value between [`MIN_RATING`] and [`MAX_RATING`]
    pub rating: u8,
    /// Optional comment
    pub message: Option<String>,
    /// Author profile
    #[serde(rename = "user")]
    pub user_id: UserId,
    /// Rated product
    #[serde(rename = "product")]
    pub product_id: ProductId,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for rating a product. The author comes from the caller's token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRating {
    /// Value between [`MIN_RATING`] and [`MAX_RATING`]
    pub rating: u8,
    /// Optional comment
    #[serde(default)]
    pub message: Option<String>,
    /// Rated product
    pub product: ProductId,
}

/// Rating joined with its author's name and email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingView {
    /// The rating
    #[serde(flatten)]
    pub rating: Rating,
    /// Author details, when the profile still exists
    pub author: Option<UserSummary>,
}

/// Whether a rating value is within the accepted range.
#[must_use]
pub const fn is_valid_value(value: u8) -> bool {
    value >= MIN_RATING && value <= MAX_RATING
}

/// Arithmetic mean of rating values, 0 when there are none.
#[must_use]
pub fn average_rating(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: u64 = values.iter().map(|v| u64::from(*v)).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = sum as f64 / values.len() as f64;
    mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_average_of_no_ratings_is_zero() {
        assert!(average_rating(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_of_ratings() {
        assert!((average_rating(&[5, 4, 3]) - 4.0).abs() < f64::EPSILON);
        assert!((average_rating(&[1, 2]) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_value_range() {
        assert!(!is_valid_value(0));
        assert!(is_valid_value(1));
        assert!(is_valid_value(5));
        assert!(!is_valid_value(6));
    }

    proptest! {
        #[test]
        fn prop_average_is_mean_and_bounded(values in proptest::collection::vec(1u8..=5, 1..200)) {
            let avg = average_rating(&values);
            let expected = values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64;
            prop_assert!((avg - expected).abs() < 1e-9);
            prop_assert!((1.0..=5.0).contains(&avg));
        }
    }
}
