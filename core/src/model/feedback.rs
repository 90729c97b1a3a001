use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::prelude::{GatewayError, GatewayResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackCategory {
    Bug,
    Feature,
    #[default]
    General,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rating: u8,
    pub message: String,
    pub category: FeedbackCategory,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub rating: u8,
    pub message: String,
    pub category: FeedbackCategory,
}

impl NewFeedback {
    pub fn new(rating: u8, message: impl Into<String>) -> Self {
        Self {
            rating,
            message: message.into(),
            category: FeedbackCategory::default(),
        }
    }

    pub fn with_category(self, category: FeedbackCategory) -> Self {
        Self { category, ..self }
    }

    pub fn with_rating(self, rating: u8) -> Self {
        Self { rating, ..self }
    }

    pub fn with_message(self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..self
        }
    }

    pub fn is_submittable(&self) -> bool {
        (1..=5).contains(&self.rating) && !self.message.trim().is_empty()
    }

    pub fn validate(&self) -> GatewayResult<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(GatewayError::Validation(format!(
                "rating {} outside 1..=5",
                self.rating
            )));
        }
        if self.message.trim().is_empty() {
            return Err(GatewayError::Validation("feedback message is empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
}
