use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub grade_level_id: Uuid,
    pub location_id: Uuid,
    pub is_active: bool,
    pub is_personal: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub removed_at: Option<DateTime<Utc>>,
}

impl Route {
    /// Soft-deactivates the route, stamping the removal time.
    pub fn deactivate(&mut self, at: DateTime<Utc>) {
        self.is_active = false;
        self.removed_at = Some(at);
    }

    /// Whether `user` may see this route: their own, or any shared one.
    pub fn visible_to(&self, user: Uuid) -> bool {
        self.created_by == user || !self.is_personal
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRoute {
    pub name: String,
    pub color: String,
    pub grade_level_id: Uuid,
    pub location_id: Uuid,
    pub is_personal: bool,
}

impl NewRoute {
    pub fn new(location_id: Uuid, grade_level_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: String::new(),
            grade_level_id,
            location_id,
            is_personal: false,
        }
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    pub fn with_color(self, color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            ..self
        }
    }

    pub fn with_grade(self, grade_level_id: Uuid) -> Self {
        Self {
            grade_level_id,
            ..self
        }
    }

    pub fn with_personal(self, is_personal: bool) -> Self {
        Self {
            is_personal,
            ..self
        }
    }

    pub fn is_submittable(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
