use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Route;
use crate::prelude::{GatewayError, GatewayResult};

/// One logged session against a route. `completed` marks a send.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attempt {
    pub id: Uuid,
    pub route_id: Uuid,
    pub location_id: Uuid,
    pub completed: bool,
    pub attempts: u32,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttempt {
    pub route_id: Uuid,
    pub location_id: Uuid,
    pub completed: bool,
    pub attempts: u32,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl NewAttempt {
    /// Starts a form for `route`; the location is taken from the route.
    pub fn for_route(route: &Route) -> Self {
        Self {
            route_id: route.id,
            location_id: route.location_id,
            completed: false,
            attempts: 1,
            date: Utc::now().date_naive(),
            notes: None,
        }
    }

    pub fn with_completed(self, completed: bool) -> Self {
        Self { completed, ..self }
    }

    pub fn with_attempts(self, attempts: u32) -> Self {
        Self { attempts, ..self }
    }

    pub fn with_date(self, date: NaiveDate) -> Self {
        Self { date, ..self }
    }

    pub fn with_notes(self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        Self {
            notes: (!notes.trim().is_empty()).then_some(notes),
            ..self
        }
    }

    pub fn is_submittable(&self) -> bool {
        self.attempts >= 1
    }

    pub fn validate(&self) -> GatewayResult<()> {
        if self.is_submittable() {
            Ok(())
        } else {
            Err(GatewayError::Validation(
                "attempt count must be at least 1".into(),
            ))
        }
    }

    pub fn into_attempt(self, id: Uuid) -> Attempt {
        Attempt {
            id,
            route_id: self.route_id,
            location_id: self.location_id,
            completed: self.completed,
            attempts: self.attempts,
            date: self.date,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttemptPatch {
    pub completed: Option<bool>,
    pub attempts: Option<u32>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl AttemptPatch {
    pub fn with_completed(self, completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..self
        }
    }

    pub fn with_attempts(self, attempts: u32) -> Self {
        Self {
            attempts: Some(attempts),
            ..self
        }
    }

    pub fn with_date(self, date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..self
        }
    }

    pub fn with_notes(self, notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..self
        }
    }

    pub fn validate(&self) -> GatewayResult<()> {
        match self.attempts {
            Some(0) => Err(GatewayError::Validation(
                "attempt count must be at least 1".into(),
            )),
            _ => Ok(()),
        }
    }

    pub fn apply_to(&self, attempt: &mut Attempt) {
        if let Some(completed) = self.completed {
            attempt.completed = completed;
        }
        if let Some(attempts) = self.attempts {
            attempt.attempts = attempts;
        }
        if let Some(date) = self.date {
            attempt.date = date;
        }
        if let Some(notes) = &self.notes {
            attempt.notes = (!notes.trim().is_empty()).then(|| notes.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> Route {
        Route {
            id: Uuid::new_v4(),
            name: "Slab".into(),
            color: "green".into(),
            grade_level_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            is_active: true,
            is_personal: false,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            removed_at: None,
        }
    }

    #[test]
    fn attempt_form_takes_location_from_route() {
        let route = route();
        let form = NewAttempt::for_route(&route).with_completed(true).with_attempts(3);
        assert_eq!(form.location_id, route.location_id);
        assert_eq!(form.attempts, 3);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn zero_attempts_are_rejected() {
        let form = NewAttempt::for_route(&route()).with_attempts(0);
        assert!(!form.is_submittable());
        assert!(matches!(form.validate(), Err(GatewayError::Validation(_))));
        assert!(AttemptPatch::default().with_attempts(0).validate().is_err());
    }

    #[test]
    fn blank_notes_collapse_to_none() {
        let form = NewAttempt::for_route(&route()).with_notes("  ");
        assert_eq!(form.notes, None);
    }
}
