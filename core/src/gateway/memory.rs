use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::gateway::{DataGateway, SessionStore};
use crate::model::{
    compute_stats, Attempt, AttemptPatch, Feedback, GradeLevel, Location, LocationPatch,
    NewAttempt, NewFeedback, NewLocation, NewRoute, Profile, Route, UserStats,
};
use crate::prelude::{GatewayError, GatewayResult};

#[derive(Default)]
struct Store {
    locations: Vec<Location>,
    routes: Vec<Route>,
    attempts: Vec<(Uuid, Attempt)>,
    feedback: Vec<Feedback>,
    profiles: HashMap<Uuid, Profile>,
}

/// Process-local gateway with the same scoping rules as the hosted backend.
///
/// Used for offline runs and as the fake behind view-state tests.
pub struct MemoryGateway {
    session: SessionStore,
    store: Mutex<Store>,
}

fn forbidden(what: &str) -> GatewayError {
    GatewayError::Remote {
        status: 403,
        message: format!("{what} belongs to another user"),
    }
}

impl MemoryGateway {
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            store: Mutex::new(Store::default()),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn insert_profile(&self, profile: Profile) {
        if let Ok(mut store) = self.store.lock() {
            store.profiles.insert(profile.id, profile);
        }
    }

    /// Marks feedback as publicly visible; returns false for unknown ids.
    pub fn approve_feedback(&self, id: Uuid) -> bool {
        let Ok(mut store) = self.store.lock() else {
            return false;
        };
        match store.feedback.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.is_approved = true;
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> GatewayResult<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| GatewayError::Transport("memory store poisoned".into()))
    }

    /// Session check plus store access, in the order every operation needs.
    fn open(&self) -> GatewayResult<(Uuid, MutexGuard<'_, Store>)> {
        let session = self.session.require()?;
        Ok((session.user_id, self.lock()?))
    }
}

#[async_trait]
impl DataGateway for MemoryGateway {
    async fn list_locations(&self) -> GatewayResult<Vec<Location>> {
        let (_, store) = self.open()?;
        Ok(store
            .locations
            .iter()
            .rev()
            .filter(|location| location.is_global)
            .cloned()
            .collect())
    }

    async fn create_location(&self, data: NewLocation) -> GatewayResult<Location> {
        let (user, mut store) = self.open()?;
        if !data.is_submittable() {
            return Err(GatewayError::Validation("location name is empty".into()));
        }
        let owner_name = store
            .profiles
            .get(&user)
            .map(|profile| profile.display_name.clone())
            .or_else(|| self.session.current().and_then(|s| s.email))
            .unwrap_or_default();

        let grades = data
            .ordered_grades()
            .map(|(order, grade)| GradeLevel {
                id: Uuid::new_v4(),
                color: grade.color.clone(),
                name: grade.name.clone(),
                difficulty: grade.difficulty,
                order,
            })
            .collect();

        let location = Location {
            id: Uuid::new_v4(),
            name: data.name.trim().to_string(),
            kind: data.kind,
            address: data.address,
            coordinate: data.coordinate,
            owner_id: user,
            owner_name,
            created_at: Utc::now(),
            route_cadence: data.route_cadence,
            is_global: true,
            grades,
        };
        store.locations.push(location.clone());
        Ok(location)
    }

    async fn update_location(&self, id: Uuid, patch: LocationPatch) -> GatewayResult<Location> {
        let (user, mut store) = self.open()?;
        let location = store
            .locations
            .iter_mut()
            .find(|location| location.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("location {id}")))?;
        if location.owner_id != user {
            return Err(forbidden("location"));
        }
        patch.apply_to(location);
        Ok(location.clone())
    }

    async fn delete_location(&self, id: Uuid) -> GatewayResult<()> {
        let (user, mut store) = self.open()?;
        let index = store
            .locations
            .iter()
            .position(|location| location.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("location {id}")))?;
        if store.locations[index].owner_id != user {
            return Err(forbidden("location"));
        }
        store.locations.remove(index);
        store.routes.retain(|route| route.location_id != id);
        store
            .attempts
            .retain(|(_, attempt)| attempt.location_id != id);
        Ok(())
    }

    async fn list_routes_for_user(&self, location_id: Option<Uuid>) -> GatewayResult<Vec<Route>> {
        let (user, store) = self.open()?;
        Ok(store
            .routes
            .iter()
            .rev()
            .filter(|route| route.is_active && route.visible_to(user))
            .filter(|route| location_id.map_or(true, |id| route.location_id == id))
            .cloned()
            .collect())
    }

    async fn create_route(&self, data: NewRoute) -> GatewayResult<Route> {
        let (user, mut store) = self.open()?;
        if !data.is_submittable() {
            return Err(GatewayError::Validation("route name is empty".into()));
        }
        let location = store
            .locations
            .iter()
            .find(|location| location.id == data.location_id)
            .ok_or_else(|| GatewayError::NotFound(format!("location {}", data.location_id)))?;
        if location.grade(data.grade_level_id).is_none() {
            return Err(GatewayError::Validation(format!(
                "grade {} is not offered at {}",
                data.grade_level_id, location.name
            )));
        }

        let route = Route {
            id: Uuid::new_v4(),
            name: data.name,
            color: data.color,
            grade_level_id: data.grade_level_id,
            location_id: data.location_id,
            is_active: true,
            is_personal: data.is_personal,
            created_by: user,
            created_at: Utc::now(),
            removed_at: None,
        };
        store.routes.push(route.clone());
        Ok(route)
    }

    async fn deactivate_route(&self, id: Uuid) -> GatewayResult<()> {
        let (user, mut store) = self.open()?;
        let route = store
            .routes
            .iter_mut()
            .find(|route| route.id == id && route.visible_to(user))
            .ok_or_else(|| GatewayError::NotFound(format!("route {id}")))?;
        route.deactivate(Utc::now());
        Ok(())
    }

    async fn list_attempts_for_user(
        &self,
        location_id: Option<Uuid>,
        route_id: Option<Uuid>,
    ) -> GatewayResult<Vec<Attempt>> {
        let (user, store) = self.open()?;
        let mut attempts: Vec<Attempt> = store
            .attempts
            .iter()
            .rev()
            .filter(|(owner, _)| *owner == user)
            .map(|(_, attempt)| attempt)
            .filter(|attempt| location_id.map_or(true, |id| attempt.location_id == id))
            .filter(|attempt| route_id.map_or(true, |id| attempt.route_id == id))
            .cloned()
            .collect();
        attempts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(attempts)
    }

    async fn create_attempt(&self, data: NewAttempt) -> GatewayResult<Attempt> {
        let (user, mut store) = self.open()?;
        data.validate()?;
        if !store.routes.iter().any(|route| route.id == data.route_id) {
            return Err(GatewayError::NotFound(format!("route {}", data.route_id)));
        }
        let attempt = data.into_attempt(Uuid::new_v4());
        store.attempts.push((user, attempt.clone()));
        Ok(attempt)
    }

    async fn update_attempt(&self, id: Uuid, patch: AttemptPatch) -> GatewayResult<Attempt> {
        let (user, mut store) = self.open()?;
        patch.validate()?;
        let (_, attempt) = store
            .attempts
            .iter_mut()
            .find(|(owner, attempt)| *owner == user && attempt.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("attempt {id}")))?;
        patch.apply_to(attempt);
        Ok(attempt.clone())
    }

    async fn delete_attempt(&self, id: Uuid) -> GatewayResult<()> {
        let (user, mut store) = self.open()?;
        let before = store.attempts.len();
        store
            .attempts
            .retain(|(owner, attempt)| !(*owner == user && attempt.id == id));
        if store.attempts.len() == before {
            return Err(GatewayError::NotFound(format!("attempt {id}")));
        }
        Ok(())
    }

    async fn get_user_stats(&self, location_id: Option<Uuid>) -> GatewayResult<UserStats> {
        let attempts = self.list_attempts_for_user(location_id, None).await?;
        let store = self.lock()?;
        let grades: Vec<GradeLevel> = store
            .locations
            .iter()
            .flat_map(|location| location.grades.iter().cloned())
            .collect();
        Ok(compute_stats(&attempts, &store.routes, &grades))
    }

    async fn submit_feedback(&self, data: NewFeedback) -> GatewayResult<Feedback> {
        let (user, mut store) = self.open()?;
        data.validate()?;
        let feedback = Feedback {
            id: Uuid::new_v4(),
            user_id: user,
            rating: data.rating,
            message: data.message.trim().to_string(),
            category: data.category,
            is_approved: false,
            created_at: Utc::now(),
        };
        store.feedback.push(feedback.clone());
        Ok(feedback)
    }

    async fn list_approved_feedback(&self) -> GatewayResult<Vec<Feedback>> {
        let (_, store) = self.open()?;
        Ok(store
            .feedback
            .iter()
            .rev()
            .filter(|entry| entry.is_approved)
            .cloned()
            .collect())
    }

    async fn get_profile(&self) -> GatewayResult<Profile> {
        let (user, store) = self.open()?;
        store
            .profiles
            .get(&user)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("profile {user}")))
    }
}
