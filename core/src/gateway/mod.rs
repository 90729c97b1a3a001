//! Contract for every remote read and write the app performs.

pub mod memory;
pub mod session;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{
    Attempt, AttemptPatch, Feedback, Location, LocationPatch, NewAttempt, NewFeedback,
    NewLocation, NewRoute, Profile, Route, UserStats,
};
use crate::prelude::GatewayResult;

pub use memory::MemoryGateway;
pub use session::{Session, SessionStore};

/// Remote data access. Every call fails with
/// [`GatewayError::NotAuthenticated`](crate::prelude::GatewayError::NotAuthenticated)
/// when no session is active.
#[async_trait]
pub trait DataGateway: Send + Sync {
    async fn list_locations(&self) -> GatewayResult<Vec<Location>>;
    async fn create_location(&self, data: NewLocation) -> GatewayResult<Location>;
    async fn update_location(&self, id: Uuid, patch: LocationPatch) -> GatewayResult<Location>;
    async fn delete_location(&self, id: Uuid) -> GatewayResult<()>;

    /// Active routes the user owns or that are shared.
    async fn list_routes_for_user(&self, location_id: Option<Uuid>) -> GatewayResult<Vec<Route>>;
    async fn create_route(&self, data: NewRoute) -> GatewayResult<Route>;
    async fn deactivate_route(&self, id: Uuid) -> GatewayResult<()>;

    /// The user's attempts, newest first.
    async fn list_attempts_for_user(
        &self,
        location_id: Option<Uuid>,
        route_id: Option<Uuid>,
    ) -> GatewayResult<Vec<Attempt>>;
    async fn create_attempt(&self, data: NewAttempt) -> GatewayResult<Attempt>;
    async fn update_attempt(&self, id: Uuid, patch: AttemptPatch) -> GatewayResult<Attempt>;
    async fn delete_attempt(&self, id: Uuid) -> GatewayResult<()>;

    async fn get_user_stats(&self, location_id: Option<Uuid>) -> GatewayResult<UserStats>;

    async fn submit_feedback(&self, data: NewFeedback) -> GatewayResult<Feedback>;
    async fn list_approved_feedback(&self) -> GatewayResult<Vec<Feedback>>;

    async fn get_profile(&self) -> GatewayResult<Profile>;
}
