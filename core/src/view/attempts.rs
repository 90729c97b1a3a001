use std::sync::Arc;

use uuid::Uuid;

use crate::gateway::DataGateway;
use crate::model::{Attempt, AttemptPatch, NewAttempt, Route, UserStats};
use crate::view::notice::{Notice, Notices};

/// Attempt log with its statistics, optionally filtered.
///
/// Attempts, routes and stats are loaded independently; one failing does
/// not clear the others.
pub struct AttemptsView<G: ?Sized> {
    gateway: Arc<G>,
    location_filter: Option<Uuid>,
    route_filter: Option<Uuid>,
    attempts: Vec<Attempt>,
    routes: Vec<Route>,
    stats: UserStats,
    notices: Notices,
}

impl<G: DataGateway + ?Sized> AttemptsView<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            location_filter: None,
            route_filter: None,
            attempts: Vec::new(),
            routes: Vec::new(),
            stats: UserStats::default(),
            notices: Notices::new("attempts"),
        }
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    pub fn route_for(&self, attempt: &Attempt) -> Option<&Route> {
        self.routes.iter().find(|route| route.id == attempt.route_id)
    }

    pub async fn set_filter(
        &mut self,
        location_id: Option<Uuid>,
        route_id: Option<Uuid>,
    ) -> bool {
        self.location_filter = location_id;
        self.route_filter = route_id;
        self.load().await
    }

    /// Reloads everything; true only if every piece loaded.
    pub async fn load(&mut self) -> bool {
        let attempts = self.load_attempts().await;
        let routes = self.load_routes().await;
        let stats = self.load_stats().await;
        attempts && routes && stats
    }

    async fn load_attempts(&mut self) -> bool {
        match self
            .gateway
            .list_attempts_for_user(self.location_filter, self.route_filter)
            .await
        {
            Ok(attempts) => {
                self.attempts = attempts;
                true
            }
            Err(err) => {
                self.notices.failure("load attempts", &err);
                false
            }
        }
    }

    async fn load_routes(&mut self) -> bool {
        match self.gateway.list_routes_for_user(self.location_filter).await {
            Ok(routes) => {
                self.routes = routes;
                true
            }
            Err(err) => {
                self.notices.failure("load routes", &err);
                false
            }
        }
    }

    async fn load_stats(&mut self) -> bool {
        match self.gateway.get_user_stats(self.location_filter).await {
            Ok(stats) => {
                self.stats = stats;
                true
            }
            Err(err) => {
                self.notices.failure("load statistics", &err);
                false
            }
        }
    }

    pub async fn log_attempt(&mut self, form: NewAttempt) -> Option<Attempt> {
        if !form.is_submittable() {
            return None;
        }
        match self.gateway.create_attempt(form).await {
            Ok(attempt) => {
                let message = if attempt.completed {
                    "Send logged"
                } else {
                    "Attempt logged"
                };
                self.notices.success(message);
                self.load().await;
                Some(attempt)
            }
            Err(err) => {
                self.notices.failure("log the attempt", &err);
                None
            }
        }
    }

    pub async fn edit_attempt(&mut self, id: Uuid, patch: AttemptPatch) -> bool {
        match self.gateway.update_attempt(id, patch).await {
            Ok(_) => {
                self.notices.success("Attempt updated");
                self.load().await;
                true
            }
            Err(err) => {
                self.notices.failure("update the attempt", &err);
                false
            }
        }
    }

    pub async fn remove_attempt(&mut self, id: Uuid) -> bool {
        match self.gateway.delete_attempt(id).await {
            Ok(()) => {
                self.notices.success("Attempt removed");
                self.load().await;
                true
            }
            Err(err) => {
                self.notices.failure("remove the attempt", &err);
                false
            }
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }
}
