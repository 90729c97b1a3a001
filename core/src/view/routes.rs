use std::sync::Arc;

use uuid::Uuid;

use crate::gateway::DataGateway;
use crate::model::{GradeLevel, Location, NewRoute, Route};
use crate::view::notice::{Notice, Notices};

/// Routes of one location.
pub struct RoutesView<G: ?Sized> {
    gateway: Arc<G>,
    location: Location,
    routes: Vec<Route>,
    notices: Notices,
}

impl<G: DataGateway + ?Sized> RoutesView<G> {
    pub fn new(gateway: Arc<G>, location: Location) -> Self {
        Self {
            gateway,
            location,
            routes: Vec::new(),
            notices: Notices::new("routes"),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Grades a route at this location may be given.
    pub fn grade_options(&self) -> Vec<&GradeLevel> {
        self.location.sorted_grades()
    }

    pub fn grade_of(&self, route: &Route) -> Option<&GradeLevel> {
        self.location.grade(route.grade_level_id)
    }

    pub async fn select_location(&mut self, location: Location) -> bool {
        self.location = location;
        self.routes.clear();
        self.load().await
    }

    pub async fn load(&mut self) -> bool {
        match self
            .gateway
            .list_routes_for_user(Some(self.location.id))
            .await
        {
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

    pub async fn create(&mut self, form: NewRoute) -> Option<Route> {
        if !form.is_submittable() {
            return None;
        }
        let form = NewRoute {
            location_id: self.location.id,
            ..form
        };
        match self.gateway.create_route(form).await {
            Ok(route) => {
                self.notices.success(format!("Added {}", route.name));
                self.load().await;
                Some(route)
            }
            Err(err) => {
                self.notices.failure("add the route", &err);
                None
            }
        }
    }

    pub async fn deactivate(&mut self, id: Uuid) -> bool {
        match self.gateway.deactivate_route(id).await {
            Ok(()) => {
                self.notices.success("Route removed");
                self.load().await;
                true
            }
            Err(err) => {
                self.notices.failure("remove the route", &err);
                false
            }
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }
}
