use std::sync::Arc;

use uuid::Uuid;

use crate::gateway::DataGateway;
use crate::model::{Location, LocationPatch, NewLocation};
use crate::prelude::Coordinate;
use crate::proximity::rank_by_proximity;
use crate::view::notice::{Notice, Notices};

/// State behind the locations screen.
pub struct LocationsView<G: ?Sized> {
    gateway: Arc<G>,
    locations: Vec<Location>,
    loading: bool,
    notices: Notices,
}

impl<G: DataGateway + ?Sized> LocationsView<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            locations: Vec::new(),
            loading: false,
            notices: Notices::new("locations"),
        }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn find(&self, id: Uuid) -> Option<&Location> {
        self.locations.iter().find(|location| location.id == id)
    }

    /// Locations nearest to `reference` first.
    pub fn nearest_first(&self, reference: Coordinate) -> Vec<Location> {
        rank_by_proximity(reference, &self.locations)
    }

    pub async fn load(&mut self) -> bool {
        self.loading = true;
        let loaded = match self.gateway.list_locations().await {
            Ok(locations) => {
                self.locations = locations;
                true
            }
            Err(err) => {
                self.notices.failure("load locations", &err);
                false
            }
        };
        self.loading = false;
        loaded
    }

    pub async fn create(&mut self, form: NewLocation) -> Option<Location> {
        if !form.is_submittable() {
            return None;
        }
        match self.gateway.create_location(form).await {
            Ok(location) => {
                self.notices.success(format!("Added {}", location.name));
                self.load().await;
                Some(location)
            }
            Err(err) => {
                self.notices.failure("add the location", &err);
                None
            }
        }
    }

    pub async fn update(&mut self, id: Uuid, patch: LocationPatch) -> bool {
        if patch.is_empty() {
            return true;
        }
        match self.gateway.update_location(id, patch).await {
            Ok(location) => {
                self.notices.success(format!("Updated {}", location.name));
                self.load().await;
                true
            }
            Err(err) => {
                self.notices.failure("update the location", &err);
                false
            }
        }
    }

    pub async fn delete(&mut self, id: Uuid) -> bool {
        match self.gateway.delete_location(id).await {
            Ok(()) => {
                self.notices.success("Location removed");
                self.load().await;
                true
            }
            Err(err) => {
                self.notices.failure("remove the location", &err);
                false
            }
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MemoryGateway, Session, SessionStore};
    use crate::model::LocationKind;
    use crate::view::notice::NoticeLevel;

    fn gateway() -> Arc<MemoryGateway> {
        Arc::new(MemoryGateway::new(SessionStore::signed_in(Session::new(
            Uuid::new_v4(),
            "token",
        ))))
    }

    #[tokio::test]
    async fn create_reloads_the_list() {
        let mut view = LocationsView::new(gateway());
        let created = view
            .create(
                NewLocation::new("Far", LocationKind::Outdoor)
                    .with_coordinate(Coordinate::new(0.0, 1.0)),
            )
            .await
            .unwrap();
        view.create(
            NewLocation::new("Near", LocationKind::Gym).with_coordinate(Coordinate::new(0.0, 0.5)),
        )
        .await;

        assert_eq!(view.locations().len(), 2);
        assert!(view.find(created.id).is_some());
        let ranked = view.nearest_first(Coordinate::new(0.0, 0.0));
        assert_eq!(ranked[0].name, "Near");
        assert!(view
            .take_notices()
            .iter()
            .all(|notice| notice.level == NoticeLevel::Success));
    }

    #[tokio::test]
    async fn unsubmittable_form_never_reaches_gateway() {
        let mut view = LocationsView::new(gateway());
        assert!(view.create(NewLocation::new("", LocationKind::Gym)).await.is_none());
        assert!(view.take_notices().is_empty());
    }

    #[tokio::test]
    async fn signed_out_failure_is_reported_once() {
        let gateway = gateway();
        gateway.session().sign_out();
        let mut view = LocationsView::new(gateway);

        assert!(!view.load().await);
        assert!(!view.is_loading());
        let notices = view.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(view.take_notices().is_empty());
    }

    #[tokio::test]
    async fn works_through_a_trait_object() {
        let gateway: Arc<dyn DataGateway> = gateway();
        let mut view = LocationsView::new(gateway);
        assert!(view.load().await);
        assert!(view.locations().is_empty());
    }
}
