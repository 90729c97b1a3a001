use std::sync::Arc;

use crate::gateway::DataGateway;
use crate::grips::{EditorError, GripEditor, HoldDetection};
use crate::model::{GradeLevel, Location, NewRoute, Route};
use crate::prelude::GatewayError;
use crate::view::notice::{Notice, Notices};

/// Photographs a wall, marks holds and saves the result as a route.
///
/// The grips only live until [`RouteDocumentation::finish`] succeeds; the
/// saved route keeps a grade-derived label instead.
pub struct RouteDocumentation<G: ?Sized> {
    gateway: Arc<G>,
    location: Location,
    editor: GripEditor,
    is_personal: bool,
    notices: Notices,
}

impl<G: DataGateway + ?Sized> RouteDocumentation<G> {
    pub fn new(gateway: Arc<G>, location: Location) -> Self {
        Self {
            gateway,
            location,
            editor: GripEditor::new(),
            is_personal: true,
            notices: Notices::new("documentation"),
        }
    }

    /// Seeds the editor; an empty slice means detection was unavailable.
    pub fn begin(&mut self, detections: &[HoldDetection]) {
        self.editor = GripEditor::new();
        self.editor.initialize_from_detection(detections);
    }

    pub fn editor(&self) -> &GripEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut GripEditor {
        &mut self.editor
    }

    pub fn grade_options(&self) -> Vec<&GradeLevel> {
        self.location.sorted_grades()
    }

    pub fn set_personal(&mut self, is_personal: bool) {
        self.is_personal = is_personal;
    }

    pub fn can_finish(&self) -> bool {
        self.editor.can_complete()
    }

    pub async fn finish(&mut self) -> Option<Route> {
        let annotation = if self.editor.selected().is_empty() {
            Err(EditorError::NoGrips)
        } else {
            match self.editor.chosen_grade() {
                None => Err(EditorError::NoGrade),
                Some(id) => match self.location.grade(id) {
                    Some(grade) => self.editor.complete(grade),
                    None => Err(EditorError::UnknownGrade(id)),
                },
            }
        };
        let annotation = match annotation {
            Ok(annotation) => annotation,
            Err(err) => {
                let err = GatewayError::Validation(err.to_string());
                self.notices.failure("save the route", &err);
                return None;
            }
        };

        let form = NewRoute::new(
            self.location.id,
            annotation.grade_level_id,
            annotation.label,
        )
        .with_color(annotation.color)
        .with_personal(self.is_personal);

        match self.gateway.create_route(form).await {
            Ok(route) => {
                self.notices.success(format!("Saved {}", route.name));
                self.editor = GripEditor::new();
                Some(route)
            }
            Err(err) => {
                self.notices.failure("save the route", &err);
                None
            }
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }
}
