//! Hold annotation over a route photo.
//!
//! Points are normalized image fractions in `[0, 1]`. Matching uses an
//! independent-axis box test (`|dx| < eps && |dy| < eps`), never a radius.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::GradeLevel;

/// Box half-width used when a click toggles an existing grip.
pub const TOGGLE_TOLERANCE: f32 = 0.05;
/// Box half-width used when matching selected grips against detections.
pub const DETECTION_TOLERANCE: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grip {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Grip {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            confidence: None,
        }
    }

    /// Same point clamped into the unit square.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn within_box(&self, other: &Grip, tolerance: f32) -> bool {
        (self.x - other.x).abs() < tolerance && (self.y - other.y).abs() < tolerance
    }
}

/// Hold as returned by the detection function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldDetection {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
    #[serde(default)]
    pub name: String,
}

impl From<&HoldDetection> for Grip {
    fn from(hold: &HoldDetection) -> Self {
        Self {
            x: hold.x,
            y: hold.y,
            confidence: Some(hold.confidence),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GripSource {
    Detected,
    Manual,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("no grips selected")]
    NoGrips,
    #[error("no grade chosen")]
    NoGrade,
    #[error("grade {0} is not offered here")]
    UnknownGrade(Uuid),
}

/// Result of a confirmed annotation; the grips themselves are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct GripAnnotation {
    pub label: String,
    pub grip_count: usize,
    pub grade_level_id: Uuid,
    pub color: String,
}

#[derive(Debug, Clone, Default)]
pub struct GripEditor {
    selected: Vec<Grip>,
    detected: Vec<Grip>,
    grade: Option<Uuid>,
}

impl GripEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the detections and seeds the selection with their positions.
    pub fn initialize_from_detection(&mut self, detected: &[HoldDetection]) {
        self.detected = detected.iter().map(Grip::from).collect();
        self.selected = self
            .detected
            .iter()
            .map(|grip| Grip::new(grip.x, grip.y))
            .collect();
    }

    /// Removes the first selected grip inside the toggle box around `point`,
    /// or appends `point` when none is there.
    pub fn toggle_at(&mut self, point: Grip) {
        let point = Grip::new(point.x, point.y).clamped();
        match self
            .selected
            .iter()
            .position(|grip| grip.within_box(&point, TOGGLE_TOLERANCE))
        {
            Some(index) => {
                self.selected.remove(index);
            }
            None => self.selected.push(point),
        }
    }

    /// Drops manual edits and returns to the seeded detections.
    pub fn clear(&mut self) {
        self.selected = self
            .detected
            .iter()
            .map(|grip| Grip::new(grip.x, grip.y))
            .collect();
    }

    pub fn choose_grade(&mut self, grade_level_id: Uuid) {
        self.grade = Some(grade_level_id);
    }

    pub fn selected(&self) -> &[Grip] {
        &self.selected
    }

    pub fn detected(&self) -> &[Grip] {
        &self.detected
    }

    pub fn chosen_grade(&self) -> Option<Uuid> {
        self.grade
    }

    pub fn classify(&self, grip: &Grip) -> GripSource {
        if self
            .detected
            .iter()
            .any(|detected| detected.within_box(grip, DETECTION_TOLERANCE))
        {
            GripSource::Detected
        } else {
            GripSource::Manual
        }
    }

    /// Selected grips tagged with where they came from, for drawing.
    pub fn classified(&self) -> Vec<(Grip, GripSource)> {
        self.selected
            .iter()
            .map(|grip| (*grip, self.classify(grip)))
            .collect()
    }

    /// Detections not covered by any selected grip.
    pub fn undetected_overlay(&self) -> Vec<Grip> {
        self.detected
            .iter()
            .filter(|detected| {
                !self
                    .selected
                    .iter()
                    .any(|grip| grip.within_box(detected, DETECTION_TOLERANCE))
            })
            .copied()
            .collect()
    }

    pub fn can_complete(&self) -> bool {
        !self.selected.is_empty() && self.grade.is_some()
    }

    /// Collapses the selection into a grade-derived route label.
    pub fn complete(&self, grade: &GradeLevel) -> Result<GripAnnotation, EditorError> {
        if self.selected.is_empty() {
            return Err(EditorError::NoGrips);
        }
        let chosen = self.grade.ok_or(EditorError::NoGrade)?;
        if chosen != grade.id {
            return Err(EditorError::UnknownGrade(chosen));
        }

        Ok(GripAnnotation {
            label: route_label(grade, self.selected.len()),
            grip_count: self.selected.len(),
            grade_level_id: grade.id,
            color: grade.color.clone(),
        })
    }
}

pub fn route_label(grade: &GradeLevel, grip_count: usize) -> String {
    let noun = if grip_count == 1 { "hold" } else { "holds" };
    format!("{} · {} {}", grade.name, grip_count, noun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    fn hold(x: f32, y: f32, confidence: f32) -> HoldDetection {
        HoldDetection {
            x,
            y,
            confidence,
            name: "hold".into(),
        }
    }

    fn grade() -> GradeLevel {
        GradeLevel {
            id: Uuid::new_v4(),
            color: "#3b82f6".into(),
            name: "Blue".into(),
            difficulty: Difficulty::Intermediate,
            order: 3,
        }
    }

    #[test]
    fn seeding_drops_confidence() {
        let mut editor = GripEditor::new();
        editor.initialize_from_detection(&[hold(0.3, 0.4, 0.9)]);
        assert_eq!(editor.selected(), &[Grip::new(0.3, 0.4)]);
        assert_eq!(editor.detected()[0].confidence, Some(0.9));
    }

    #[test]
    fn toggle_twice_restores_selection() {
        let mut editor = GripEditor::new();
        editor.initialize_from_detection(&[hold(0.1, 0.1, 0.8)]);
        let before = editor.selected().to_vec();

        editor.toggle_at(Grip::new(0.6, 0.6));
        assert_eq!(editor.selected().len(), 2);
        editor.toggle_at(Grip::new(0.6, 0.6));
        assert_eq!(editor.selected(), before.as_slice());
    }

    #[test]
    fn toggle_removes_only_first_match() {
        let mut editor = GripEditor::new();
        editor.toggle_at(Grip::new(0.50, 0.50));
        editor.toggle_at(Grip::new(0.56, 0.50));
        assert_eq!(editor.selected().len(), 2);

        editor.toggle_at(Grip::new(0.53, 0.50));
        assert_eq!(editor.selected(), &[Grip::new(0.56, 0.50)]);
    }

    #[test]
    fn toggle_uses_box_not_radius() {
        let mut editor = GripEditor::new();
        editor.toggle_at(Grip::new(0.5, 0.5));
        // 0.045 on each axis is ~0.064 euclidean but still inside the box.
        editor.toggle_at(Grip::new(0.545, 0.545));
        assert!(editor.selected().is_empty());

        editor.toggle_at(Grip::new(0.5, 0.5));
        editor.toggle_at(Grip::new(0.57, 0.57));
        assert_eq!(editor.selected().len(), 2);
    }

    #[test]
    fn detection_never_changes_on_toggle() {
        let mut editor = GripEditor::new();
        editor.initialize_from_detection(&[hold(0.2, 0.2, 0.7)]);
        editor.toggle_at(Grip::new(0.2, 0.2));
        assert!(editor.selected().is_empty());
        assert_eq!(editor.detected().len(), 1);
        assert_eq!(editor.undetected_overlay().len(), 1);
    }

    #[test]
    fn classification_uses_tight_box() {
        let mut editor = GripEditor::new();
        editor.initialize_from_detection(&[hold(0.301, 0.400, 0.9)]);
        assert_eq!(editor.classify(&Grip::new(0.300, 0.401)), GripSource::Detected);
        assert_eq!(editor.classify(&Grip::new(0.35, 0.40)), GripSource::Manual);
        assert!(editor.undetected_overlay().is_empty());
    }

    #[test]
    fn completion_requires_grips_and_grade() {
        let grade = grade();
        let mut editor = GripEditor::new();
        assert!(!editor.can_complete());
        assert_eq!(editor.complete(&grade), Err(EditorError::NoGrips));

        editor.toggle_at(Grip::new(0.5, 0.5));
        assert_eq!(editor.complete(&grade), Err(EditorError::NoGrade));

        editor.choose_grade(grade.id);
        assert!(editor.can_complete());
        let annotation = editor.complete(&grade).unwrap();
        assert_eq!(annotation.label, "Blue · 1 hold");
        assert_eq!(annotation.grip_count, 1);
    }

    #[test]
    fn failed_detection_leaves_manual_editing() {
        let mut editor = GripEditor::new();
        editor.initialize_from_detection(&[]);
        assert!(editor.selected().is_empty());
        editor.toggle_at(Grip::new(1.4, -0.2));
        assert_eq!(editor.selected(), &[Grip::new(1.0, 0.0)]);
        assert_eq!(editor.classify(&editor.selected()[0]), GripSource::Manual);
    }

    #[test]
    fn clear_returns_to_seeded_detections() {
        let mut editor = GripEditor::new();
        editor.initialize_from_detection(&[hold(0.3, 0.3, 0.5)]);
        editor.toggle_at(Grip::new(0.8, 0.8));
        editor.clear();
        assert_eq!(editor.selected(), &[Grip::new(0.3, 0.3)]);
    }
}
