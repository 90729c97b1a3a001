use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::prelude::Coordinate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Gym,
    Outdoor,
}

/// How often a location resets its routes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RouteCadence {
    Weekly,
    #[default]
    Monthly,
    Rarely,
    Never,
}

/// Difficulty buckets a location maps its grades onto, easiest first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Easy,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Beginner,
        Difficulty::Easy,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Expert,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeLevel {
    pub id: Uuid,
    pub color: String,
    pub name: String,
    pub difficulty: Difficulty,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub kind: LocationKind,
    pub address: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub created_at: DateTime<Utc>,
    pub route_cadence: RouteCadence,
    pub is_global: bool,
    #[serde(default)]
    pub grades: Vec<GradeLevel>,
}

impl Location {
    /// Grades in display order. Equal `order` values keep insertion order.
    pub fn sorted_grades(&self) -> Vec<&GradeLevel> {
        let mut grades: Vec<&GradeLevel> = self.grades.iter().collect();
        grades.sort_by_key(|grade| grade.order);
        grades
    }

    pub fn grade(&self, id: Uuid) -> Option<&GradeLevel> {
        self.grades.iter().find(|grade| grade.id == id)
    }
}

/// Grade entry of a location form; the order is assigned from its position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewGradeLevel {
    pub color: String,
    pub name: String,
    pub difficulty: Difficulty,
}

impl NewGradeLevel {
    pub fn new(name: impl Into<String>, color: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            color: color.into(),
            name: name.into(),
            difficulty,
        }
    }
}

/// Ladder offered when a new gym is created without custom grades.
pub fn default_grade_ladder() -> Vec<NewGradeLevel> {
    vec![
        NewGradeLevel::new("Yellow", "#facc15", Difficulty::Beginner),
        NewGradeLevel::new("Green", "#22c55e", Difficulty::Easy),
        NewGradeLevel::new("Blue", "#3b82f6", Difficulty::Intermediate),
        NewGradeLevel::new("Red", "#ef4444", Difficulty::Advanced),
        NewGradeLevel::new("Black", "#111827", Difficulty::Expert),
    ]
}

/// Form state for creating a location.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub name: String,
    pub kind: LocationKind,
    pub address: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub route_cadence: RouteCadence,
    pub grades: Vec<NewGradeLevel>,
}

impl NewLocation {
    pub fn new(name: impl Into<String>, kind: LocationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            address: None,
            coordinate: None,
            route_cadence: RouteCadence::default(),
            grades: Vec::new(),
        }
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    pub fn with_kind(self, kind: LocationKind) -> Self {
        Self { kind, ..self }
    }

    pub fn with_address(self, address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..self
        }
    }

    pub fn with_coordinate(self, coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
            ..self
        }
    }

    pub fn with_route_cadence(self, route_cadence: RouteCadence) -> Self {
        Self {
            route_cadence,
            ..self
        }
    }

    pub fn with_grade(mut self, grade: NewGradeLevel) -> Self {
        self.grades.push(grade);
        self
    }

    pub fn with_grades(self, grades: Vec<NewGradeLevel>) -> Self {
        Self { grades, ..self }
    }

    pub fn is_submittable(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Grade rows with their 1-based `order`.
    pub fn ordered_grades(&self) -> impl Iterator<Item = (i32, &NewGradeLevel)> {
        self.grades
            .iter()
            .enumerate()
            .map(|(index, grade)| (index as i32 + 1, grade))
    }
}

/// Partial update of a location; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationPatch {
    pub name: Option<String>,
    pub kind: Option<LocationKind>,
    pub address: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub route_cadence: Option<RouteCadence>,
}

impl LocationPatch {
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    pub fn with_kind(self, kind: LocationKind) -> Self {
        Self {
            kind: Some(kind),
            ..self
        }
    }

    pub fn with_address(self, address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..self
        }
    }

    pub fn with_coordinate(self, coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
            ..self
        }
    }

    pub fn with_route_cadence(self, route_cadence: RouteCadence) -> Self {
        Self {
            route_cadence: Some(route_cadence),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, location: &mut Location) {
        if let Some(name) = &self.name {
            location.name = name.clone();
        }
        if let Some(kind) = self.kind {
            location.kind = kind;
        }
        if let Some(address) = &self.address {
            location.address = Some(address.clone());
        }
        if let Some(coordinate) = self.coordinate {
            location.coordinate = Some(coordinate);
        }
        if let Some(cadence) = self.route_cadence {
            location.route_cadence = cadence;
        }
    }
}
