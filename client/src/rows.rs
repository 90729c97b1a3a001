//! Row shapes of the hosted tables and their conversion into model types.

use chrono::{DateTime, NaiveDate, Utc};
use cragcore::model::{
    Attempt, AttemptPatch, Difficulty, Feedback, FeedbackCategory, GradeLevel, Location,
    LocationKind, LocationPatch, NewAttempt, NewFeedback, NewGradeLevel, NewLocation, NewRoute,
    Profile, Route, RouteCadence,
};
use cragcore::Coordinate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Owner name shown when the profile embed is missing.
pub const UNKNOWN_OWNER: &str = "Unknown";

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradeLevelRow {
    pub id: Uuid,
    #[serde(default)]
    pub color: String,
    pub name: String,
    pub difficulty_level: Difficulty,
    pub order_index: i32,
}

impl From<GradeLevelRow> for GradeLevel {
    fn from(row: GradeLevelRow) -> Self {
        Self {
            id: row.id,
            color: row.color,
            name: row.name,
            difficulty: row.difficulty_level,
            order: row.order_index,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileName {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationRow {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LocationKind,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub route_frequency: RouteCadence,
    #[serde(default = "default_true")]
    pub is_global: bool,
    #[serde(default)]
    pub grade_levels: Vec<GradeLevelRow>,
    #[serde(default)]
    pub profiles: Option<ProfileName>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        let coordinate = match (row.latitude, row.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        };
        let owner_name = row
            .profiles
            .and_then(|profile| profile.display_name)
            .unwrap_or_else(|| UNKNOWN_OWNER.to_string());
        Self {
            id: row.id,
            name: row.name,
            kind: row.kind,
            address: row.address,
            coordinate,
            owner_id: row.created_by,
            owner_name,
            created_at: row.created_at,
            route_cadence: row.route_frequency,
            is_global: row.is_global,
            grades: row.grade_levels.into_iter().map(GradeLevel::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationInsert {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LocationKind,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_by: Uuid,
    pub route_frequency: RouteCadence,
    pub is_global: bool,
}

impl LocationInsert {
    pub fn new(data: &NewLocation, user_id: Uuid) -> Self {
        Self {
            name: data.name.trim().to_string(),
            kind: data.kind,
            address: data.address.clone(),
            latitude: data.coordinate.map(|c| c.lat),
            longitude: data.coordinate.map(|c| c.lng),
            created_by: user_id,
            route_frequency: data.route_cadence,
            is_global: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeLevelInsert {
    pub location_id: Uuid,
    pub color: String,
    pub name: String,
    pub difficulty_level: Difficulty,
    pub order_index: i32,
}

impl GradeLevelInsert {
    pub fn new(location_id: Uuid, order: i32, grade: &NewGradeLevel) -> Self {
        Self {
            location_id,
            color: grade.color.clone(),
            name: grade.name.clone(),
            difficulty_level: grade.difficulty,
            order_index: order,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LocationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<LocationKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_frequency: Option<RouteCadence>,
}

impl From<&LocationPatch> for LocationUpdate {
    fn from(patch: &LocationPatch) -> Self {
        Self {
            name: patch.name.clone(),
            kind: patch.kind,
            address: patch.address.clone(),
            latitude: patch.coordinate.map(|c| c.lat),
            longitude: patch.coordinate.map(|c| c.lng),
            route_frequency: patch.route_cadence,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteRow {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub color: String,
    pub grade_level_id: Uuid,
    pub location_id: Uuid,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_personal: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub removed_at: Option<DateTime<Utc>>,
}

impl From<RouteRow> for Route {
    fn from(row: RouteRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            color: row.color,
            grade_level_id: row.grade_level_id,
            location_id: row.location_id,
            is_active: row.is_active,
            is_personal: row.is_personal,
            created_by: row.user_id,
            created_at: row.created_at,
            removed_at: row.removed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteInsert {
    pub name: String,
    pub color: String,
    pub grade_level_id: Uuid,
    pub location_id: Uuid,
    pub is_personal: bool,
    pub is_active: bool,
    pub user_id: Uuid,
}

impl RouteInsert {
    pub fn new(data: &NewRoute, user_id: Uuid) -> Self {
        Self {
            name: data.name.trim().to_string(),
            color: data.color.clone(),
            grade_level_id: data.grade_level_id,
            location_id: data.location_id,
            is_personal: data.is_personal,
            is_active: true,
            user_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteDeactivation {
    pub is_active: bool,
    pub removed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttemptRow {
    pub id: Uuid,
    pub route_id: Uuid,
    pub location_id: Uuid,
    #[serde(default)]
    pub completed: bool,
    pub attempts: u32,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl From<AttemptRow> for Attempt {
    fn from(row: AttemptRow) -> Self {
        Self {
            id: row.id,
            route_id: row.route_id,
            location_id: row.location_id,
            completed: row.completed,
            attempts: row.attempts,
            date: row.date,
            notes: row.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptInsert {
    pub user_id: Uuid,
    pub route_id: Uuid,
    pub location_id: Uuid,
    pub completed: bool,
    pub attempts: u32,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl AttemptInsert {
    pub fn new(data: NewAttempt, user_id: Uuid) -> Self {
        Self {
            user_id,
            route_id: data.route_id,
            location_id: data.location_id,
            completed: data.completed,
            attempts: data.attempts,
            date: data.date,
            notes: data.notes,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AttemptUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&AttemptPatch> for AttemptUpdate {
    fn from(patch: &AttemptPatch) -> Self {
        Self {
            completed: patch.completed,
            attempts: patch.attempts,
            date: patch.date,
            notes: patch.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rating: u8,
    pub message: String,
    #[serde(default)]
    pub category: FeedbackCategory,
    #[serde(default)]
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            rating: row.rating,
            message: row.message,
            category: row.category,
            is_approved: row.is_approved,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackInsert {
    pub user_id: Uuid,
    pub rating: u8,
    pub message: String,
    pub category: FeedbackCategory,
}

impl FeedbackInsert {
    pub fn new(data: NewFeedback, user_id: Uuid) -> Self {
        Self {
            user_id,
            rating: data.rating,
            message: data.message.trim().to_string(),
            category: data.category,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    pub display_name: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            display_name: row
                .display_name
                .unwrap_or_else(|| UNKNOWN_OWNER.to_string()),
        }
    }
}
