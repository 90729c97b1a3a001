pub mod attempt;
pub mod feedback;
pub mod location;
pub mod route;
pub mod stats;

pub use attempt::{Attempt, AttemptPatch, NewAttempt};
pub use feedback::{Feedback, FeedbackCategory, NewFeedback, Profile};
pub use location::{
    default_grade_ladder, Difficulty, GradeLevel, Location, LocationKind, LocationPatch,
    NewGradeLevel, NewLocation, RouteCadence,
};
pub use route::{NewRoute, Route};
pub use stats::{compute_stats, DifficultyStats, UserStats};
