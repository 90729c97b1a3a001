use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::math::StatsHelper;
use crate::model::{Attempt, Difficulty, GradeLevel, Route};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct DifficultyStats {
    pub attempts: usize,
    pub completed: usize,
}

/// Aggregated performance of one user, optionally scoped to a location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserStats {
    pub total_attempts: usize,
    pub completed_attempts: usize,
    pub success_rate: f64,
    pub stats_by_difficulty: BTreeMap<Difficulty, DifficultyStats>,
}

/// Folds logged attempts into [`UserStats`].
///
/// Each attempt record counts once. Attempts whose route or grade cannot be
/// resolved still count toward the totals but not toward any difficulty.
pub fn compute_stats(attempts: &[Attempt], routes: &[Route], grades: &[GradeLevel]) -> UserStats {
    let route_grades: HashMap<Uuid, Uuid> = routes
        .iter()
        .map(|route| (route.id, route.grade_level_id))
        .collect();
    let grade_difficulty: HashMap<Uuid, Difficulty> = grades
        .iter()
        .map(|grade| (grade.id, grade.difficulty))
        .collect();

    let mut stats = UserStats::default();
    for attempt in attempts {
        stats.total_attempts += 1;
        if attempt.completed {
            stats.completed_attempts += 1;
        }

        let difficulty = route_grades
            .get(&attempt.route_id)
            .and_then(|grade_id| grade_difficulty.get(grade_id));
        if let Some(difficulty) = difficulty {
            let bucket = stats.stats_by_difficulty.entry(*difficulty).or_default();
            bucket.attempts += 1;
            if attempt.completed {
                bucket.completed += 1;
            }
        }
    }
    stats.success_rate = StatsHelper::success_rate(stats.completed_attempts, stats.total_attempts);
    stats
}
