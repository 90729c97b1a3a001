pub struct StatsHelper;

impl StatsHelper {
    /// Percentage of `completed` over `total`, zero for an empty sample.
    pub fn success_rate(completed: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        completed as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_empty_sample_yields_zero() {
        assert_eq!(StatsHelper::success_rate(0, 0), 0.0);
    }

    #[test]
    fn success_rate_is_a_percentage() {
        assert_eq!(StatsHelper::success_rate(1, 4), 25.0);
        assert_eq!(StatsHelper::success_rate(3, 3), 100.0);
    }
}
