// Hype score: normalized popularity/trend score for a paper on a given day.
//
// Scoring formula:
//   L(v, base)   = clamp(log_base(v + 1) / ceiling, 0, 1)   (0 for v < 0)
//                  ceiling = 5.0 for base 10, 10.0 for base 2
//   stars        = 0.40 * L(github_stars, 10)
//   citations    = 0.30 * L(citation_count, 10)
//   votes        = 0.20 * L(max(vote_count, 0), 2)
//   recency      = 0.10 * clamp(2^(-days_since_publication / 365), 0, 1)
//   score        = clamp(stars + citations + votes + recency, 0, 1)
//
// Absent metrics contribute 0. Every component is clamped, so no input
// combination raises.

use crate::config::ScoringConfig;
use crate::error::Result;
use crate::types::{MetricPoint, ScoreBreakdown};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogBase {
    Ten,
    Two,
}

/// Log-normalized value in [0, 1]. Negative values contribute 0.
pub fn log_component(value: i64, base: LogBase, config: &ScoringConfig) -> f64 {
    if value < 0 {
        return 0.0;
    }
    let shifted = value as f64 + 1.0;
    let (raw, ceiling) = match base {
        LogBase::Ten => (shifted.log10(), config.log10_ceiling),
        LogBase::Two => (shifted.log2(), config.log2_ceiling),
    };
    (raw / ceiling).clamp(0.0, 1.0)
}

/// Exponential half-life decay in [0, 1]. Future dates clamp to 1.
pub fn recency_decay(published: NaiveDate, today: NaiveDate, half_life_days: f64) -> f64 {
    let days = (today - published).num_days() as f64;
    2f64.powf(-days / half_life_days).clamp(0.0, 1.0)
}

/// Computes hype scores with a fixed, validated weighting.
#[derive(Debug, Clone, Default)]
pub struct HypeScoreEngine {
    config: ScoringConfig,
}

impl HypeScoreEngine {
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score in [0, 1] from raw, possibly missing, metrics.
    pub fn compute(
        &self,
        github_stars: Option<i64>,
        citation_count: Option<i64>,
        vote_count: Option<i64>,
        published_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> f64 {
        let point = MetricPoint {
            github_stars,
            citation_count,
            vote_count,
            published_date,
        };
        self.breakdown(&point, today).total
    }

    pub fn compute_point(&self, point: &MetricPoint, today: NaiveDate) -> f64 {
        self.breakdown(point, today).total
    }

    /// Per-component contributions plus the clamped total.
    pub fn breakdown(&self, point: &MetricPoint, today: NaiveDate) -> ScoreBreakdown {
        let c = &self.config;

        let stars = point
            .github_stars
            .map(|v| c.star_weight * log_component(v, LogBase::Ten, c))
            .unwrap_or(0.0);
        let citations = point
            .citation_count
            .map(|v| c.citation_weight * log_component(v, LogBase::Ten, c))
            .unwrap_or(0.0);
        // Net-negative votes count as zero, never as a penalty
        let votes = point
            .vote_count
            .map(|v| c.vote_weight * log_component(v.max(0), LogBase::Two, c))
            .unwrap_or(0.0);
        let recency = point
            .published_date
            .map(|d| c.recency_weight * recency_decay(d, today, c.half_life_days))
            .unwrap_or(0.0);

        // Weights are validated to sum to <= 1.0; the clamp absorbs rounding
        let total = (stars + citations + votes + recency).clamp(0.0, 1.0);

        ScoreBreakdown {
            stars,
            citations,
            votes,
            recency,
            total,
        }
    }
}

/// Hype score with the default weighting.
pub fn compute(
    github_stars: Option<i64>,
    citation_count: Option<i64>,
    vote_count: Option<i64>,
    published_date: Option<NaiveDate>,
    today: NaiveDate,
) -> f64 {
    HypeScoreEngine::default().compute(
        github_stars,
        citation_count,
        vote_count,
        published_date,
        today,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const EPS: f64 = 1e-9;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn all_missing_is_exactly_zero() {
        assert_eq!(compute(None, None, None, None, today()), 0.0);
    }

    #[test]
    fn zero_metrics_contribute_nothing() {
        assert_eq!(compute(Some(0), Some(0), Some(0), None, today()), 0.0);
    }

    #[test]
    fn log_component_calibration_points() {
        let c = ScoringConfig::default();
        // 100_000 stars is the practical ceiling for base 10
        assert!((log_component(100_000, LogBase::Ten, &c) - 1.0).abs() < 1e-4);
        // 1_000 votes is the practical ceiling for base 2
        assert_eq!(log_component(1_000, LogBase::Two, &c), 1001f64.log2() / 10.0);
        assert!((log_component(1_000, LogBase::Two, &c) - 1.0).abs() < 5e-3);
        assert_eq!(log_component(10_000_000, LogBase::Ten, &c), 1.0);
        assert_eq!(log_component(-3, LogBase::Ten, &c), 0.0);
    }

    #[test]
    fn negative_votes_equal_zero_votes() {
        let d = Some(today() - Duration::days(30));
        let neg = compute(Some(50), Some(5), Some(-5), d, today());
        let zero = compute(Some(50), Some(5), Some(0), d, today());
        assert_eq!(neg, zero);
    }

    #[test]
    fn negative_counts_clamp_silently() {
        assert_eq!(compute(Some(-10), Some(-1), None, None, today()), 0.0);
    }

    #[test]
    fn recency_one_half_life_ago() {
        let score = compute(None, None, None, Some(today() - Duration::days(365)), today());
        assert!((score - 0.05).abs() < EPS);
    }

    #[test]
    fn recency_published_today() {
        let score = compute(None, None, None, Some(today()), today());
        assert!((score - 0.10).abs() < EPS);
    }

    #[test]
    fn future_dated_paper_clamps_recency() {
        let score = compute(None, None, None, Some(today() + Duration::days(90)), today());
        assert!((score - 0.10).abs() < EPS);
    }

    #[test]
    fn stars_monotonic() {
        let d = Some(today());
        let more = compute(Some(200), None, None, d, today());
        assert!(more >= compute(Some(100), None, None, d, today()));
    }

    #[test]
    fn citations_monotonic() {
        let more = compute(None, Some(11), None, None, today());
        assert!(more >= compute(None, Some(10), None, None, today()));
    }

    #[test]
    fn votes_monotonic() {
        let mut prev = 0.0;
        for votes in [0, 1, 5, 50, 500, 5000] {
            let score = compute(None, None, Some(votes), None, today());
            assert!(score >= prev, "votes={} dropped the score", votes);
            prev = score;
        }
    }

    #[test]
    fn score_stays_in_unit_range() {
        let dates = [
            None,
            Some(today()),
            Some(today() - Duration::days(10_000)),
            Some(today() + Duration::days(10_000)),
        ];
        for stars in [0, 1, 999, 1_000_000_000] {
            for votes in [i64::MIN, -1, 0, 7, i64::MAX] {
                for d in dates {
                    let s = compute(Some(stars), Some(stars), Some(votes), d, today());
                    assert!((0.0..=1.0).contains(&s), "score {} out of range", s);
                }
            }
        }
    }

    #[test]
    fn saturated_inputs_reach_one() {
        let s = compute(Some(i64::MAX), Some(i64::MAX), Some(i64::MAX), Some(today()), today());
        assert!((s - 1.0).abs() < EPS);
    }

    #[test]
    fn trending_paper_outranks_older_smaller_one() {
        let fresh = compute(Some(1000), Some(100), Some(50), Some(today()), today());
        let old = Some(today() - Duration::days(400));
        let stale = compute(Some(100), Some(10), Some(5), old, today());
        assert!(fresh > stale);
    }

    #[test]
    fn breakdown_sums_to_total() {
        let engine = HypeScoreEngine::default();
        let point = MetricPoint {
            github_stars: Some(1000),
            citation_count: Some(100),
            vote_count: Some(50),
            published_date: Some(today()),
        };
        let b = engine.breakdown(&point, today());
        assert!((b.stars + b.citations + b.votes + b.recency - b.total).abs() < EPS);
        assert!((b.recency - 0.10).abs() < EPS);
    }

    #[test]
    fn recompute_is_deterministic() {
        let a = compute(Some(42), Some(7), Some(3), Some(today()), today());
        let b = compute(Some(42), Some(7), Some(3), Some(today()), today());
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn custom_half_life_applies() {
        let config = ScoringConfig {
            half_life_days: 30.0,
            ..ScoringConfig::default()
        };
        let engine = HypeScoreEngine::new(config).unwrap();
        let s = engine.compute(None, None, None, Some(today() - Duration::days(30)), today());
        assert!((s - 0.05).abs() < EPS);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = ScoringConfig {
            log2_ceiling: 0.0,
            ..ScoringConfig::default()
        };
        assert!(HypeScoreEngine::new(config).is_err());
    }
}
