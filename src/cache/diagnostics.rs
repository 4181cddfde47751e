//! Diagnostics Module
//!
//! Derives a health verdict and recommendations from a stats snapshot.

use std::time::Duration;

use serde::Serialize;

use crate::cache::CacheStats;

// == Health Status ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Maps an issue count to a status: none is healthy, one or two a warning.
    pub fn from_issue_count(count: usize) -> Self {
        match count {
            0 => HealthStatus::Healthy,
            1 | 2 => HealthStatus::Warning,
            _ => HealthStatus::Critical,
        }
    }
}

// == Health Thresholds ==
/// Limits past which a statistic is reported as an issue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthThresholds {
    /// Issue when the hit rate falls below this fraction
    pub min_hit_rate: f64,
    /// Issue when `total_size / max_total_size` rises above this fraction
    pub max_memory_usage: f64,
    /// Issue when the mean response time rises above this
    pub max_average_response_time: Duration,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            min_hit_rate: 0.70,
            max_memory_usage: 0.90,
            max_average_response_time: Duration::from_millis(10),
        }
    }
}

// == Health Report ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

// == Evaluate ==
/// Judges a stats snapshot against the thresholds.
///
/// Each check contributes at most one issue and one matching recommendation.
pub fn evaluate(stats: &CacheStats, thresholds: &HealthThresholds) -> HealthReport {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    let hit_rate = stats.hit_rate();
    if hit_rate < thresholds.min_hit_rate {
        issues.push(format!(
            "Low hit rate: {:.1}% (threshold {:.1}%)",
            hit_rate * 100.0,
            thresholds.min_hit_rate * 100.0
        ));
        recommendations.push("Increase the default TTL or the cache capacity".to_string());
    }

    let memory_usage = stats.memory_usage();
    if memory_usage > thresholds.max_memory_usage {
        issues.push(format!(
            "High memory usage: {:.1}% of {} bytes",
            memory_usage * 100.0,
            stats.max_total_size
        ));
        recommendations.push("Raise max_total_size or lower the TTL".to_string());
    }

    let average_ms = stats.response_times.average_ms;
    let limit_ms = thresholds.max_average_response_time.as_secs_f64() * 1000.0;
    if average_ms > limit_ms {
        issues.push(format!(
            "Slow average response time: {:.2}ms (threshold {:.2}ms)",
            average_ms, limit_ms
        ));
        recommendations.push(
            "Look for oversized cached objects or I/O stalls in the compression path"
                .to_string(),
        );
    }

    HealthReport {
        status: HealthStatus::from_issue_count(issues.len()),
        issues,
        recommendations,
    }
}
