use super::compute::StageAnalyticsMap;
use serde::Serialize;

pub const HEALTHY_THRESHOLD: f64 = 80.0;
pub const WARNING_THRESHOLD: f64 = 50.0;

/// Display classification of a conversion rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionHealth {
    Healthy,
    Warning,
    Critical,
}

impl ConversionHealth {
    /// Rates above 100 are not clamped and classify as healthy.
    pub fn classify(rate: f64) -> Self {
        if rate >= HEALTHY_THRESHOLD {
            ConversionHealth::Healthy
        } else if rate >= WARNING_THRESHOLD {
            ConversionHealth::Warning
        } else {
            ConversionHealth::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConversionHealth::Healthy => "healthy",
            ConversionHealth::Warning => "warning",
            ConversionHealth::Critical => "critical",
        }
    }
}

/// Conversion of one stage relative to its predecessor.
#[derive(Debug, Clone, PartialEq)]
pub struct StageConversion {
    pub stage_id: String,
    pub leads: u64,
    /// `None` for the first stage and whenever the predecessor has no leads.
    pub rate: Option<f64>,
}

impl StageConversion {
    pub fn health(&self) -> Option<ConversionHealth> {
        self.rate.map(ConversionHealth::classify)
    }
}

/// Percentage of `previous` leads that reached `current`.
pub fn conversion_rate(previous: u64, current: u64) -> Option<f64> {
    (previous > 0).then(|| current as f64 / previous as f64 * 100.0)
}

/// Maps ordered stage ids to their conversion rates.
pub fn conversion_rates(stage_ids: &[String], analytics: &StageAnalyticsMap) -> Vec<StageConversion> {
    let mut previous: Option<u64> = None;
    stage_ids
        .iter()
        .map(|id| {
            let leads = analytics.leads(id);
            let rate = previous.and_then(|p| conversion_rate(p, leads));
            previous = Some(leads);
            StageConversion {
                stage_id: id.clone(),
                leads,
                rate,
            }
        })
        .collect()
}

/// Whole-funnel figures.
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelSummary {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub completion_rate: Option<f64>,
    /// The stage with the lowest conversion rate, if any rate is defined.
    pub weakest_stage: Option<String>,
}

pub fn summarize(stage_ids: &[String], analytics: &StageAnalyticsMap) -> FunnelSummary {
    let weakest_stage = conversion_rates(stage_ids, analytics)
        .into_iter()
        .filter_map(|c| c.rate.map(|r| (c.stage_id, r)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id);

    FunnelSummary {
        total_sessions: analytics.total_sessions,
        completed_sessions: analytics.completed_sessions,
        completion_rate: conversion_rate(analytics.total_sessions, analytics.completed_sessions),
        weakest_stage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_predecessor_yields_no_rate() {
        assert_eq!(conversion_rate(0, 0), None);
        assert_eq!(conversion_rate(0, 7), None);
        assert_eq!(conversion_rate(4, 0), Some(0.0));
    }
}
