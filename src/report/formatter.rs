use crate::analytics::{StageAnalyticsMap, conversion_rates, summarize};
use crate::stage::Stage;

/// Formats funnel analytics into a plain-text report.
pub struct FunnelFormatter;

impl FunnelFormatter {
    /// One line per stage in sequence order, followed by a summary line.
    pub fn format_funnel(stages: &[Stage], analytics: &StageAnalyticsMap) -> String {
        let mut ordered: Vec<&Stage> = stages.iter().collect();
        ordered.sort_by_key(|s| s.order);
        let ids: Vec<String> = ordered.iter().map(|s| s.id.clone()).collect();
        let name_width = ordered.iter().map(|s| s.name.len()).max().unwrap_or(0);

        let mut lines = Vec::with_capacity(ordered.len() + 1);
        for (i, (stage, conversion)) in ordered
            .iter()
            .zip(conversion_rates(&ids, analytics))
            .enumerate()
        {
            let recent = analytics.recent_activity(&stage.id);
            let rate = match (conversion.rate, conversion.health()) {
                (Some(rate), Some(health)) => {
                    format!("{} ({})", Self::format_percent(rate), health.label())
                }
                _ => "-".to_string(),
            };
            let pulse = if recent > 0 {
                format!("  [{} recent]", recent)
            } else {
                String::new()
            };
            lines.push(format!(
                "{:>2}. {:<width$}  leads: {:>5}  conversion: {}{}",
                i + 1,
                stage.name,
                conversion.leads,
                rate,
                pulse,
                width = name_width
            ));
        }

        let summary = summarize(&ids, analytics);
        lines.push(format!(
            "sessions: {}  completed: {}  completion: {}",
            summary.total_sessions,
            summary.completed_sessions,
            summary
                .completion_rate
                .map(Self::format_percent)
                .unwrap_or_else(|| "-".to_string())
        ));
        lines.join("\n")
    }

    /// Whole percentages print without decimals.
    pub fn format_percent(rate: f64) -> String {
        if rate.fract() == 0.0 {
            format!("{}%", rate as i64)
        } else {
            format!("{:.1}%", rate)
        }
    }
}
