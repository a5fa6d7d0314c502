//! Funnel analytics: per-stage lead counts, recent activity and stage-to-stage
//! conversion.

pub mod aggregator;
pub mod compute;
pub mod funnel;
pub mod intensity;

pub use aggregator::{
    AnalyticsAggregator, AnalyticsAggregatorBuilder, AnalyticsConfig, AnalyticsState, Clock,
    RefreshOutcome,
};
pub use compute::{StageAnalytics, StageAnalyticsMap, compute_stage_analytics};
pub use funnel::{
    ConversionHealth, FunnelSummary, StageConversion, conversion_rate, conversion_rates, summarize,
};
pub use intensity::{flow_intensity, is_active};
