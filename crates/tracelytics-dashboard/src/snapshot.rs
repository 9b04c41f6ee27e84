//! Serializable views handed to dashboard consumers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tracelytics_core::campaign::{CampaignStats, MarketingMetrics, TraceStats};
use tracelytics_core::format::{
    extract_referrer_domain, format_currency_krw, format_duration, format_percent, url_label,
    ConversionTier, RoiTier,
};
use tracelytics_core::trace::{EventType, TraceRecord};

/// Everything the overview page renders, computed from one source revision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub revision: u64,
    pub metrics: MarketingMetrics,
    pub campaigns: Vec<CampaignRow>,
    pub trace_stats: TraceStats,
    pub recent_traces: Vec<TraceSummary>,
    pub generated_at: DateTime<Utc>,
}

/// Campaign stats plus the display labels and tiers shown next to them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRow {
    #[serde(flatten)]
    pub stats: CampaignStats,
    pub roi_tier: RoiTier,
    pub conversion_tier: ConversionTier,
    pub revenue_label: String,
    pub cost_label: String,
    pub roi_label: String,
}

impl From<CampaignStats> for CampaignRow {
    fn from(stats: CampaignStats) -> Self {
        Self {
            roi_tier: RoiTier::classify(stats.roi),
            conversion_tier: ConversionTier::classify(stats.conversion_rate),
            revenue_label: format_currency_krw(stats.revenue),
            cost_label: format_currency_krw(stats.cost),
            roi_label: format_percent(stats.roi),
            stats,
        }
    }
}

/// One line of the recent-traces list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSummary {
    pub trace_id: String,
    pub campaign_id: String,
    pub campaign_name: String,
    pub source: String,
    pub device: String,
    pub start_time: i64,
    pub duration_label: String,
    pub converted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_label: Option<String>,
    pub landing_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_domain: Option<String>,
    pub event_count: usize,
    pub flow_count: usize,
}

impl From<&TraceRecord> for TraceSummary {
    fn from(trace: &TraceRecord) -> Self {
        Self {
            trace_id: trace.trace_id.clone(),
            campaign_id: trace.campaign.id.clone(),
            campaign_name: trace.campaign.name.clone(),
            source: trace.campaign.source.clone(),
            device: trace.device_info.device.clone(),
            start_time: trace.start_time,
            duration_label: format_duration(trace.total_duration),
            converted: trace.is_converted(),
            value_label: trace
                .is_converted()
                .then(|| format_currency_krw(trace.revenue())),
            landing_label: url_label(&trace.landing_url),
            referrer_domain: trace.referrer.as_deref().and_then(extract_referrer_domain),
            event_count: trace.events.len(),
            flow_count: trace.flows().len(),
        }
    }
}

/// A single event placed on the trace timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub event_id: String,
    pub event_type: EventType,
    /// Millis since the trace started.
    pub offset: i64,
    pub offset_label: String,
}

/// Full trace plus its ordered timeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceDetail {
    pub trace: TraceRecord,
    pub timeline: Vec<TimelineEntry>,
}

impl From<TraceRecord> for TraceDetail {
    fn from(trace: TraceRecord) -> Self {
        let timeline = trace
            .timeline()
            .into_iter()
            .map(|(offset, event)| TimelineEntry {
                event_id: event.id.clone(),
                event_type: event.event_type,
                offset,
                offset_label: format_duration(u64::try_from(offset).unwrap_or(0)),
            })
            .collect();
        Self { trace, timeline }
    }
}
