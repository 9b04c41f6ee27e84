//! Rolls trace records up into campaign statistics and dashboard-wide metrics.
//!
//! Every function here is total: empty input, zero clicks and zero cost all
//! resolve to `0.0` rather than NaN or infinity.

use tracing::debug;

use crate::campaign::{CampaignStats, CampaignStatsMap, MarketingMetrics, TraceStats};
use crate::config::AggregationConfig;
use crate::trace::TraceRecord;

/// `numerator / denominator * 100`, or 0 when the denominator is zero.
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

/// Return on spend in percent, or 0 when nothing was spent.
pub fn roi(revenue: f64, cost: f64) -> f64 {
    percentage(revenue - cost, cost)
}

fn mean(sum: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Groups traces by `campaign.id` and derives per-campaign rates.
///
/// Campaign name, source and medium are taken from the first trace seen for
/// each id. An empty id forms its own group.
pub fn compute_campaign_stats(
    traces: &[TraceRecord],
    config: &AggregationConfig,
) -> CampaignStatsMap {
    let mut map = CampaignStatsMap::new();

    for trace in traces {
        let campaign = &trace.campaign;
        let stats = map.entry_or_insert_with(&campaign.id, || CampaignStats {
            campaign_id: campaign.id.clone(),
            campaign_name: campaign.name.clone(),
            source: campaign.source.clone(),
            medium: campaign.medium.clone(),
            clicks: 0,
            conversions: 0,
            conversion_rate: 0.0,
            revenue: 0.0,
            cost: 0.0,
            roi: 0.0,
            average_session_duration: 0.0,
        });

        stats.clicks += 1;
        if trace.is_converted() {
            stats.conversions += 1;
            stats.revenue += trace.revenue();
        }
        // Stored as a running sum until the pass below.
        stats.average_session_duration += trace.total_duration as f64;
    }

    for stats in map.iter_mut() {
        let clicks = stats.clicks as f64;
        stats.conversion_rate = percentage(stats.conversions as f64, clicks);
        stats.average_session_duration = mean(stats.average_session_duration, stats.clicks);
        stats.cost = clicks * config.cost_per_click;
        stats.roi = roi(stats.revenue, stats.cost);
    }

    debug!(
        traces = traces.len(),
        campaigns = map.len(),
        "computed campaign stats"
    );
    map
}

/// Dashboard-wide totals plus the best campaigns by ROI.
pub fn compute_marketing_metrics(
    traces: &[TraceRecord],
    campaign_stats: &CampaignStatsMap,
    config: &AggregationConfig,
) -> MarketingMetrics {
    let total_clicks = traces.len() as u64;
    let total_conversions = traces.iter().filter(|t| t.is_converted()).count() as u64;
    let total_revenue: f64 = traces.iter().map(TraceRecord::revenue).sum();
    let total_cost = total_clicks as f64 * config.cost_per_click;

    let (time_sum, time_count) = traces
        .iter()
        .filter_map(TraceRecord::conversion_time)
        .fold((0.0, 0u64), |(sum, n), ms| (sum + ms as f64, n + 1));

    let mut top_campaigns = campaign_stats.as_slice().to_vec();
    // sort_by is stable, so equal ROI keeps first-seen order.
    top_campaigns.sort_by(|a, b| b.roi.total_cmp(&a.roi));
    top_campaigns.truncate(config.top_campaigns);

    MarketingMetrics {
        total_clicks,
        total_conversions,
        total_revenue,
        total_cost,
        overall_roi: roi(total_revenue, total_cost),
        average_conversion_rate: percentage(total_conversions as f64, total_clicks as f64),
        average_conversion_time: mean(time_sum, time_count),
        top_campaigns,
    }
}

/// Summary numbers for a (possibly filtered) trace list.
pub fn compute_trace_stats(traces: &[TraceRecord]) -> TraceStats {
    let total_traces = traces.len() as u64;
    let total_conversions = traces.iter().filter(|t| t.is_converted()).count() as u64;

    let (roi_sum, roi_count) = traces
        .iter()
        .filter(|t| t.is_converted())
        .filter_map(|t| t.conversion.roi)
        .fold((0.0, 0u64), |(sum, n), r| (sum + r, n + 1));
    let (time_sum, time_count) = traces
        .iter()
        .filter_map(TraceRecord::conversion_time)
        .fold((0.0, 0u64), |(sum, n), ms| (sum + ms as f64, n + 1));

    TraceStats {
        total_traces,
        total_clicks: total_traces,
        total_conversions,
        conversion_rate: percentage(total_conversions as f64, total_traces as f64),
        average_roi: mean(roi_sum, roi_count),
        average_conversion_time: mean(time_sum, time_count),
        total_revenue: traces.iter().map(TraceRecord::revenue).sum(),
    }
}
