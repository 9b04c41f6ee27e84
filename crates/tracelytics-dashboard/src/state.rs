use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use tracelytics_core::aggregate::{
    compute_campaign_stats, compute_marketing_metrics, compute_trace_stats,
};
use tracelytics_core::campaign::{
    CampaignSortKey, CampaignStatsMap, MarketingMetrics, SortOrder, TraceStats,
};
use tracelytics_core::config::Config;
use tracelytics_core::filter::TraceFilter;
use tracelytics_core::flow::{build_flow_graph, FlowGraph};
use tracelytics_core::source::TraceSource;

use crate::error::DashboardError;
use crate::snapshot::{CampaignRow, DashboardSnapshot, TraceDetail, TraceSummary};

/// Aggregates computed from a single read of every trace in the source.
#[derive(Debug)]
pub struct Derived {
    /// Source revision observed before the read.
    pub revision: u64,
    pub campaign_stats: CampaignStatsMap,
    pub metrics: MarketingMetrics,
    pub trace_stats: TraceStats,
    pub recent_traces: Vec<TraceSummary>,
}

/// Shared dashboard state: the trace source, parsed configuration and the
/// derived-data cache.
///
/// The cache holds the aggregates for one source revision. Any write to the
/// source bumps its revision, so the next `derived()` call recomputes.
pub struct DashboardState<S: TraceSource> {
    pub source: Arc<S>,
    pub config: Arc<Config>,
    cache: RwLock<Option<Arc<Derived>>>,
}

impl<S: TraceSource> DashboardState<S> {
    pub fn new(source: S, config: Config) -> Self {
        Self {
            source: Arc::new(source),
            config: Arc::new(config),
            cache: RwLock::new(None),
        }
    }

    /// Aggregates for the current source revision, computed at most once per
    /// revision.
    pub async fn derived(&self) -> Result<Arc<Derived>, DashboardError> {
        let revision = self.source.revision().await;

        // Fast path: cache hit.
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| c.revision == revision) {
                return Ok(Arc::clone(cached));
            }
        }

        let mut cache = self.cache.write().await;
        // Another task may have filled it while we waited for the write lock.
        if let Some(cached) = cache.as_ref().filter(|c| c.revision == revision) {
            return Ok(Arc::clone(cached));
        }

        let traces = self.source.all_traces(&TraceFilter::default()).await?;
        let aggregation = self.config.aggregation();
        let campaign_stats = compute_campaign_stats(&traces, &aggregation);
        let metrics = compute_marketing_metrics(&traces, &campaign_stats, &aggregation);
        let trace_stats = compute_trace_stats(&traces);
        let recent_traces = traces
            .iter()
            .take(self.config.recent_traces)
            .map(TraceSummary::from)
            .collect();
        let derived = Arc::new(Derived {
            revision,
            campaign_stats,
            metrics,
            trace_stats,
            recent_traces,
        });
        info!(
            revision,
            traces = traces.len(),
            campaigns = derived.campaign_stats.len(),
            "recomputed dashboard aggregates"
        );

        *cache = Some(Arc::clone(&derived));
        Ok(derived)
    }

    /// Overview: headline metrics, campaigns by ROI, trace stats and the
    /// most recent traces, all taken from the same cached read.
    pub async fn snapshot(&self) -> Result<DashboardSnapshot, DashboardError> {
        let derived = self.derived().await?;

        Ok(DashboardSnapshot {
            revision: derived.revision,
            metrics: derived.metrics.clone(),
            campaigns: derived
                .campaign_stats
                .sorted(CampaignSortKey::default(), SortOrder::default())
                .into_iter()
                .map(CampaignRow::from)
                .collect(),
            trace_stats: derived.trace_stats.clone(),
            recent_traces: derived.recent_traces.clone(),
            generated_at: Utc::now(),
        })
    }

    pub async fn campaigns(
        &self,
        key: CampaignSortKey,
        order: SortOrder,
    ) -> Result<Vec<CampaignRow>, DashboardError> {
        let derived = self.derived().await?;
        Ok(derived
            .campaign_stats
            .sorted(key, order)
            .into_iter()
            .map(CampaignRow::from)
            .collect())
    }

    /// Flow graph over the traces matching `filter`. Filtered graphs are not
    /// cached.
    pub async fn flow_graph(&self, filter: &TraceFilter) -> Result<FlowGraph, DashboardError> {
        filter.validate()?;
        let traces = self.source.all_traces(filter).await?;
        Ok(build_flow_graph(&traces, &self.config.layout()))
    }

    pub async fn trace(&self, trace_id: &str) -> Result<TraceDetail, DashboardError> {
        match self.source.get_trace(trace_id).await? {
            Some(trace) => Ok(TraceDetail::from(trace)),
            None => Err(DashboardError::NotFound(format!("trace {trace_id}"))),
        }
    }
}
