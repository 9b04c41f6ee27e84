use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::{info, warn};

use tracelytics_core::filter::TraceFilter;
use tracelytics_core::source::TraceSource;
use tracelytics_core::trace::TraceRecord;

use crate::generator::TraceGenerator;

/// In-memory trace store backing the dashboard until a real collector exists.
///
/// Reads take the shared lock; `replace` and `insert_traces` take the write
/// lock and bump the revision so cached aggregates are rebuilt.
pub struct MockTraceSource {
    traces: Arc<RwLock<Vec<TraceRecord>>>,
    revision: AtomicU64,
}

impl MockTraceSource {
    /// Seeded synthetic traces, `count` of them, ending at `base_time`.
    pub fn from_seed(seed: u64, count: usize, base_time: i64) -> Self {
        let traces = TraceGenerator::new(seed).generate(count, base_time);
        info!(seed, count = traces.len(), "mock trace source ready");
        Self::with_records(traces)
    }

    /// Wraps existing records. Records that fail validation are logged and
    /// left out.
    pub fn from_traces(traces: Vec<TraceRecord>) -> Self {
        Self::with_records(keep_valid(traces))
    }

    fn with_records(traces: Vec<TraceRecord>) -> Self {
        Self {
            traces: Arc::new(RwLock::new(traces)),
            revision: AtomicU64::new(1),
        }
    }

    /// Swaps the whole record set. Returns how many records were kept.
    pub async fn replace(&self, traces: Vec<TraceRecord>) -> usize {
        let traces = keep_valid(traces);
        let kept = traces.len();
        *self.traces.write().await = traces;
        self.revision.fetch_add(1, Ordering::SeqCst);
        kept
    }

    pub async fn len(&self) -> usize {
        self.traces.read().await.len()
    }
}

/// Drops invalid records and every record reusing an earlier `trace_id`.
fn keep_valid(traces: Vec<TraceRecord>) -> Vec<TraceRecord> {
    let mut seen = HashSet::new();
    traces
        .into_iter()
        .filter(|trace| {
            if let Err(e) = trace.validate() {
                warn!(error = %e, "skipping invalid trace record");
                return false;
            }
            if !seen.insert(trace.trace_id.clone()) {
                warn!(trace_id = %trace.trace_id, "skipping duplicate trace record");
                return false;
            }
            true
        })
        .collect()
}

#[async_trait::async_trait]
impl TraceSource for MockTraceSource {
    async fn all_traces(&self, filter: &TraceFilter) -> Result<Vec<TraceRecord>> {
        filter.validate()?;
        let traces = self.traces.read().await;
        Ok(filter.apply(&traces))
    }

    async fn get_trace(&self, trace_id: &str) -> Result<Option<TraceRecord>> {
        let traces = self.traces.read().await;
        Ok(traces.iter().find(|t| t.trace_id == trace_id).cloned())
    }

    async fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Appends records, rejecting the whole batch if any record is invalid or
    /// reuses a trace id, either within the batch or against stored records.
    async fn insert_traces(&self, traces: Vec<TraceRecord>) -> Result<usize> {
        {
            let mut batch_ids = HashSet::with_capacity(traces.len());
            for trace in &traces {
                trace.validate()?;
                if !batch_ids.insert(trace.trace_id.as_str()) {
                    anyhow::bail!("trace {} appears twice in the batch", trace.trace_id);
                }
            }
        }
        let mut stored = self.traces.write().await;
        if let Some(dup) = traces
            .iter()
            .find(|t| stored.iter().any(|s| s.trace_id == t.trace_id))
        {
            anyhow::bail!("trace {} already exists", dup.trace_id);
        }
        let inserted = traces.len();
        stored.extend(traces);
        drop(stored);
        self.revision.fetch_add(1, Ordering::SeqCst);
        Ok(inserted)
    }
}
