//! Trace record source abstraction.

use serde::{Deserialize, Serialize};

use crate::filter::TraceFilter;
use crate::trace::TraceRecord;

pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

impl PageRequest {
    /// Page clamped to >= 1 and page size clamped to 1..=MAX_PAGE_SIZE.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracePage {
    pub rows: Vec<TraceRecord>,
    pub pagination: Pagination,
}

/// Slices `traces` into the requested page.
pub fn paginate(traces: Vec<TraceRecord>, request: PageRequest) -> TracePage {
    let request = request.normalized();
    let total = traces.len() as u64;
    let page_size = u64::from(request.page_size);
    let total_pages = total.div_ceil(page_size);
    let offset = (u64::from(request.page) - 1).saturating_mul(page_size);

    let rows = traces
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(request.page_size as usize)
        .collect();

    TracePage {
        rows,
        pagination: Pagination {
            page: request.page,
            page_size: request.page_size,
            total,
            total_pages,
        },
    }
}

/// Anything that can hand out trace records: the seeded mock today, a
/// collector API later. Filtering happens here, before records reach the
/// aggregation and flow functions.
#[async_trait::async_trait]
pub trait TraceSource: Send + Sync + 'static {
    /// Every trace matching `filter`, in source order.
    async fn all_traces(&self, filter: &TraceFilter) -> anyhow::Result<Vec<TraceRecord>>;

    async fn get_trace(&self, trace_id: &str) -> anyhow::Result<Option<TraceRecord>>;

    /// Changes whenever the underlying records change. Derived-data caches key
    /// on it.
    async fn revision(&self) -> u64;

    async fn list_traces(
        &self,
        filter: &TraceFilter,
        page: PageRequest,
    ) -> anyhow::Result<TracePage> {
        let traces = self.all_traces(filter).await?;
        Ok(paginate(traces, page))
    }

    async fn insert_traces(&self, _traces: Vec<TraceRecord>) -> anyhow::Result<usize> {
        anyhow::bail!("this trace source is read-only");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Campaign, Conversion, DeviceInfo};

    fn traces(n: usize) -> Vec<TraceRecord> {
        (0..n)
            .map(|i| TraceRecord {
                trace_id: format!("trace-{i:03}"),
                session_id: format!("sess-{i}"),
                user_id: None,
                campaign: Campaign {
                    id: "camp-001".to_string(),
                    name: "Campaign".to_string(),
                    source: "google".to_string(),
                    medium: "cpc".to_string(),
                    content: None,
                    term: None,
                    category: None,
                    platform: None,
                    objective: None,
                    target_audience: None,
                },
                start_time: 0,
                end_time: None,
                total_duration: 0,
                events: Vec::new(),
                conversion: Conversion::default(),
                device_info: DeviceInfo {
                    device: "desktop".to_string(),
                    os: "macOS".to_string(),
                    browser: "Safari".to_string(),
                },
                referrer: None,
                landing_url: "https://example.com/".to_string(),
                referrer_flows: None,
            })
            .collect()
    }

    #[test]
    fn paginate_middle_page() {
        let page = paginate(traces(45), PageRequest { page: 2, page_size: 20 });
        assert_eq!(page.rows.len(), 20);
        assert_eq!(page.rows[0].trace_id, "trace-020");
        assert_eq!(page.pagination.total, 45);
        assert_eq!(page.pagination.total_pages, 3);
    }

    #[test]
    fn paginate_past_the_end_is_empty() {
        let page = paginate(traces(5), PageRequest { page: 9, page_size: 10 });
        assert!(page.rows.is_empty());
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[test]
    fn paginate_clamps_request() {
        let page = paginate(traces(3), PageRequest { page: 0, page_size: 0 });
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.page_size, 1);
        assert_eq!(page.rows.len(), 1);

        let page = paginate(traces(3), PageRequest { page: 1, page_size: 5000 });
        assert_eq!(page.pagination.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn paginate_empty() {
        let page = paginate(Vec::new(), PageRequest::default());
        assert!(page.rows.is_empty());
        assert_eq!(page.pagination.total_pages, 0);
    }
}
