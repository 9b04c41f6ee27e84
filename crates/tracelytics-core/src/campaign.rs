use std::collections::HashMap;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Per-campaign rollup derived from trace records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStats {
    pub campaign_id: String,
    pub campaign_name: String,
    pub source: String,
    pub medium: String,
    pub clicks: u64,
    pub conversions: u64,
    /// Percent, 0–100.
    pub conversion_rate: f64,
    pub revenue: f64,
    pub cost: f64,
    /// Percent; negative when cost exceeds revenue.
    pub roi: f64,
    /// Mean trace duration in millis.
    pub average_session_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingMetrics {
    pub total_clicks: u64,
    pub total_conversions: u64,
    pub total_revenue: f64,
    pub total_cost: f64,
    #[serde(rename = "overallROI")]
    pub overall_roi: f64,
    pub average_conversion_rate: f64,
    pub average_conversion_time: f64,
    pub top_campaigns: Vec<CampaignStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceStats {
    pub total_traces: u64,
    pub total_clicks: u64,
    pub total_conversions: u64,
    pub conversion_rate: f64,
    #[serde(rename = "averageROI")]
    pub average_roi: f64,
    pub average_conversion_time: f64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignSortKey {
    Clicks,
    Conversions,
    #[default]
    Roi,
    Revenue,
}

impl CampaignSortKey {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("roi") => Ok(Self::Roi),
            Some("clicks") => Ok(Self::Clicks),
            Some("conversions") => Ok(Self::Conversions),
            Some("revenue") => Ok(Self::Revenue),
            Some(_) => Err(anyhow!(
                "sort_by must be one of: clicks, conversions, roi, revenue"
            )),
        }
    }

    fn value(self, stats: &CampaignStats) -> f64 {
        match self {
            Self::Clicks => stats.clicks as f64,
            Self::Conversions => stats.conversions as f64,
            Self::Roi => stats.roi,
            Self::Revenue => stats.revenue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("desc") => Ok(Self::Desc),
            Some("asc") => Ok(Self::Asc),
            Some(_) => Err(anyhow!("sort_order must be one of: asc, desc")),
        }
    }
}

/// Campaign stats keyed by campaign id, iterated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignStatsMap {
    rows: Vec<CampaignStats>,
    index: HashMap<String, usize>,
}

impl CampaignStatsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `campaign_id`, creating it with `init` on first sight.
    pub fn entry_or_insert_with<F>(&mut self, campaign_id: &str, init: F) -> &mut CampaignStats
    where
        F: FnOnce() -> CampaignStats,
    {
        let idx = match self.index.get(campaign_id) {
            Some(&idx) => idx,
            None => {
                self.rows.push(init());
                let idx = self.rows.len() - 1;
                self.index.insert(campaign_id.to_string(), idx);
                idx
            }
        };
        &mut self.rows[idx]
    }

    pub fn get(&self, campaign_id: &str) -> Option<&CampaignStats> {
        self.index.get(campaign_id).map(|&idx| &self.rows[idx])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CampaignStats> {
        self.rows.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, CampaignStats> {
        self.rows.iter_mut()
    }

    pub fn as_slice(&self) -> &[CampaignStats] {
        &self.rows
    }

    pub fn by_source(&self, source: &str) -> Vec<CampaignStats> {
        self.rows
            .iter()
            .filter(|stats| stats.source == source)
            .cloned()
            .collect()
    }

    /// Copies of every entry ordered by `key`. Equal keys keep first-seen order.
    pub fn sorted(&self, key: CampaignSortKey, order: SortOrder) -> Vec<CampaignStats> {
        let mut sorted = self.rows.clone();
        sorted.sort_by(|a, b| {
            let (a, b) = (key.value(a), key.value(b));
            match order {
                SortOrder::Asc => a.total_cmp(&b),
                SortOrder::Desc => b.total_cmp(&a),
            }
        });
        sorted
    }
}

impl<'a> IntoIterator for &'a CampaignStatsMap {
    type Item = &'a CampaignStats;
    type IntoIter = std::slice::Iter<'a, CampaignStats>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(id: &str, source: &str, clicks: u64, roi: f64) -> CampaignStats {
        CampaignStats {
            campaign_id: id.to_string(),
            campaign_name: format!("Campaign {id}"),
            source: source.to_string(),
            medium: "cpc".to_string(),
            clicks,
            conversions: 0,
            conversion_rate: 0.0,
            revenue: 0.0,
            cost: 0.0,
            roi,
            average_session_duration: 0.0,
        }
    }

    fn map() -> CampaignStatsMap {
        let mut map = CampaignStatsMap::new();
        for s in [
            stats("camp-001", "facebook", 2, 150.0),
            stats("camp-002", "google", 5, 400.0),
            stats("camp-003", "facebook", 1, 150.0),
        ] {
            let id = s.campaign_id.clone();
            map.entry_or_insert_with(&id, || s);
        }
        map
    }

    #[test]
    fn entry_is_created_once() {
        let mut map = map();
        map.entry_or_insert_with("camp-001", || stats("camp-001", "other", 99, 0.0))
            .clicks += 1;
        assert_eq!(map.len(), 3);
        let first = map.get("camp-001").unwrap();
        assert_eq!(first.clicks, 3);
        assert_eq!(first.source, "facebook");
    }

    #[test]
    fn iteration_follows_first_seen_order() {
        let m = map();
        let ids: Vec<&str> = m.iter().map(|s| s.campaign_id.as_str()).collect();
        assert_eq!(ids, ["camp-001", "camp-002", "camp-003"]);
    }

    #[test]
    fn by_source_filters() {
        let fb = map().by_source("facebook");
        assert_eq!(fb.len(), 2);
        assert!(map().by_source("naver").is_empty());
    }

    #[test]
    fn sorted_by_roi_desc_is_stable() {
        let ids: Vec<String> = map()
            .sorted(CampaignSortKey::Roi, SortOrder::Desc)
            .into_iter()
            .map(|s| s.campaign_id)
            .collect();
        assert_eq!(ids, ["camp-002", "camp-001", "camp-003"]);
    }

    #[test]
    fn sorted_by_clicks_asc() {
        let ids: Vec<String> = map()
            .sorted(CampaignSortKey::Clicks, SortOrder::Asc)
            .into_iter()
            .map(|s| s.campaign_id)
            .collect();
        assert_eq!(ids, ["camp-003", "camp-001", "camp-002"]);
    }

    #[test]
    fn parse_sort_options() {
        assert_eq!(CampaignSortKey::parse(None).unwrap(), CampaignSortKey::Roi);
        assert_eq!(
            CampaignSortKey::parse(Some("revenue")).unwrap(),
            CampaignSortKey::Revenue
        );
        assert!(CampaignSortKey::parse(Some("ctr")).is_err());
        assert_eq!(SortOrder::parse(Some("asc")).unwrap(), SortOrder::Asc);
        assert!(SortOrder::parse(Some("sideways")).is_err());
    }
}
