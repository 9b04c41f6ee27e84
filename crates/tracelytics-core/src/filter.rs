//! Trace selection applied before aggregation or graph building.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::trace::TraceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionFilter {
    #[default]
    All,
    Converted,
    NotConverted,
}

impl ConversionFilter {
    pub fn parse(raw: Option<&str>) -> Result<Self, CoreError> {
        match raw.map(str::trim) {
            None | Some("") | Some("all") => Ok(Self::All),
            Some("converted") => Ok(Self::Converted),
            Some("not_converted") => Ok(Self::NotConverted),
            Some(other) => Err(CoreError::InvalidFilter(format!(
                "converted must be one of: all, converted, not_converted (got {other:?})"
            ))),
        }
    }

    fn matches(self, converted: bool) -> bool {
        match self {
            Self::All => true,
            Self::Converted => converted,
            Self::NotConverted => !converted,
        }
    }
}

/// Inclusive bounds on a trace's recorded ROI percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiRange {
    pub min: f64,
    pub max: f64,
}

/// Optional dimension filters. The default matches every trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceFilter {
    pub campaign_id: Option<String>,
    pub source: Option<String>,
    /// Empty means any platform; otherwise `campaign.platform` must be listed.
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Empty means any category; otherwise `campaign.category` must be listed.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub converted: ConversionFilter,
    pub device: Option<String>,
    /// Epoch millis, inclusive.
    pub start_time: Option<i64>,
    /// Epoch millis, inclusive.
    pub end_time: Option<i64>,
    pub roi_range: Option<RoiRange>,
}

impl TraceFilter {
    /// Restricts to traces started between the two UTC calendar days, both
    /// days included in full.
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_time = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis());
        self.end_time = (end + Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis() - 1);
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start > end {
                return Err(CoreError::InvalidFilter(
                    "start_time must be on or before end_time".to_string(),
                ));
            }
        }
        if let Some(range) = self.roi_range {
            if range.min.is_nan() || range.max.is_nan() || range.min > range.max {
                return Err(CoreError::InvalidFilter(
                    "roi_range.min must not exceed roi_range.max".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn matches(&self, trace: &TraceRecord) -> bool {
        let campaign = &trace.campaign;

        if let Some(ref campaign_id) = self.campaign_id {
            if &campaign.id != campaign_id {
                return false;
            }
        }
        if let Some(ref source) = self.source {
            if &campaign.source != source {
                return false;
            }
        }
        if !self.platforms.is_empty() {
            let platform = campaign.platform.as_deref().unwrap_or("");
            if !self.platforms.iter().any(|p| p == platform) {
                return false;
            }
        }
        if !self.categories.is_empty() {
            let category = campaign.category.as_deref().unwrap_or("");
            if !self.categories.iter().any(|c| c == category) {
                return false;
            }
        }
        if !self.converted.matches(trace.is_converted()) {
            return false;
        }
        if let Some(ref device) = self.device {
            if &trace.device_info.device != device {
                return false;
            }
        }
        if self.start_time.is_some_and(|start| trace.start_time < start) {
            return false;
        }
        if self.end_time.is_some_and(|end| trace.start_time > end) {
            return false;
        }
        if let Some(range) = self.roi_range {
            let roi = trace.conversion.roi.unwrap_or(0.0);
            if roi < range.min || roi > range.max {
                return false;
            }
        }
        true
    }

    /// Matching traces, in input order.
    pub fn apply(&self, traces: &[TraceRecord]) -> Vec<TraceRecord> {
        traces.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}
