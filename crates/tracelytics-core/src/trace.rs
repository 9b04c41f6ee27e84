use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Click,
    Landing,
    Signup,
    Purchase,
    View,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Success,
    Pending,
    Failed,
}

/// A single step recorded inside a trace (click, landing, purchase, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEvent {
    pub id: String,
    /// Epoch millis.
    pub timestamp: i64,
    pub event_type: EventType,
    /// Time spent on the step in millis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Free-form diagnostic values. Never interpreted by aggregation.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub status: EventStatus,
}

/// The advertising campaign a trace was attributed to.
///
/// `source` and `medium` are free-form tags (facebook / cpc, youtube / video,
/// ...). Taxonomy enforcement is left to whoever produces the records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub source: String,
    pub medium: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub converted: bool,
    /// Currency amount (KRW in the bundled datasets).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_value: Option<f64>,
    /// Percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roi: Option<f64>,
    /// Millis from first click to conversion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device: String,
    pub os: String,
    pub browser: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    External,
    Internal,
    Direct,
}

/// One page-to-page navigation within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferrerFlow {
    pub source_url: String,
    pub destination_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_params: Option<BTreeMap<String, String>>,
    pub flow_type: FlowType,
    pub timestamp: i64,
}

/// One user ad-interaction session, from the first click to exit or conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceRecord {
    pub trace_id: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub campaign: Campaign,
    /// Epoch millis.
    pub start_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    /// Millis; equals `end_time - start_time` whenever `end_time` is set.
    pub total_duration: u64,
    #[serde(default)]
    pub events: Vec<TraceEvent>,
    pub conversion: Conversion,
    pub device_info: DeviceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    pub landing_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_flows: Option<Vec<ReferrerFlow>>,
}

impl TraceRecord {
    pub fn is_converted(&self) -> bool {
        self.conversion.converted
    }

    /// Conversion value counted by aggregation: 0 unless the trace converted.
    pub fn revenue(&self) -> f64 {
        if self.conversion.converted {
            self.conversion.conversion_value.unwrap_or(0.0)
        } else {
            0.0
        }
    }

    /// Time to convert, only for converted traces that recorded it.
    pub fn conversion_time(&self) -> Option<u64> {
        if self.conversion.converted {
            self.conversion.conversion_time
        } else {
            None
        }
    }

    /// Navigation flows, or an empty slice when the trace carries none.
    pub fn flows(&self) -> &[ReferrerFlow] {
        self.referrer_flows.as_deref().unwrap_or(&[])
    }

    /// Events ordered by timestamp, each paired with its offset from
    /// `start_time`. Events sharing a timestamp keep their recorded order.
    pub fn timeline(&self) -> Vec<(i64, &TraceEvent)> {
        let mut events: Vec<&TraceEvent> = self.events.iter().collect();
        events.sort_by_key(|e| e.timestamp);
        events
            .into_iter()
            .map(|e| (e.timestamp - self.start_time, e))
            .collect()
    }

    /// Schema checks a trace source applies before handing records out.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |reason: &str| CoreError::InvalidTrace {
            trace_id: self.trace_id.clone(),
            reason: reason.to_string(),
        };

        if self.trace_id.trim().is_empty() {
            return Err(invalid("trace_id is empty"));
        }
        if self.campaign.id.trim().is_empty() {
            return Err(invalid("campaign.id is empty"));
        }
        if let Some(end_time) = self.end_time {
            if end_time < self.start_time {
                return Err(invalid("end_time is before start_time"));
            }
            let span = u64::try_from(end_time - self.start_time).unwrap_or(u64::MAX);
            if span != self.total_duration {
                return Err(invalid("total_duration does not match end_time - start_time"));
            }
        }
        if let Some(value) = self.conversion.conversion_value {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid("conversion_value must be a non-negative number"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace() -> TraceRecord {
        TraceRecord {
            trace_id: "trace-001".to_string(),
            session_id: "sess-abc123".to_string(),
            user_id: Some("user-12345".to_string()),
            campaign: Campaign {
                id: "camp-001".to_string(),
                name: "Summer promotion".to_string(),
                source: "facebook".to_string(),
                medium: "cpc".to_string(),
                content: None,
                term: None,
                category: None,
                platform: None,
                objective: None,
                target_audience: None,
            },
            start_time: 1_700_000_000_000,
            end_time: Some(1_700_000_030_000),
            total_duration: 30_000,
            events: vec![
                TraceEvent {
                    id: "event-2".to_string(),
                    timestamp: 1_700_000_000_200,
                    event_type: EventType::Landing,
                    duration: Some(1200),
                    metadata: BTreeMap::new(),
                    status: EventStatus::Success,
                },
                TraceEvent {
                    id: "event-1".to_string(),
                    timestamp: 1_700_000_000_000,
                    event_type: EventType::Click,
                    duration: Some(150),
                    metadata: BTreeMap::new(),
                    status: EventStatus::Success,
                },
            ],
            conversion: Conversion {
                converted: true,
                conversion_value: Some(89_000.0),
                roi: Some(445.0),
                conversion_time: Some(30_000),
            },
            device_info: DeviceInfo {
                device: "mobile".to_string(),
                os: "iOS".to_string(),
                browser: "Safari".to_string(),
            },
            referrer: Some("https://www.facebook.com".to_string()),
            landing_url: "https://example.com/summer-collection".to_string(),
            referrer_flows: None,
        }
    }

    #[test]
    fn valid_trace_passes() {
        assert!(trace().validate().is_ok());
    }

    #[test]
    fn empty_campaign_id_is_rejected() {
        let mut t = trace();
        t.campaign.id = "  ".to_string();
        let err = t.validate().unwrap_err();
        assert!(err.to_string().contains("campaign.id"));
    }

    #[test]
    fn duration_mismatch_is_rejected() {
        let mut t = trace();
        t.total_duration = 29_999;
        assert!(t.validate().is_err());

        t.end_time = Some(t.start_time - 1);
        assert!(t.validate().is_err());
    }

    #[test]
    fn open_trace_without_end_time_is_valid() {
        let mut t = trace();
        t.end_time = None;
        t.total_duration = 12;
        assert!(t.validate().is_ok());
    }

    #[test]
    fn unconverted_trace_ignores_conversion_fields() {
        let mut t = trace();
        t.conversion.converted = false;
        assert_eq!(t.revenue(), 0.0);
        assert_eq!(t.conversion_time(), None);
    }

    #[test]
    fn timeline_orders_events_by_timestamp() {
        let t = trace();
        let timeline = t.timeline();
        assert_eq!(timeline[0].0, 0);
        assert_eq!(timeline[0].1.id, "event-1");
        assert_eq!(timeline[1].0, 200);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(trace()).unwrap();
        assert_eq!(json["traceId"], "trace-001");
        assert_eq!(json["totalDuration"], 30_000);
        assert_eq!(json["events"][1]["eventType"], "click");
        assert!(json.get("referrerFlows").is_none());

        let back: TraceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, trace());
    }
}
