//! Hand-written sample traces covering every bundled campaign.
//!
//! Start times are offsets before `base_time` so the set always looks recent.

use std::collections::BTreeMap;

use tracelytics_core::trace::{
    Campaign, Conversion, DeviceInfo, FlowType, ReferrerFlow, TraceRecord,
};

use crate::generator::{clamp_base_time, site_url, standard_events, trace_roi, CAMPAIGNS};

const HOUR_MS: i64 = 3_600_000;

struct Sample {
    trace_id: &'static str,
    session_id: &'static str,
    user_id: Option<&'static str>,
    campaign_id: &'static str,
    content: Option<&'static str>,
    term: Option<&'static str>,
    ago_ms: i64,
    duration: u64,
    conversion_value: Option<f64>,
    device: (&'static str, &'static str, &'static str),
    landing_path: &'static str,
    /// Pages visited after landing, before checkout.
    pages: &'static [&'static str],
}

const SAMPLES: &[Sample] = &[
    Sample {
        trace_id: "trace-001",
        session_id: "sess-abc123",
        user_id: Some("user-12345"),
        campaign_id: "camp-001",
        content: Some("summer-new-arrival"),
        term: Some("summer clothes"),
        ago_ms: 2 * HOUR_MS,
        duration: 30_000,
        conversion_value: Some(89_000.0),
        device: ("mobile", "iOS", "Safari"),
        landing_path: "/summer-collection",
        pages: &["/products/detail"],
    },
    Sample {
        trace_id: "trace-002",
        session_id: "sess-def456",
        user_id: None,
        campaign_id: "camp-002",
        content: None,
        term: Some("sneaker recommendations"),
        ago_ms: HOUR_MS,
        duration: 8_000,
        conversion_value: None,
        device: ("desktop", "Windows", "Chrome"),
        landing_path: "/sneakers",
        pages: &["/products"],
    },
    Sample {
        trace_id: "trace-003",
        session_id: "sess-ghi789",
        user_id: Some("user-67890"),
        campaign_id: "camp-003",
        content: Some("story-ad-001"),
        term: None,
        ago_ms: HOUR_MS / 2,
        duration: 45_000,
        conversion_value: Some(125_000.0),
        device: ("mobile", "Android", "Chrome"),
        landing_path: "/premium-collection",
        pages: &["/products/detail", "/reviews"],
    },
    Sample {
        trace_id: "trace-004",
        session_id: "sess-jkl012",
        user_id: None,
        campaign_id: "camp-004",
        content: None,
        term: Some("backpack"),
        ago_ms: HOUR_MS / 4,
        duration: 5_000,
        conversion_value: None,
        device: ("mobile", "Android", "Samsung Internet"),
        landing_path: "/backpacks",
        pages: &[],
    },
    Sample {
        trace_id: "trace-005",
        session_id: "sess-mno345",
        user_id: Some("user-11111"),
        campaign_id: "camp-001",
        content: Some("summer-new-arrival"),
        term: Some("summer fashion"),
        ago_ms: 600_000,
        duration: 28_000,
        conversion_value: Some(67_000.0),
        device: ("desktop", "macOS", "Safari"),
        landing_path: "/summer-collection",
        pages: &["/products/detail"],
    },
    Sample {
        trace_id: "trace-006",
        session_id: "sess-pqr678",
        user_id: None,
        campaign_id: "camp-005",
        content: Some("video-ad-001"),
        term: None,
        ago_ms: 300_000,
        duration: 12_000,
        conversion_value: None,
        device: ("mobile", "iOS", "Safari"),
        landing_path: "/video-promo",
        pages: &["/products", "/cart"],
    },
    Sample {
        trace_id: "trace-007",
        session_id: "sess-stu901",
        user_id: Some("user-22222"),
        campaign_id: "camp-002",
        content: None,
        term: Some("sneakers"),
        ago_ms: 2 * HOUR_MS,
        duration: 35_000,
        conversion_value: Some(145_000.0),
        device: ("desktop", "Windows", "Edge"),
        landing_path: "/sneakers",
        pages: &["/products", "/products/detail"],
    },
    Sample {
        trace_id: "trace-008",
        session_id: "sess-vwx234",
        user_id: None,
        campaign_id: "camp-006",
        content: Some("kakao-banner-001"),
        term: None,
        ago_ms: 3 * HOUR_MS,
        duration: 6_000,
        conversion_value: None,
        device: ("mobile", "Android", "KakaoTalk"),
        landing_path: "/special-offer",
        pages: &[],
    },
    Sample {
        trace_id: "trace-009",
        session_id: "sess-yza567",
        user_id: Some("user-33333"),
        campaign_id: "camp-003",
        content: Some("story-ad-002"),
        term: None,
        ago_ms: 4 * HOUR_MS,
        duration: 38_000,
        conversion_value: Some(98_000.0),
        device: ("mobile", "iOS", "Instagram"),
        landing_path: "/new-arrivals",
        pages: &["/reviews"],
    },
    Sample {
        trace_id: "trace-010",
        session_id: "sess-bcd890",
        user_id: None,
        campaign_id: "camp-007",
        content: Some("tweet-promo-001"),
        term: None,
        ago_ms: 5 * HOUR_MS,
        duration: 9_000,
        conversion_value: None,
        device: ("desktop", "Windows", "Firefox"),
        landing_path: "/twitter-special",
        pages: &["/products"],
    },
];

fn sample_flows(sample: &Sample, referrer: &str, start_time: i64) -> Vec<ReferrerFlow> {
    let converted = sample.conversion_value.is_some();
    let mut path = vec![site_url(sample.landing_path)];
    path.extend(sample.pages.iter().map(|p| site_url(p)));
    if converted {
        path.push(site_url("/checkout"));
        path.push(site_url("/order-complete"));
    }

    let step = sample.duration as i64 / (path.len() as i64 + 1);
    let mut flows = vec![ReferrerFlow {
        source_url: referrer.to_string(),
        destination_url: path[0].clone(),
        utm_params: None,
        flow_type: FlowType::External,
        timestamp: start_time,
    }];
    for (i, pair) in path.windows(2).enumerate() {
        flows.push(ReferrerFlow {
            source_url: pair[0].clone(),
            destination_url: pair[1].clone(),
            utm_params: None,
            flow_type: FlowType::Internal,
            timestamp: start_time + step * (i as i64 + 1),
        });
    }
    flows
}

/// The ten sample traces, newest campaigns first as listed.
pub fn sample_traces(base_time: i64) -> Vec<TraceRecord> {
    let base_time = clamp_base_time(base_time);
    SAMPLES
        .iter()
        .filter_map(|sample| {
            let template = CAMPAIGNS.iter().find(|c| c.id == sample.campaign_id)?;
            let start_time = base_time - sample.ago_ms;
            let converted = sample.conversion_value.is_some();
            let value = sample.conversion_value.unwrap_or(0.0);

            let mut utm = BTreeMap::new();
            utm.insert("utm_source".to_string(), template.source.to_string());
            utm.insert("utm_medium".to_string(), template.medium.to_string());
            let mut flows = sample_flows(sample, template.referrer, start_time);
            if let Some(first) = flows.first_mut() {
                first.utm_params = Some(utm);
            }

            Some(TraceRecord {
                trace_id: sample.trace_id.to_string(),
                session_id: sample.session_id.to_string(),
                user_id: sample.user_id.map(str::to_string),
                campaign: Campaign {
                    id: template.id.to_string(),
                    name: template.name.to_string(),
                    source: template.source.to_string(),
                    medium: template.medium.to_string(),
                    content: sample.content.map(str::to_string),
                    term: sample.term.map(str::to_string),
                    category: Some(template.category.to_string()),
                    platform: Some(template.platform.to_string()),
                    objective: None,
                    target_audience: None,
                },
                start_time,
                end_time: Some(start_time + sample.duration as i64),
                total_duration: sample.duration,
                events: standard_events(start_time, converted, value, |n| format!("event-{n}")),
                conversion: Conversion {
                    converted,
                    conversion_value: sample.conversion_value,
                    roi: sample.conversion_value.map(trace_roi),
                    conversion_time: converted.then_some(sample.duration),
                },
                device_info: DeviceInfo {
                    device: sample.device.0.to_string(),
                    os: sample.device.1.to_string(),
                    browser: sample.device.2.to_string(),
                },
                referrer: Some(template.referrer.to_string()),
                landing_url: site_url(sample.landing_path),
                referrer_flows: Some(flows),
            })
        })
        .collect()
}
