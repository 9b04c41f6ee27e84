//! Seeded synthetic trace generation.
//!
//! The same seed always yields the same traces for a given `base_time`, which
//! keeps dashboards and test fixtures reproducible.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::json;
use sha2::{Digest, Sha256};

use tracelytics_core::trace::{
    Campaign, Conversion, DeviceInfo, EventStatus, EventType, FlowType, ReferrerFlow, TraceEvent,
    TraceRecord,
};

const DAY_MS: i64 = 86_400_000;
const SITE: &str = "https://example.com";
/// Spend attributed to one converted trace when deriving its per-trace ROI.
const ATTRIBUTED_SPEND: f64 = 20_000.0;

/// Campaign catalogue the generator draws from.
pub(crate) struct CampaignTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub source: &'static str,
    pub medium: &'static str,
    pub platform: &'static str,
    pub category: &'static str,
    pub referrer: &'static str,
    pub landing_path: &'static str,
    pub conversion_rate: f64,
}

pub(crate) const CAMPAIGNS: &[CampaignTemplate] = &[
    CampaignTemplate {
        id: "camp-001",
        name: "Summer New Arrivals Promotion",
        source: "facebook",
        medium: "cpc",
        platform: "Facebook Ads",
        category: "Season promotion",
        referrer: "https://www.facebook.com",
        landing_path: "/summer-collection",
        conversion_rate: 0.45,
    },
    CampaignTemplate {
        id: "camp-002",
        name: "Google Search Ads",
        source: "google",
        medium: "cpc",
        platform: "Google Ads",
        category: "Search ads",
        referrer: "https://www.google.com",
        landing_path: "/sneakers",
        conversion_rate: 0.35,
    },
    CampaignTemplate {
        id: "camp-003",
        name: "Instagram Story Ads",
        source: "instagram",
        medium: "cpm",
        platform: "Instagram Ads",
        category: "New product launch",
        referrer: "https://www.instagram.com",
        landing_path: "/premium-collection",
        conversion_rate: 0.4,
    },
    CampaignTemplate {
        id: "camp-004",
        name: "Naver Shopping Ads",
        source: "naver",
        medium: "cpc",
        platform: "Naver Shopping",
        category: "Shopping ads",
        referrer: "https://shopping.naver.com",
        landing_path: "/backpacks",
        conversion_rate: 0.25,
    },
    CampaignTemplate {
        id: "camp-005",
        name: "YouTube Video Ads",
        source: "youtube",
        medium: "video",
        platform: "YouTube Ads",
        category: "Video ads",
        referrer: "https://www.youtube.com",
        landing_path: "/video-promo",
        conversion_rate: 0.15,
    },
    CampaignTemplate {
        id: "camp-006",
        name: "KakaoTalk Ads",
        source: "kakao",
        medium: "display",
        platform: "Kakao Ads",
        category: "Display ads",
        referrer: "https://www.kakaocorp.com",
        landing_path: "/special-offer",
        conversion_rate: 0.2,
    },
    CampaignTemplate {
        id: "camp-007",
        name: "Twitter Promotion",
        source: "twitter",
        medium: "cpc",
        platform: "Twitter Ads",
        category: "Social ads",
        referrer: "https://twitter.com",
        landing_path: "/twitter-special",
        conversion_rate: 0.1,
    },
];

const DEVICES: &[(&str, &str, &str)] = &[
    ("mobile", "iOS", "Safari"),
    ("mobile", "Android", "Chrome"),
    ("mobile", "Android", "Samsung Internet"),
    ("desktop", "Windows", "Chrome"),
    ("desktop", "Windows", "Edge"),
    ("desktop", "macOS", "Safari"),
    ("tablet", "iPadOS", "Safari"),
];

const BROWSE_PAGES: &[&str] = &["/products", "/products/detail", "/reviews", "/cart"];

/// Accepted `base_time` bounds. Traces reach back one week and forward at most
/// a minute, so anything inside these bounds cannot overflow.
const MIN_BASE_TIME: i64 = i64::MIN + 8 * DAY_MS;
const MAX_BASE_TIME: i64 = i64::MAX - DAY_MS;

/// `base_time` clamped to the range the generators can offset safely.
pub(crate) fn clamp_base_time(base_time: i64) -> i64 {
    base_time.clamp(MIN_BASE_TIME, MAX_BASE_TIME)
}

pub(crate) fn site_url(path: &str) -> String {
    format!("{SITE}{path}")
}

/// The click → landing → view sequence every trace starts with, followed by
/// signup and purchase when the trace converted.
pub(crate) fn standard_events<F>(
    start_time: i64,
    converted: bool,
    purchase_value: f64,
    mut next_id: F,
) -> Vec<TraceEvent>
where
    F: FnMut(usize) -> String,
{
    let mut event = |n: usize,
                     offset: i64,
                     event_type: EventType,
                     duration: u64,
                     metadata: BTreeMap<String, serde_json::Value>| {
        TraceEvent {
            id: next_id(n),
            timestamp: start_time + offset,
            event_type,
            duration: Some(duration),
            metadata,
            status: EventStatus::Success,
        }
    };
    let meta = |value: serde_json::Value| -> BTreeMap<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        }
    };

    let mut events = vec![
        event(
            1,
            0,
            EventType::Click,
            150,
            meta(json!({ "clickPosition": { "x": 320, "y": 480 }, "adFormat": "display" })),
        ),
        event(
            2,
            200,
            EventType::Landing,
            1200,
            meta(json!({ "pageLoadTime": 1200, "firstContentfulPaint": 800 })),
        ),
        event(
            3,
            5000,
            EventType::View,
            3000,
            meta(json!({ "scrollDepth": 45, "timeOnPage": 3000 })),
        ),
    ];

    if converted {
        events.push(event(
            4,
            15_000,
            EventType::Signup,
            2500,
            meta(json!({ "formFillTime": 2500, "fieldInteractions": 8 })),
        ));
        events.push(event(
            5,
            25_000,
            EventType::Purchase,
            3200,
            meta(json!({
                "itemsInCart": 2,
                "paymentMethod": "card",
                "purchaseValue": purchase_value,
            })),
        ));
    }
    events
}

/// Per-trace ROI shown on trace detail views.
pub(crate) fn trace_roi(conversion_value: f64) -> f64 {
    (conversion_value / ATTRIBUTED_SPEND * 100.0).round()
}

/// Deterministic synthetic trace generator.
pub struct TraceGenerator {
    seed: u64,
    rng: StdRng,
    next_index: u64,
}

impl TraceGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            next_index: 0,
        }
    }

    /// Stable id derived from the seed and the running index.
    fn derive_id(&self, prefix: &str, index: u64) -> String {
        let hash = Sha256::digest(format!("{}:{}:{}", prefix, self.seed, index).as_bytes());
        // First 6 bytes → 12 hex characters.
        format!("{}-{}", prefix, hex::encode(&hash[..6]))
    }

    fn event_id(rng: &mut StdRng) -> String {
        uuid::Builder::from_random_bytes(rng.gen())
            .into_uuid()
            .to_string()
    }

    /// Produces `count` traces started within the week before `base_time`
    /// (epoch millis), newest first. `base_time` within a day of the `i64`
    /// limits is clamped.
    pub fn generate(&mut self, count: usize, base_time: i64) -> Vec<TraceRecord> {
        let base_time = clamp_base_time(base_time);
        let mut traces: Vec<TraceRecord> =
            (0..count).map(|_| self.next_trace(base_time)).collect();
        traces.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        tracing::debug!(seed = self.seed, count, "generated mock traces");
        traces
    }

    fn next_trace(&mut self, base_time: i64) -> TraceRecord {
        let index = self.next_index;
        self.next_index += 1;

        let template = &CAMPAIGNS[self.rng.gen_range(0..CAMPAIGNS.len())];
        let start_time = base_time - self.rng.gen_range(0..7 * DAY_MS);
        let converted = self.rng.gen_bool(template.conversion_rate);
        let duration: u64 = if converted {
            self.rng.gen_range(26_000..60_000)
        } else {
            self.rng.gen_range(3_000..15_000)
        };
        let conversion_value = if converted {
            f64::from(self.rng.gen_range(30u32..200)) * 1000.0
        } else {
            0.0
        };
        let (device, os, browser) = *DEVICES
            .choose(&mut self.rng)
            .unwrap_or(&("desktop", "Windows", "Chrome"));
        let user_id = if self.rng.gen_bool(0.5) {
            Some(format!("user-{:05}", self.rng.gen_range(10_000..100_000)))
        } else {
            None
        };

        let rng = &mut self.rng;
        let events = standard_events(start_time, converted, conversion_value, |_| {
            Self::event_id(rng)
        });
        let referrer_flows = self.flows(template, start_time, duration, converted);

        TraceRecord {
            trace_id: self.derive_id("trace", index),
            session_id: self.derive_id("sess", index),
            user_id,
            campaign: Campaign {
                id: template.id.to_string(),
                name: template.name.to_string(),
                source: template.source.to_string(),
                medium: template.medium.to_string(),
                content: None,
                term: None,
                category: Some(template.category.to_string()),
                platform: Some(template.platform.to_string()),
                objective: Some(if converted { "conversion" } else { "traffic" }.to_string()),
                target_audience: None,
            },
            start_time,
            end_time: Some(start_time + duration as i64),
            total_duration: duration,
            events,
            conversion: if converted {
                Conversion {
                    converted: true,
                    conversion_value: Some(conversion_value),
                    roi: Some(trace_roi(conversion_value)),
                    conversion_time: Some(duration),
                }
            } else {
                Conversion::default()
            },
            device_info: DeviceInfo {
                device: device.to_string(),
                os: os.to_string(),
                browser: browser.to_string(),
            },
            referrer: Some(template.referrer.to_string()),
            landing_url: site_url(template.landing_path),
            referrer_flows,
        }
    }

    /// Navigation chain from the ad referrer through a few site pages.
    /// Roughly one trace in ten carries no flow data; some start from a
    /// direct visit instead of the referrer.
    fn flows(
        &mut self,
        template: &CampaignTemplate,
        start_time: i64,
        duration: u64,
        converted: bool,
    ) -> Option<Vec<ReferrerFlow>> {
        if self.rng.gen_bool(0.1) {
            return None;
        }

        let landing = site_url(template.landing_path);
        let mut path = vec![landing.clone()];
        let browse = self.rng.gen_range(0..=2);
        path.extend(
            BROWSE_PAGES
                .choose_multiple(&mut self.rng, browse)
                .map(|p| site_url(p)),
        );
        if converted {
            path.push(site_url("/checkout"));
            path.push(site_url("/order-complete"));
        }

        let direct = self.rng.gen_bool(0.15);
        let mut flows = Vec::with_capacity(path.len());
        let step = duration as i64 / (path.len() as i64 + 1);
        if direct {
            if path.len() == 1 {
                // A direct visit that bounced still needs one hop to show.
                path.push(site_url("/"));
            }
        } else {
            let mut utm = BTreeMap::new();
            utm.insert("utm_source".to_string(), template.source.to_string());
            utm.insert("utm_medium".to_string(), template.medium.to_string());
            utm.insert("utm_campaign".to_string(), template.id.to_string());
            flows.push(ReferrerFlow {
                source_url: template.referrer.to_string(),
                destination_url: landing,
                utm_params: Some(utm),
                flow_type: FlowType::External,
                timestamp: start_time,
            });
        }

        for (i, pair) in path.windows(2).enumerate() {
            flows.push(ReferrerFlow {
                source_url: pair[0].clone(),
                destination_url: pair[1].clone(),
                utm_params: None,
                flow_type: if direct && i == 0 {
                    FlowType::Direct
                } else {
                    FlowType::Internal
                },
                timestamp: start_time + step * (i as i64 + 1),
            });
        }
        Some(flows)
    }
}
