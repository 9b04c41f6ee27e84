use std::collections::HashSet;

use proptest::prelude::*;
use tracelytics_core::aggregate::{compute_campaign_stats, compute_marketing_metrics};
use tracelytics_core::config::{AggregationConfig, LayoutConfig};
use tracelytics_core::flow::build_flow_graph;
use tracelytics_core::trace::{
    Campaign, Conversion, DeviceInfo, FlowType, ReferrerFlow, TraceRecord,
};

fn arb_flow_type() -> impl Strategy<Value = FlowType> {
    prop_oneof![
        Just(FlowType::External),
        Just(FlowType::Internal),
        Just(FlowType::Direct),
    ]
}

fn arb_flow() -> impl Strategy<Value = ReferrerFlow> {
    // A small URL alphabet so edges and nodes collide across traces.
    let url = prop::sample::select(vec!["/", "/a", "/b", "/cart", "/checkout", "ext"]);
    (url.clone(), url, arb_flow_type()).prop_map(|(source, destination, flow_type)| {
        ReferrerFlow {
            source_url: source.to_string(),
            destination_url: destination.to_string(),
            utm_params: None,
            flow_type,
            timestamp: 0,
        }
    })
}

prop_compose! {
    fn arb_trace()(
        n in 0u32..1000,
        campaign_id in prop::sample::select(vec!["", "camp-001", "camp-002", "camp-003"]),
        converted in any::<bool>(),
        value in prop::option::of(0.0f64..500_000.0),
        conversion_time in prop::option::of(0u64..600_000),
        duration in 0u64..3_600_000,
        flows in prop::option::of(prop::collection::vec(arb_flow(), 0..5)),
    ) -> TraceRecord {
        TraceRecord {
            trace_id: format!("trace-{n}"),
            session_id: format!("sess-{n}"),
            user_id: None,
            campaign: Campaign {
                id: campaign_id.to_string(),
                name: format!("Campaign {campaign_id}"),
                source: "google".to_string(),
                medium: "cpc".to_string(),
                content: None,
                term: None,
                category: None,
                platform: None,
                objective: None,
                target_audience: None,
            },
            start_time: 1_700_000_000_000,
            end_time: None,
            total_duration: duration,
            events: Vec::new(),
            conversion: Conversion {
                converted,
                conversion_value: value,
                roi: None,
                conversion_time,
            },
            device_info: DeviceInfo {
                device: "desktop".to_string(),
                os: "Linux".to_string(),
                browser: "Firefox".to_string(),
            },
            referrer: None,
            landing_url: "https://example.com/".to_string(),
            referrer_flows: flows,
        }
    }
}

fn arb_config() -> impl Strategy<Value = AggregationConfig> {
    (prop_oneof![Just(0.0), 0.0f64..10_000.0], 0usize..8).prop_map(
        |(cost_per_click, top_campaigns)| AggregationConfig {
            cost_per_click,
            top_campaigns,
        },
    )
}

proptest! {
    #[test]
    fn one_entry_per_campaign_and_clicks_sum(
        traces in prop::collection::vec(arb_trace(), 0..40),
        config in arb_config(),
    ) {
        let stats = compute_campaign_stats(&traces, &config);
        let distinct: HashSet<&str> = traces.iter().map(|t| t.campaign.id.as_str()).collect();
        prop_assert_eq!(stats.len(), distinct.len());
        for id in &distinct {
            prop_assert!(stats.get(id).is_some());
        }
        let clicks: u64 = stats.iter().map(|s| s.clicks).sum();
        prop_assert_eq!(clicks, traces.len() as u64);
    }

    #[test]
    fn all_derived_numbers_are_finite(
        traces in prop::collection::vec(arb_trace(), 0..40),
        config in arb_config(),
    ) {
        let stats = compute_campaign_stats(&traces, &config);
        for s in &stats {
            prop_assert!(s.conversion_rate.is_finite());
            prop_assert!(s.revenue.is_finite());
            prop_assert!(s.cost.is_finite());
            prop_assert!(s.roi.is_finite());
            prop_assert!(s.average_session_duration.is_finite());
        }

        let metrics = compute_marketing_metrics(&traces, &stats, &config);
        prop_assert!(metrics.total_revenue.is_finite());
        prop_assert!(metrics.total_cost.is_finite());
        prop_assert!(metrics.overall_roi.is_finite());
        prop_assert!(metrics.average_conversion_rate.is_finite());
        prop_assert!(metrics.average_conversion_time.is_finite());
        prop_assert!(metrics.top_campaigns.len() <= config.top_campaigns);
    }

    #[test]
    fn roi_sign_matches_profit(
        traces in prop::collection::vec(arb_trace(), 1..40),
        cost_per_click in 1.0f64..10_000.0,
    ) {
        let config = AggregationConfig { cost_per_click, top_campaigns: 5 };
        for s in &compute_campaign_stats(&traces, &config) {
            if s.revenue > s.cost {
                prop_assert!(s.roi > 0.0);
            } else if s.revenue < s.cost {
                prop_assert!(s.roi < 0.0);
            } else {
                prop_assert_eq!(s.roi, 0.0);
            }
        }
    }

    #[test]
    fn top_campaigns_are_roi_descending(
        traces in prop::collection::vec(arb_trace(), 0..40),
        config in arb_config(),
    ) {
        let stats = compute_campaign_stats(&traces, &config);
        let metrics = compute_marketing_metrics(&traces, &stats, &config);
        for pair in metrics.top_campaigns.windows(2) {
            prop_assert!(pair[0].roi >= pair[1].roi);
        }
    }

    #[test]
    fn flow_graph_is_deterministic_and_deduplicated(
        traces in prop::collection::vec(arb_trace(), 0..20),
    ) {
        let layout = LayoutConfig::default();
        let first = build_flow_graph(&traces, &layout);
        let second = build_flow_graph(&traces, &layout);
        prop_assert_eq!(&first, &second);

        let urls: HashSet<&str> = first.nodes.iter().map(|n| n.url.as_str()).collect();
        prop_assert_eq!(urls.len(), first.nodes.len());
        let pairs: HashSet<(&str, &str)> = first
            .edges
            .iter()
            .map(|e| (e.source_url.as_str(), e.target_url.as_str()))
            .collect();
        prop_assert_eq!(pairs.len(), first.edges.len());

        // Each flow adds two node occurrences and one edge occurrence.
        let flows: u64 = traces.iter().map(|t| t.flows().len() as u64).sum();
        let node_total: u64 = first.nodes.iter().map(|n| n.count).sum();
        let edge_total: u64 = first.edges.iter().map(|e| e.count).sum();
        prop_assert_eq!(node_total, flows * 2);
        prop_assert_eq!(edge_total, flows);

        for node in &first.nodes {
            prop_assert_eq!(node.layer, node.kind.layer());
            prop_assert_eq!(node.position.x, f64::from(node.layer) * layout.column_width);
        }
    }
}
