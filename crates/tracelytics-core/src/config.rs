/// Cost charged per click when no billing data is available.
pub const DEFAULT_COST_PER_CLICK: f64 = 2000.0;
pub const DEFAULT_TOP_CAMPAIGNS: usize = 5;
pub const DEFAULT_COLUMN_WIDTH: f64 = 300.0;
pub const DEFAULT_ROW_HEIGHT: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct Config {
    /// Flat per-click cost. Placeholder until ad-platform billing data is wired in.
    pub cost_per_click: f64,
    pub top_campaigns: usize,
    pub recent_traces: usize,
    pub mock_seed: u64,
    pub mock_traces: usize,
    pub layout_column_width: f64,
    pub layout_row_height: f64,
}

/// Settings consumed by the aggregation engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationConfig {
    pub cost_per_click: f64,
    pub top_campaigns: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            cost_per_click: DEFAULT_COST_PER_CLICK,
            top_campaigns: DEFAULT_TOP_CAMPAIGNS,
        }
    }
}

/// Column and row spacing of the flow graph layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub column_width: f64,
    pub row_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_width: DEFAULT_COLUMN_WIDTH,
            row_height: DEFAULT_ROW_HEIGHT,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cost_per_click: DEFAULT_COST_PER_CLICK,
            top_campaigns: DEFAULT_TOP_CAMPAIGNS,
            recent_traces: 5,
            mock_seed: 42,
            mock_traces: 40,
            layout_column_width: DEFAULT_COLUMN_WIDTH,
            layout_row_height: DEFAULT_ROW_HEIGHT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cost_per_click: f64 = match lookup("TRACELYTICS_COST_PER_CLICK") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| format!("invalid cost per click: {e}"))?,
            None => defaults.cost_per_click,
        };
        if !cost_per_click.is_finite() || cost_per_click < 0.0 {
            return Err("TRACELYTICS_COST_PER_CLICK must be a non-negative number".to_string());
        }

        let layout_column_width =
            positive_f64(&lookup, "TRACELYTICS_LAYOUT_COLUMN_WIDTH", defaults.layout_column_width)?;
        let layout_row_height =
            positive_f64(&lookup, "TRACELYTICS_LAYOUT_ROW_HEIGHT", defaults.layout_row_height)?;

        Ok(Self {
            cost_per_click,
            top_campaigns: lookup("TRACELYTICS_TOP_CAMPAIGNS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.top_campaigns),
            recent_traces: lookup("TRACELYTICS_RECENT_TRACES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.recent_traces),
            mock_seed: lookup("TRACELYTICS_MOCK_SEED")
                .unwrap_or_else(|| defaults.mock_seed.to_string())
                .trim()
                .parse()
                .map_err(|e| format!("invalid mock seed: {e}"))?,
            mock_traces: lookup("TRACELYTICS_MOCK_TRACES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.mock_traces),
            layout_column_width,
            layout_row_height,
        })
    }

    pub fn aggregation(&self) -> AggregationConfig {
        AggregationConfig {
            cost_per_click: self.cost_per_click,
            top_campaigns: self.top_campaigns,
        }
    }

    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            column_width: self.layout_column_width,
            row_height: self.layout_row_height,
        }
    }
}

fn positive_f64<F>(lookup: &F, key: &str, default: f64) -> Result<f64, String>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("invalid {key}: {e}"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("{key} must be a positive number"));
    }
    Ok(value)
}
