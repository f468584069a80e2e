//! Portfolio snapshot model
//!
//! Field names follow the dashboard JSON (camelCase). Every field is defaulted
//! and `null` reads as the default, so older or partial snapshots still load.
//! Legacy field names are read into raw structs and merged, the current name winning
//! unless it is zero or empty.

use serde::{Deserialize, Deserializer, Serialize};

pub const FIXED_INCOME: &str = "Fixed Income";
pub const REGIONAL_EQUITIES: &str = "Regional (EAC/SADC) Equities";

pub const GOVERNMENT_SECTOR: &str = "Government";

/// Reads `null` as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// First non-zero of two numbers
fn either_number(first: f64, second: f64) -> f64 {
    if first != 0.0 { first } else { second }
}

/// First non-empty of two strings
fn either_text(first: String, second: String) -> String {
    if !first.is_empty() { first } else { second }
}

/// Number or free text, as used by IPS limits ("≤ 7%", 7.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl Default for MetricValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Full portfolio snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawPortfolioState")]
pub struct PortfolioState {
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_value: Option<f64>,
    pub allocations: Vec<AllocationSnapshot>,
    pub securities: Vec<Security>,
    pub risk_metrics: Vec<RiskMetric>,
    pub liquidity_items: Vec<LiquidityItem>,
    pub tactical_adjustments: Vec<TacticalAdjustment>,
    pub performance_metrics: Vec<PerformanceMetric>,
    pub compliance_checks: Vec<ComplianceCheck>,
}

/// Snapshot as sent, with `liquidity` kept apart from `liquidityItems`
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawPortfolioState {
    #[serde(deserialize_with = "null_as_default")]
    date: String,
    total_value: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    allocations: Vec<AllocationSnapshot>,
    #[serde(deserialize_with = "null_as_default")]
    securities: Vec<Security>,
    #[serde(deserialize_with = "null_as_default")]
    risk_metrics: Vec<RiskMetric>,
    #[serde(deserialize_with = "null_as_default")]
    liquidity_items: Vec<LiquidityItem>,
    #[serde(deserialize_with = "null_as_default")]
    liquidity: Vec<LiquidityItem>,
    #[serde(deserialize_with = "null_as_default")]
    tactical_adjustments: Vec<TacticalAdjustment>,
    #[serde(deserialize_with = "null_as_default")]
    performance_metrics: Vec<PerformanceMetric>,
    #[serde(deserialize_with = "null_as_default")]
    compliance_checks: Vec<ComplianceCheck>,
}

impl From<RawPortfolioState> for PortfolioState {
    fn from(raw: RawPortfolioState) -> Self {
        let liquidity_items = if raw.liquidity_items.is_empty() {
            raw.liquidity
        } else {
            raw.liquidity_items
        };

        Self {
            date: raw.date,
            total_value: raw.total_value,
            allocations: raw.allocations,
            securities: raw.securities,
            risk_metrics: raw.risk_metrics,
            liquidity_items,
            tactical_adjustments: raw.tactical_adjustments,
            performance_metrics: raw.performance_metrics,
            compliance_checks: raw.compliance_checks,
        }
    }
}

/// Target vs current weight of one asset class
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawAllocationSnapshot")]
pub struct AllocationSnapshot {
    pub asset_class: String,
    pub target: f64,
    pub current: f64,
    pub deviation: f64,
    pub rebalancing_required: bool,
    pub notes: String,
}

/// Allocation row as sent; `*Percent` are the legacy names
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawAllocationSnapshot {
    #[serde(deserialize_with = "null_as_default")]
    asset_class: String,
    #[serde(deserialize_with = "null_as_default")]
    target: f64,
    #[serde(deserialize_with = "null_as_default")]
    target_percent: f64,
    #[serde(deserialize_with = "null_as_default")]
    current: f64,
    #[serde(deserialize_with = "null_as_default")]
    current_percent: f64,
    #[serde(deserialize_with = "null_as_default")]
    deviation: f64,
    #[serde(deserialize_with = "null_as_default")]
    deviation_percent: f64,
    #[serde(deserialize_with = "null_as_default")]
    rebalancing_required: bool,
    #[serde(deserialize_with = "null_as_default")]
    notes: String,
}

impl From<RawAllocationSnapshot> for AllocationSnapshot {
    fn from(raw: RawAllocationSnapshot) -> Self {
        Self {
            asset_class: raw.asset_class,
            target: either_number(raw.target, raw.target_percent),
            current: either_number(raw.current, raw.current_percent),
            deviation: either_number(raw.deviation, raw.deviation_percent),
            rebalancing_required: raw.rebalancing_required,
            notes: raw.notes,
        }
    }
}

/// One holding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Security {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ticker: String,
    #[serde(deserialize_with = "null_as_default")]
    pub asset_class: String,
    /// Percentage of the portfolio
    #[serde(deserialize_with = "null_as_default")]
    pub current_weight: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub target_weight: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub deviation: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub sector: String,
    #[serde(deserialize_with = "null_as_default")]
    pub geographic_exposure: String,
    /// TZS
    #[serde(deserialize_with = "null_as_default")]
    pub market_value: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub quantity: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub purchase_price: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub current_price: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ips_compliant: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawRiskMetric")]
pub struct RiskMetric {
    pub metric: String,
    pub ips_limit: MetricValue,
    pub current_value: MetricValue,
    pub status: String,
    pub action_required: String,
}

/// Risk row as sent; the dashboard writes `metricName`, older files `metric`
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawRiskMetric {
    #[serde(deserialize_with = "null_as_default")]
    metric_name: String,
    #[serde(deserialize_with = "null_as_default")]
    metric: String,
    #[serde(deserialize_with = "null_as_default")]
    ips_limit: MetricValue,
    #[serde(deserialize_with = "null_as_default")]
    current_value: MetricValue,
    #[serde(deserialize_with = "null_as_default")]
    status: String,
    #[serde(deserialize_with = "null_as_default")]
    action_required: String,
}

impl From<RawRiskMetric> for RiskMetric {
    fn from(raw: RawRiskMetric) -> Self {
        Self {
            metric: either_text(raw.metric_name, raw.metric),
            ips_limit: raw.ips_limit,
            current_value: raw.current_value,
            status: raw.status,
            action_required: raw.action_required,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiquidityItem {
    #[serde(deserialize_with = "null_as_default")]
    pub item: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub current: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub action_needed: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TacticalAdjustment {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tactical_move: String,
    #[serde(deserialize_with = "null_as_default")]
    pub deviation_percent: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub market_signal: String,
    #[serde(deserialize_with = "null_as_default")]
    pub duration: String,
    /// IC / PM initials
    #[serde(deserialize_with = "null_as_default")]
    pub approved_by: String,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceMetric {
    #[serde(deserialize_with = "null_as_default")]
    pub metric: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target: MetricValue,
    #[serde(deserialize_with = "null_as_default")]
    pub current: MetricValue,
    #[serde(deserialize_with = "null_as_default")]
    pub deviation: MetricValue,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplianceCheck {
    #[serde(deserialize_with = "null_as_default")]
    pub area: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ips_limit: String,
    #[serde(deserialize_with = "null_as_default")]
    pub current_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub breach: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub action_required: String,
}

// ============ API bodies ============

/// Save acknowledgement
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
    pub data: SaveReceipt,
}

#[derive(Debug, Serialize)]
pub struct SaveReceipt {
    pub date: String,
    pub timestamp: String,
}

/// GET /portfolio body
#[derive(Debug, Serialize)]
pub struct RetrieveResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(rename = "savedAt", skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct PortfolioErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
