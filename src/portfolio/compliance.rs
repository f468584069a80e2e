//! IPS compliance checks over a portfolio snapshot
//!
//! Snapshots hold a few dozen rows at most, so every check is a linear scan.

use serde::Serialize;

use super::types::{
    AllocationSnapshot, FIXED_INCOME, GOVERNMENT_SECTOR, PortfolioState, REGIONAL_EQUITIES,
    Security,
};

/// Allocation drift (percentage points) beyond which rebalancing is required
pub const REBALANCING_THRESHOLD: f64 = 3.0;
/// Max weight of a single security
pub const SINGLE_SECURITY_LIMIT: f64 = 10.0;
/// Max weight of a single Government Fixed Income security
pub const GOVT_SINGLE_SECURITY_LIMIT: f64 = 50.0;
/// Max weight of a single sector
pub const SECTOR_LIMIT: f64 = 25.0;
/// Max combined weight of Regional (EAC/SADC) equities
pub const REGIONAL_LIMIT: f64 = 10.0;

/// Deviation in percentage points
pub fn calculate_deviation(target: f64, current: f64) -> f64 {
    current - target
}

/// Deviation relative to target, in percent; 0 when target is 0
pub fn calculate_percentage_deviation(target: f64, current: f64) -> f64 {
    if target == 0.0 {
        return 0.0;
    }
    (current - target) / target * 100.0
}

pub fn needs_rebalancing(deviation: f64) -> bool {
    deviation.abs() > REBALANCING_THRESHOLD
}

/// True when no allocation is flagged for rebalancing
pub fn check_allocation_compliance(allocations: &[AllocationSnapshot]) -> bool {
    allocations.iter().all(|a| !a.rebalancing_required)
}

pub fn calculate_total_weight(securities: &[Security]) -> f64 {
    securities.iter().map(|s| s.current_weight).sum()
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityCompliance {
    pub is_compliant: bool,
    pub breaches: Vec<String>,
}

/// Check single-security, sector and regional limits
pub fn check_security_compliance(securities: &[Security]) -> SecurityCompliance {
    let mut breaches = Vec::new();

    let oversized: Vec<String> = securities
        .iter()
        .filter(|s| {
            let govt_fixed_income = s.sector == GOVERNMENT_SECTOR && s.asset_class == FIXED_INCOME;
            let limit = if govt_fixed_income {
                GOVT_SINGLE_SECURITY_LIMIT
            } else {
                SINGLE_SECURITY_LIMIT
            };
            s.current_weight > limit
        })
        .map(|s| format!("{} ({})", s.ticker, format_percentage(s.current_weight)))
        .collect();
    if !oversized.is_empty() {
        breaches.push(format!("Single security limit breached: {}", oversized.join(", ")));
    }

    // first-seen order
    let mut sector_weights: Vec<(&str, f64)> = Vec::new();
    for s in securities {
        match sector_weights.iter().position(|(sector, _)| *sector == s.sector) {
            Some(i) => sector_weights[i].1 += s.current_weight,
            None => sector_weights.push((s.sector.as_str(), s.current_weight)),
        }
    }
    let oversized_sectors: Vec<String> = sector_weights
        .iter()
        .filter(|(_, weight)| *weight > SECTOR_LIMIT)
        .map(|(sector, weight)| format!("{} ({})", sector, format_percentage(*weight)))
        .collect();
    if !oversized_sectors.is_empty() {
        breaches.push(format!("Sector limit breached: {}", oversized_sectors.join(", ")));
    }

    let regional: f64 = securities
        .iter()
        .filter(|s| s.asset_class == REGIONAL_EQUITIES)
        .map(|s| s.current_weight)
        .sum();
    if regional > REGIONAL_LIMIT {
        breaches.push(format!(
            "Regional allocation limit breached: {} ({})",
            REGIONAL_EQUITIES,
            format_percentage(regional)
        ));
    }

    SecurityCompliance {
        is_compliant: breaches.is_empty(),
        breaches,
    }
}

/// Recomputed drift for one asset class
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationDrift {
    pub asset_class: String,
    pub target: f64,
    pub current: f64,
    pub deviation: f64,
    pub relative_deviation: f64,
    pub needs_rebalancing: bool,
}

/// Compliance summary returned by `GET /api/portfolio/compliance`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub date: String,
    pub allocations_compliant: bool,
    pub allocations: Vec<AllocationDrift>,
    pub securities: SecurityCompliance,
    pub total_weight: f64,
}

impl ComplianceReport {
    pub fn from_state(state: &PortfolioState) -> Self {
        let allocations = state
            .allocations
            .iter()
            .map(|a| {
                let deviation = calculate_deviation(a.target, a.current);
                AllocationDrift {
                    asset_class: a.asset_class.clone(),
                    target: a.target,
                    current: a.current,
                    deviation,
                    relative_deviation: calculate_percentage_deviation(a.target, a.current),
                    needs_rebalancing: needs_rebalancing(deviation),
                }
            })
            .collect();

        Self {
            date: state.date.clone(),
            allocations_compliant: check_allocation_compliance(&state.allocations),
            allocations,
            securities: check_security_compliance(&state.securities),
            total_weight: calculate_total_weight(&state.securities),
        }
    }
}
