use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::optimizer::audit::{all_satisfied, audit_constraints, ConstraintCheck};
use crate::optimizer::SolveReport;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelBreakdown {
    pub channel: String,
    pub budget: f64,
    pub share: f64,
    pub clicks: f64,
    pub revenue: f64,
    pub roas: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductBreakdown {
    pub product: String,
    pub conversions: f64,
    pub revenue: f64,
    pub revenue_by_channel: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportTotals {
    pub revenue: f64,
    pub ad_spend: f64,
    pub clicks: f64,
    pub roas: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationReport {
    pub solved_at: DateTime<Utc>,
    pub input_hash: String,
    pub backend: String,
    pub channels: Vec<ChannelBreakdown>,
    pub products: Vec<ProductBreakdown>,
    pub totals: ReportTotals,
    pub constraints: Vec<ConstraintCheck>,
}

/// Display names for channels and products; only the output layer reads these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportLabels {
    pub channels: Vec<String>,
    pub products: Vec<String>,
}

impl ReportLabels {
    pub fn resolve(
        configured_channels: &[String],
        configured_products: &[String],
        solved: &SolveReport,
    ) -> Self {
        let dims = solved.diagnostics.dims;
        Self {
            channels: resolve_names(configured_channels, dims.channels, "Channel"),
            products: resolve_names(configured_products, dims.products, "Product"),
        }
    }
}

fn resolve_names(configured: &[String], count: usize, prefix: &str) -> Vec<String> {
    if configured.len() == count {
        return configured.to_vec();
    }
    if !configured.is_empty() {
        warn!(
            configured = configured.len(),
            expected = count,
            "{} label count does not match input, using generated names",
            prefix.to_ascii_lowercase()
        );
    }
    (1..=count).map(|n| format!("{prefix} {n}")).collect()
}

/// Breaks a solved allocation down by channel and product. `None` when the
/// solve found no allocation.
pub fn build_report(
    solved: &SolveReport,
    labels: &ReportLabels,
    tolerance: f64,
) -> Option<AllocationReport> {
    let allocations = solved.result.allocations()?;
    let input = &solved.input;
    let dims = solved.diagnostics.dims;

    let clicks: Vec<f64> = allocations
        .iter()
        .zip(&input.cost_per_click)
        .map(|(budget, cpc)| budget / cpc)
        .collect();

    let products: Vec<ProductBreakdown> = (0..dims.products)
        .map(|p| {
            let revenue_by_channel: Vec<f64> = (0..dims.channels)
                .map(|i| input.avg_ticket_size[p][i] * input.conversion_rates[p][i] * clicks[i])
                .collect();
            let conversions = (0..dims.channels)
                .map(|i| input.conversion_rates[p][i] * clicks[i])
                .sum();
            ProductBreakdown {
                product: labels.products[p].clone(),
                conversions,
                revenue: revenue_by_channel.iter().sum(),
                revenue_by_channel,
            }
        })
        .collect();

    let ad_spend: f64 = allocations.iter().sum();
    let channels = (0..dims.channels)
        .map(|i| {
            let revenue: f64 = products.iter().map(|p| p.revenue_by_channel[i]).sum();
            ChannelBreakdown {
                channel: labels.channels[i].clone(),
                budget: allocations[i],
                share: ratio(allocations[i], ad_spend).unwrap_or(0.0),
                clicks: clicks[i],
                revenue,
                roas: ratio(revenue, allocations[i]),
            }
        })
        .collect();

    let constraints = audit_constraints(&solved.program, allocations, tolerance);
    if !all_satisfied(&constraints) {
        warn!(tolerance, "solver allocation violates a constraint beyond tolerance");
    }

    let revenue: f64 = products.iter().map(|p| p.revenue).sum();
    Some(AllocationReport {
        solved_at: Utc::now(),
        input_hash: input.canonical_hash(),
        backend: solved.diagnostics.backend.clone(),
        channels,
        products,
        totals: ReportTotals {
            revenue,
            ad_spend,
            clicks: clicks.iter().sum(),
            roas: ratio(revenue, ad_spend),
        },
        constraints,
    })
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{build_report, ReportLabels};
    use crate::model::input::OptimizationInput;
    use crate::optimizer::audit::all_satisfied;
    use crate::optimizer::BudgetOptimizer;

    #[test]
    fn breaks_down_reference_allocation() {
        let solved = BudgetOptimizer::with_defaults()
            .solve_detailed(&OptimizationInput::reference())
            .expect("solve");
        let labels = ReportLabels::resolve(
            &[],
            &[
                "Clothing".to_string(),
                "Beauty".to_string(),
                "Home Decor".to_string(),
            ],
            &solved,
        );
        let report = build_report(&solved, &labels, 1e-6).expect("solved report");
        let objective = solved.result.objective_value().expect("objective");

        assert_eq!(report.channels.len(), 3);
        assert_eq!(report.channels[0].channel, "Channel 1");
        assert_eq!(report.products[2].product, "Home Decor");
        assert!((report.totals.revenue - objective).abs() < 1e-6 * objective);
        assert!(report.totals.ad_spend <= 10_000.0 + 1e-2);
        assert!(report.totals.clicks >= 7_000.0 - 1e-2);

        let channel_revenue: f64 = report.channels.iter().map(|c| c.revenue).sum();
        assert!((channel_revenue - report.totals.revenue).abs() < 1e-6 * objective);
        let share: f64 = report.channels.iter().map(|c| c.share).sum();
        assert!((share - 1.0).abs() < 1e-9);
        for channel in &report.channels {
            let roas = channel.roas.expect("every channel has spend");
            assert!((roas * channel.budget - channel.revenue).abs() < 1e-6 * objective);
        }

        assert_eq!(report.constraints.len(), 9);
        assert!(all_satisfied(&report.constraints));
        assert_eq!(report.input_hash.len(), 64);
    }

    #[test]
    fn no_report_without_solution() {
        let input = OptimizationInput {
            min_budget_percent: 0.5,
            ..OptimizationInput::reference()
        };
        let solved = BudgetOptimizer::with_defaults()
            .solve_detailed(&input)
            .expect("solve");
        let labels = ReportLabels::resolve(&[], &[], &solved);
        assert!(build_report(&solved, &labels, 1e-6).is_none());
    }

    #[test]
    fn mismatched_labels_fall_back_to_generated_names() {
        let solved = BudgetOptimizer::with_defaults()
            .solve_detailed(&OptimizationInput::reference())
            .expect("solve");
        let labels = ReportLabels::resolve(&["Search".to_string()], &[], &solved);
        assert_eq!(
            labels.channels,
            vec!["Channel 1", "Channel 2", "Channel 3"]
        );
        assert_eq!(labels.products[0], "Product 1");
    }
}
