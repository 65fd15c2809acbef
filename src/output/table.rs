use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::optimizer::audit::{binding_names, ConstraintCheck};
use crate::optimizer::report::AllocationReport;
use crate::optimizer::{OptimizationResult, SolveDiagnostics, WhatIfResult};
use crate::output::fixed;

pub const NO_SOLUTION: &str = "No solution found.";

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| fixed(v, precision))
        .unwrap_or_else(|| "-".to_string())
}

pub fn render_result_table(
    result: &OptimizationResult,
    channels: &[String],
    precision: usize,
) -> String {
    let OptimizationResult::Solved {
        allocations,
        objective_value,
    } = result
    else {
        return NO_SOLUTION.to_string();
    };

    let mut table = new_table();
    table.set_header(vec!["Channel", "Budget"]);
    for (name, budget) in channels.iter().zip(allocations) {
        table.add_row(vec![name.clone(), fixed(*budget, precision)]);
    }
    format!(
        "{table}\nTotal revenue: {}",
        fixed(*objective_value, precision)
    )
}

pub fn render_diagnostics_table(diagnostics: &SolveDiagnostics) -> String {
    let mut table = new_table();
    table.set_header(vec!["Backend", "Status", "Products x Channels", "Constraints"]);
    let status_cell = if diagnostics.status == "optimal" {
        Cell::new(&diagnostics.status).fg(Color::Green)
    } else {
        Cell::new(&diagnostics.status).fg(Color::Red)
    };
    table.add_row(Row::from(vec![
        Cell::new(&diagnostics.backend),
        status_cell,
        Cell::new(format!(
            "{} x {}",
            diagnostics.dims.products, diagnostics.dims.channels
        )),
        Cell::new(diagnostics.constraint_count.to_string()),
    ]));

    let mut out = table.to_string();
    if let Some(reason) = &diagnostics.reason {
        out.push_str(&format!("\nSolver reason: {reason}"));
    }
    if diagnostics.floors_exceed_budget {
        out.push_str("\nPer-channel minimums add up to more than the total budget.");
    }
    out
}

pub fn render_report_tables(report: &AllocationReport, precision: usize) -> String {
    let mut channels = new_table();
    channels.set_header(vec!["Channel", "Budget", "Share", "Clicks", "Revenue", "ROAS"]);
    for c in &report.channels {
        channels.add_row(vec![
            c.channel.clone(),
            fixed(c.budget, precision),
            format!("{:.1}%", c.share * 100.0),
            fixed(c.clicks, 0),
            fixed(c.revenue, precision),
            optional(c.roas, precision),
        ]);
    }

    let mut products = new_table();
    let mut header = vec!["Product".to_string(), "Conversions".to_string()];
    header.extend(report.channels.iter().map(|c| c.channel.clone()));
    header.push("Revenue".to_string());
    products.set_header(header);
    for p in &report.products {
        let mut row = vec![p.product.clone(), fixed(p.conversions, 1)];
        row.extend(p.revenue_by_channel.iter().map(|r| fixed(*r, precision)));
        row.push(fixed(p.revenue, precision));
        products.add_row(row);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Revenue: {}  Ad spend: {}  ROAS: {}  Clicks: {}\n",
        fixed(report.totals.revenue, precision),
        fixed(report.totals.ad_spend, precision),
        optional(report.totals.roas, precision),
        fixed(report.totals.clicks, 0),
    ));
    out.push_str(&channels.to_string());
    out.push('\n');
    out.push_str(&products.to_string());
    out.push('\n');
    out.push_str(&render_constraint_table(&report.constraints, precision));
    let binding = binding_names(&report.constraints);
    out.push_str(&format!(
        "\nBinding: {}\nInput hash: {}\nSolved at: {} ({})",
        if binding.is_empty() {
            "none".to_string()
        } else {
            binding.join(", ")
        },
        report.input_hash,
        report.solved_at.to_rfc3339(),
        report.backend
    ));
    out
}

pub fn render_constraint_table(checks: &[ConstraintCheck], precision: usize) -> String {
    let mut table = new_table();
    table.set_header(vec!["Constraint", "Value", "", "Limit", "Slack", "Status"]);
    for check in checks {
        let status = if !check.satisfied {
            Cell::new("VIOLATED").fg(Color::Red)
        } else if check.binding {
            Cell::new("BINDING").fg(Color::Yellow)
        } else {
            Cell::new("OK").fg(Color::Green)
        };
        table.add_row(Row::from(vec![
            Cell::new(&check.name),
            Cell::new(fixed(check.lhs, precision)),
            Cell::new(check.relation.to_string()),
            Cell::new(fixed(check.rhs, precision)),
            Cell::new(fixed(check.slack, precision)),
            status,
        ]));
    }
    table.to_string()
}

pub fn render_whatif_table(
    result: &WhatIfResult,
    channels: &[String],
    precision: usize,
) -> String {
    let mut table = new_table();
    table.set_header(vec!["Channel", "Before", "After", "Change"]);
    let before = result.before.allocations();
    let after = result.after.allocations();
    for (i, name) in channels.iter().enumerate() {
        let old = before.map(|a| a[i]);
        let new = after.map(|a| a[i]);
        let delta = match (old, new) {
            (Some(o), Some(n)) => format!("{:+.precision$}", n - o),
            _ => "-".to_string(),
        };
        table.add_row(vec![
            name.clone(),
            optional(old, precision),
            optional(new, precision),
            delta,
        ]);
    }

    let changes = result
        .changes_applied
        .iter()
        .map(|c| format!("{} {} -> {}", c.parameter, c.from, c.to))
        .collect::<Vec<_>>()
        .join(", ");
    let mut footer = String::new();
    footer.push_str(&table.to_string());
    footer.push_str(&format!(
        "\nChanges: {}\nRevenue before: {}\nRevenue after: {}\nRevenue change: {}",
        if changes.is_empty() { "none" } else { changes.as_str() },
        optional(result.before.objective_value(), precision),
        optional(result.after.objective_value(), precision),
        result
            .objective_delta
            .map(|d| format!("{d:+.precision$}"))
            .unwrap_or_else(|| "-".to_string()),
    ));
    footer
}

#[cfg(test)]
mod tests {
    use super::{render_report_tables, render_result_table, render_whatif_table, NO_SOLUTION};
    use crate::model::input::{InputParameter, OptimizationInput};
    use crate::optimizer::report::{build_report, ReportLabels};
    use crate::optimizer::{BudgetOptimizer, OptimizationResult, ParameterChange, WhatIfResult};

    fn labels() -> Vec<String> {
        vec!["Search".to_string(), "Social".to_string()]
    }

    #[test]
    fn renders_no_solution_message() {
        assert_eq!(
            render_result_table(&OptimizationResult::NoSolution, &labels(), 2),
            NO_SOLUTION
        );
    }

    #[test]
    fn renders_allocations_with_labels() {
        let result = OptimizationResult::Solved {
            allocations: vec![1_200.0, 800.5],
            objective_value: 3_456.789,
        };
        let rendered = render_result_table(&result, &labels(), 2);
        assert!(rendered.contains("Search"));
        assert!(rendered.contains("800.50"));
        assert!(rendered.contains("Total revenue: 3456.79"));
    }

    #[test]
    fn whatif_marks_missing_side() {
        let result = WhatIfResult {
            changes_applied: vec![ParameterChange {
                parameter: InputParameter::MinClicks,
                from: 7_000.0,
                to: 50_000.0,
            }],
            before: OptimizationResult::Solved {
                allocations: vec![1.0, 2.0],
                objective_value: 3.0,
            },
            after: OptimizationResult::NoSolution,
            objective_delta: None,
            allocation_deltas: None,
        };
        let rendered = render_whatif_table(&result, &labels(), 2);
        assert!(rendered.contains("min_clicks 7000 -> 50000"));
        assert!(rendered.contains("Revenue change: -"));
    }

    #[test]
    fn report_lists_binding_constraints() {
        let solved = BudgetOptimizer::with_defaults()
            .solve_detailed(&OptimizationInput::reference())
            .expect("solve");
        let labels = ReportLabels::resolve(&[], &[], &solved);
        let report = build_report(&solved, &labels, 1e-6).expect("solved report");
        let rendered = render_report_tables(&report, 2);
        assert!(rendered.contains("Binding: total_budget, min_budget_channel_2, min_clicks\n"));
    }
}
