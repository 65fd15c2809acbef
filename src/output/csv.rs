use anyhow::Result;

use crate::optimizer::audit::ConstraintCheck;
use crate::optimizer::report::AllocationReport;
use crate::optimizer::OptimizationResult;
use crate::output::fixed;

/// One row per channel; an all-empty budget column means no solution.
pub fn result_to_csv(
    result: &OptimizationResult,
    channels: &[String],
    precision: usize,
) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["channel", "budget"])?;
    for (i, name) in channels.iter().enumerate() {
        let budget = result
            .allocations()
            .map(|a| fixed(a[i], precision))
            .unwrap_or_default();
        writer.write_record([name.clone(), budget])?;
    }
    writer.write_record([
        "objective_value".to_string(),
        result
            .objective_value()
            .map(|v| fixed(v, precision))
            .unwrap_or_default(),
    ])?;
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn report_to_csv(report: &AllocationReport, precision: usize) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["channel", "budget", "share", "clicks", "revenue", "roas"])?;
    for c in &report.channels {
        writer.write_record([
            c.channel.clone(),
            fixed(c.budget, precision),
            format!("{:.4}", c.share),
            fixed(c.clicks, precision),
            fixed(c.revenue, precision),
            c.roas.map(|r| format!("{r:.4}")).unwrap_or_default(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn constraints_to_csv(checks: &[ConstraintCheck]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "constraint",
        "value",
        "relation",
        "limit",
        "slack",
        "satisfied",
        "binding",
    ])?;
    for check in checks {
        writer.write_record([
            check.name.clone(),
            format!("{:.6}", check.lhs),
            check.relation.to_string(),
            format!("{:.6}", check.rhs),
            format!("{:.6}", check.slack),
            check.satisfied.to_string(),
            check.binding.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::{constraints_to_csv, result_to_csv};
    use crate::model::program::Relation;
    use crate::optimizer::audit::ConstraintCheck;
    use crate::optimizer::OptimizationResult;

    #[test]
    fn writes_result_rows_per_channel() {
        let channels = vec!["A".to_string(), "B".to_string()];
        let solved = OptimizationResult::Solved {
            allocations: vec![10.0, 20.0],
            objective_value: 45.0,
        };
        let csv = result_to_csv(&solved, &channels, 1).expect("csv");
        assert_eq!(csv, "channel,budget\nA,10.0\nB,20.0\nobjective_value,45.0\n");

        let none = result_to_csv(&OptimizationResult::NoSolution, &channels, 1).expect("csv");
        assert_eq!(none, "channel,budget\nA,\nB,\nobjective_value,\n");
    }

    #[test]
    fn writes_constraint_rows() {
        let checks = vec![ConstraintCheck {
            name: "min_clicks".to_string(),
            lhs: 7_000.0,
            relation: Relation::GreaterOrEqual,
            rhs: 7_000.0,
            slack: 0.0,
            satisfied: true,
            binding: true,
        }];
        let csv = constraints_to_csv(&checks).expect("csv");
        assert!(csv.starts_with("constraint,value,relation,limit,slack,satisfied,binding\n"));
        assert!(csv.contains("min_clicks,7000.000000,>=,7000.000000,0.000000,true,true"));
    }
}
