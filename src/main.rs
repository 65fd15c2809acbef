use std::path::{Path, PathBuf};

use adspend_optimizer::config::{Config, ConfigOverrides};
use adspend_optimizer::model::input::{
    apply_overrides, InputOverrides, InputParameter, OptimizationInput,
};
use adspend_optimizer::model::parse::{parse_counts, parse_matrix, parse_vector};
use adspend_optimizer::optimizer::report::{build_report, ReportLabels};
use adspend_optimizer::optimizer::whatif::simulate_whatif;
use adspend_optimizer::optimizer::{BudgetOptimizer, SolveReport, WhatIfResult};
use adspend_optimizer::output::csv::{constraints_to_csv, report_to_csv, result_to_csv};
use adspend_optimizer::output::table::{
    render_diagnostics_table, render_report_tables, render_result_table, render_whatif_table,
    NO_SOLUTION,
};
use adspend_optimizer::output::{render_json, OutputFormat};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "adspend-optimizer",
    about = "Linear-programming ad budget allocation across marketing channels"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    input: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[arg(short, long)]
    diagnostics: bool,
    #[command(flatten)]
    overrides: InputArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct InputArgs {
    #[arg(long = "total-budget")]
    total_budget: Option<f64>,
    #[arg(long = "min-budget-percent")]
    min_budget_percent: Option<f64>,
    #[arg(long = "min-clicks")]
    min_clicks: Option<i64>,
    #[arg(long = "max-cost-percent")]
    max_cost_percent: Option<f64>,
    #[arg(long = "cost-per-click")]
    cost_per_click: Option<String>,
    #[arg(long = "min-transactions")]
    min_transactions: Option<String>,
    #[arg(long = "conversion-rates")]
    conversion_rates: Option<String>,
    #[arg(long = "avg-ticket-size")]
    avg_ticket_size: Option<String>,
}

impl TryFrom<InputArgs> for InputOverrides {
    type Error = anyhow::Error;

    fn try_from(value: InputArgs) -> Result<Self> {
        Ok(Self {
            conversion_rates: value
                .conversion_rates
                .as_deref()
                .map(parse_matrix)
                .transpose()
                .map_err(|e| anyhow!("--conversion-rates: {e}"))?,
            avg_ticket_size: value
                .avg_ticket_size
                .as_deref()
                .map(parse_matrix)
                .transpose()
                .map_err(|e| anyhow!("--avg-ticket-size: {e}"))?,
            cost_per_click: value
                .cost_per_click
                .as_deref()
                .map(parse_vector)
                .transpose()
                .map_err(|e| anyhow!("--cost-per-click: {e}"))?,
            total_budget: value.total_budget,
            min_budget_percent: value.min_budget_percent,
            min_transactions_per_product: value
                .min_transactions
                .as_deref()
                .map(parse_counts)
                .transpose()
                .map_err(|e| anyhow!("--min-transactions: {e}"))?,
            min_clicks: value.min_clicks,
            max_cost_percent: value.max_cost_percent,
        })
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    Solve,
    Report,
    Whatif {
        #[arg(long = "total-budget")]
        total_budget: Option<f64>,
        #[arg(long = "min-budget-percent")]
        min_budget_percent: Option<f64>,
        #[arg(long = "min-clicks")]
        min_clicks: Option<i64>,
        #[arg(long = "max-cost-percent")]
        max_cost_percent: Option<f64>,
    },
    Template,
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        input_path: cli.input.clone(),
        diagnostics: cli.diagnostics.then_some(true),
    });

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }

    let input = load_input(&config, cli.overrides.clone())?;
    let optimizer = BudgetOptimizer::with_defaults();
    info!(backend = optimizer.solver_name(), "optimizer ready");
    let precision = config.output.precision;

    match &cli.command {
        Commands::Solve => {
            let solved = optimizer.solve_detailed(&input)?;
            let labels = labels_for(&config, &solved);
            print_solve(&solved, &labels, cli.output, &config)?;
        }
        Commands::Report => {
            let solved = optimizer.solve_detailed(&input)?;
            let labels = labels_for(&config, &solved);
            print_report(&solved, &labels, cli.output, &config)?;
        }
        Commands::Whatif {
            total_budget,
            min_budget_percent,
            min_clicks,
            max_cost_percent,
        } => {
            let mut changes = Vec::new();
            if let Some(v) = total_budget {
                changes.push((InputParameter::TotalBudget, *v));
            }
            if let Some(v) = min_budget_percent {
                changes.push((InputParameter::MinBudgetPercent, *v));
            }
            if let Some(v) = min_clicks {
                changes.push((InputParameter::MinClicks, *v as f64));
            }
            if let Some(v) = max_cost_percent {
                changes.push((InputParameter::MaxCostPercent, *v));
            }
            if changes.is_empty() {
                return Err(anyhow!(
                    "at least one --<parameter> change is required for whatif"
                ));
            }
            let result = simulate_whatif(&optimizer, &input, &changes)?;
            let channels = channel_names(&config, input.cost_per_click.len());
            print_whatif(&result, &channels, cli.output, precision)?;
        }
        Commands::Template => println!("{}", render_json(&input)?),
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &Path) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn load_input(config: &Config, args: InputArgs) -> Result<OptimizationInput> {
    let mut input = match config.resolved_input_path() {
        Some(path) => {
            info!("loading input from {}", path.display());
            OptimizationInput::load(&path)?
        }
        None => OptimizationInput::reference(),
    };
    let overrides = InputOverrides::try_from(args)?;
    apply_overrides(&mut input, &overrides);
    Ok(input)
}

fn labels_for(config: &Config, solved: &SolveReport) -> ReportLabels {
    ReportLabels::resolve(&config.labels.channels, &config.labels.products, solved)
}

fn channel_names(config: &Config, count: usize) -> Vec<String> {
    if config.labels.channels.len() == count {
        config.labels.channels.clone()
    } else {
        (1..=count).map(|n| format!("Channel {n}")).collect()
    }
}

fn print_solve(
    solved: &SolveReport,
    labels: &ReportLabels,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let precision = config.output.precision;
    let diagnostics = config.solver.diagnostics;
    match format {
        OutputFormat::Table => {
            println!(
                "{}",
                render_result_table(&solved.result, &labels.channels, precision)
            );
            if diagnostics {
                println!("{}", render_diagnostics_table(&solved.diagnostics));
            }
        }
        OutputFormat::Json if diagnostics => println!(
            "{}",
            render_json(&json!({
                "result": solved.result,
                "diagnostics": solved.diagnostics,
            }))?
        ),
        OutputFormat::Json => println!("{}", render_json(&solved.result)?),
        OutputFormat::Csv => print!(
            "{}",
            result_to_csv(&solved.result, &labels.channels, precision)?
        ),
    }
    Ok(())
}

fn print_report(
    solved: &SolveReport,
    labels: &ReportLabels,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let precision = config.output.precision;
    let Some(report) = build_report(solved, labels, config.solver.tolerance) else {
        match format {
            OutputFormat::Json => println!("{}", render_json(&solved.result)?),
            _ => println!("{NO_SOLUTION}"),
        }
        if config.solver.diagnostics {
            println!("{}", render_diagnostics_table(&solved.diagnostics));
        }
        return Ok(());
    };

    match format {
        OutputFormat::Table => {
            println!("{}", render_report_tables(&report, precision));
            if config.solver.diagnostics {
                println!("{}", render_diagnostics_table(&solved.diagnostics));
            }
        }
        OutputFormat::Json => println!("{}", render_json(&report)?),
        OutputFormat::Csv => {
            print!("{}", report_to_csv(&report, precision)?);
            println!();
            print!("{}", constraints_to_csv(&report.constraints)?);
        }
    }
    Ok(())
}

fn print_whatif(
    result: &WhatIfResult,
    channels: &[String],
    format: OutputFormat,
    precision: usize,
) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_whatif_table(result, channels, precision)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => {
            warn!("CSV output for whatif not implemented, using JSON");
            println!("{}", render_json(result)?);
        }
    }
    Ok(())
}
