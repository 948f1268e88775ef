#![deny(warnings)]

//! Headless CLI: runs takeoff, costing and the cash-flow projection for one
//! or more scenarios and prints a text or JSON report.

use anyhow::{bail, Context, Result};
use scenario::{load_dir, load_scenario, Scenario};
use serde_json::json;
use storage_core::Category;
use storage_econ::{CashFlowSeries, HeightSensitivity};
use storage_runtime::{inventory_mix, Estimator, Takeoff};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    scenario: Option<String>,
    scenario_dir: Option<String>,
    sets: Vec<String>,
    overrides: Vec<String>,
    sensitivity: Option<(f64, f64)>,
    json: bool,
}

fn parse_heights(raw: &str) -> Option<(f64, f64)> {
    let (high, low) = raw.split_once(',')?;
    Some((high.trim().parse().ok()?, low.trim().parse().ok()?))
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => args.scenario = it.next(),
            "--scenario-dir" => args.scenario_dir = it.next(),
            "--set" => args.sets.extend(it.next()),
            "--override" => args.overrides.extend(it.next()),
            "--sensitivity" => {
                let raw = it.next().unwrap_or_default();
                args.sensitivity = Some(
                    parse_heights(&raw)
                        .with_context(|| format!("--sensitivity expects HIGH,LOW, got {raw:?}"))?,
                );
            }
            "--json" => args.json = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    if args.scenario.is_some() && args.scenario_dir.is_some() {
        bail!("--scenario and --scenario-dir are mutually exclusive");
    }
    Ok(args)
}

fn scenarios(args: &Args) -> Result<Vec<Scenario>> {
    if let Some(dir) = &args.scenario_dir {
        return load_dir(dir).with_context(|| format!("loading scenarios from {dir}"));
    }
    match &args.scenario {
        Some(path) => Ok(vec![
            load_scenario(path).with_context(|| format!("loading scenario {path}"))?
        ]),
        None => Ok(vec![Scenario::named("default")]),
    }
}

struct Outcome {
    name: String,
    takeoff: Takeoff,
    cash_flow: CashFlowSeries,
    sensitivity: Option<HeightSensitivity>,
}

fn run(scenario: Scenario, args: &Args) -> Result<Outcome> {
    let mut session = Estimator::new(scenario.config);
    session.replace_overrides(scenario.overrides);
    for assignment in &args.sets {
        let (field, raw) = assignment
            .split_once('=')
            .with_context(|| format!("--set expects field=value, got {assignment:?}"))?;
        session.set(field, raw)?;
    }
    for assignment in &args.overrides {
        let (key, raw) = assignment
            .split_once('=')
            .with_context(|| format!("--override expects item=value, got {assignment:?}"))?;
        session.set_override(key, raw)?;
    }

    session.generate()?;
    let cash_flow = session.simulate_cash_flow()?;
    let sensitivity = match args.sensitivity {
        Some((high, low)) => Some(session.height_sensitivity(high, low)?),
        None => None,
    };
    let takeoff = session
        .takeoff()
        .cloned()
        .context("takeoff missing after generate")?;
    Ok(Outcome {
        name: scenario.name,
        takeoff,
        cash_flow,
        sensitivity,
    })
}

fn print_text(o: &Outcome) {
    let t = &o.takeoff;
    let area = t.area.rounded();
    println!("== {} ==", o.name);
    println!(
        "Area | gross: {:.2} m² | usable: {:.2} m² | non-usable: {:.2} m² | max efficiency: {:.1}%",
        area.gross, area.usable, area.non_usable, area.max_efficiency
    );
    println!(
        "Units | count: {} | net: {:.2} m² | efficiency: {:.1}% | corridors: {:.2} m²",
        t.inventory.len(),
        t.inventory.net_area(),
        t.achieved_efficiency,
        t.corridor_area
    );
    for category in Category::ALL {
        println!(
            "  {:<6} | units: {:>4} | area: {:>8.2} m² | budget: {:>8.2} m²",
            category.as_str(),
            t.inventory.count(category),
            t.inventory.area(category),
            t.budgets.get(category)
        );
    }
    let mix: Vec<String> = inventory_mix(&t.inventory)
        .into_iter()
        .map(|(size, n)| format!("{n}x{size}"))
        .collect();
    println!("  mix: {}", mix.join(" "));

    let walls = t.walls.rounded();
    println!(
        "Walls | front: {} m | partition: {} m | corridor: {} m | doors: {} m",
        walls.front, walls.partition, walls.corridor, walls.door_width_total
    );

    println!("Costs | PUM: {:.2} m²", t.costs.pum);
    for line in t.costs.lines() {
        let mark = if line.overridden { " *" } else { "" };
        println!(
            "  {:<28} {:>10.2} {:<8} x {:>9} = {:>12}{mark}",
            line.item.label(),
            line.quantity,
            line.unit,
            line.unit_price,
            line.line_total
        );
    }
    println!("  {:<28} {:>57}", "TOTAL", t.costs.grand_total());

    let cf = &o.cash_flow;
    let cap = cf
        .occupancy_cap_month
        .map(|m| format!("month {m}"))
        .unwrap_or_else(|| "not reached".to_string());
    println!(
        "Cash flow | investment: {} | break-even: {} | occupancy cap: {} | profit: {} | ROI: {}% | annual: {}%",
        cf.investment, cf.break_even, cap, cf.total_profit, cf.roi_pct, cf.annual_return_pct
    );

    if let Some(s) = &o.sensitivity {
        println!(
            "Height {} m -> {} m | white wall: {} | gray wall: {} | total saving: {}",
            s.height_high, s.height_low, s.savings_white, s.savings_gray, s.savings_total
        );
    }
}

/// `RUST_LOG` directives when they parse, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    // Logging setup
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    info!(?args, "starting CLI");
    let build = json!({ "git_sha": env!("GIT_SHA"), "build_date": env!("BUILD_DATE") });

    let mut outcomes = Vec::new();
    for scenario in scenarios(&args)? {
        let name = scenario.name.clone();
        outcomes.push(run(scenario, &args).with_context(|| format!("scenario {name}"))?);
    }

    if args.json {
        let reports: Vec<_> = outcomes
            .iter()
            .map(|o| {
                json!({
                    "scenario": o.name,
                    "takeoff": o.takeoff,
                    "cash_flow": o.cash_flow,
                    "sensitivity": o.sensitivity,
                })
            })
            .collect();
        let doc = json!({ "build": build, "reports": reports });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!(
            "storage-takeoff {} ({})",
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        for o in &outcomes {
            print_text(o);
        }
    }
    Ok(())
}
