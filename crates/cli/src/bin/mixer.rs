//! Resolve propellant combinations and simulate ignition for authored thrusters.

use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use propellant_mixer::export::report::{
    CombinationSummary, ResolutionReport, write_report, writer_for_path,
};
use propellant_mixer::ignition::{EngineSnapshot, IgnitionEffects, IgnitionState, ResourcePool};
use propellant_mixer::propulsion::PropellantCombination;
use propellant_mixer::thruster::display::{isp_line, thrust_line};
use propellant_mixer::thruster::{Catalog, EngineController, ThrusterController, load_catalog};

#[derive(Parser)]
#[command(author, version, about = "Propellant mixer rules engine")]
struct Cli {
    /// Root of the authored database
    #[arg(long, global = true, default_value = "configs")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a thruster's combinations and print the rescaled stats
    Resolve(ResolveArgs),
    /// Run the ignition state machine against an in-memory resource pool
    Ignite(IgniteArgs),
}

#[derive(Args)]
struct Selection {
    /// Thruster name from the catalog (case-insensitive)
    #[arg(long)]
    thruster: String,

    /// Replace a connected resource, e.g. `--swap LiquidFuel=Kerosene`
    #[arg(long = "swap", value_parser = parse_pair::<String>)]
    swaps: Vec<(String, String)>,
}

#[derive(Args)]
struct ResolveArgs {
    #[command(flatten)]
    selection: Selection,

    /// Part scale factor
    #[arg(long)]
    scale: Option<f64>,

    /// Write a JSON report to this path (`-` for stdout)
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Args)]
struct IgniteArgs {
    #[command(flatten)]
    selection: Selection,

    /// Resource available to the engine, e.g. `--available ElectricCharge=50`
    #[arg(long = "available", value_parser = parse_pair::<f64>)]
    available: Vec<(String, f64)>,

    /// Number of simulation ticks
    #[arg(long, default_value_t = 3)]
    ticks: u32,

    /// Pilot throttle command
    #[arg(long, default_value_t = 1.0)]
    throttle: f64,
}

fn parse_pair<T>(raw: &str) -> Result<(String, T), String>
where
    T: FromStr,
    T::Err: Display,
{
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    let value = value
        .trim()
        .parse::<T>()
        .map_err(|err| format!("invalid value in `{raw}`: {err}"))?;
    Ok((name.trim().to_string(), value))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let catalog = load_catalog(&cli.config_dir)
        .with_context(|| format!("loading catalog from {}", cli.config_dir.display()))?;

    match cli.command {
        Command::Resolve(args) => resolve(&catalog, args),
        Command::Ignite(args) => ignite(&catalog, args),
    }
}

/// A resolved thruster ready for reporting or ignition.
struct Prepared {
    engine: EngineController,
    allow_shutdown: bool,
    throttle_locked: bool,
}

/// Build the selected thruster, apply swaps and scale, then resolve it.
///
/// Ignitor amounts are frozen last so they follow the applied stats.
fn prepare(
    catalog: &Catalog,
    selection: &Selection,
    scale: Option<f64>,
) -> anyhow::Result<Prepared> {
    let setup = catalog.build(&selection.thruster)?;
    let (allow_shutdown, throttle_locked) = (setup.allow_shutdown, setup.throttle_locked);
    let (mut thruster, mut engine) = setup.into_engine();

    for (from, to) in &selection.swaps {
        if engine.thruster_mut().swap_resource(from, to) == 0 {
            bail!("no slot of {} holds {from}", engine.thruster().group_key());
        }
    }

    if engine
        .thruster_mut()
        .update_and_apply(catalog.database(), &mut thruster)
        .is_none()
    {
        log::warn!("{} has no valid propellant combination", selection.thruster);
    }
    if let Some(scale) = scale {
        engine
            .thruster_mut()
            .set_scale_factor(scale, catalog.database(), &mut thruster);
    }
    engine.freeze_ignition_resources(&thruster);

    Ok(Prepared {
        engine,
        allow_shutdown,
        throttle_locked,
    })
}

fn describe(label: &str, combination: Option<&PropellantCombination>) {
    match combination {
        Some(combination) => println!(
            "{label:<10}{}  [{}]",
            combination.ratio_string(),
            combination.source()
        ),
        None => println!("{label:<10}unresolved"),
    }
}

fn print_summary(name: &str, controller: &ThrusterController, engine: &EngineController) {
    println!("Thruster: {name} ({})", controller.kind().as_str());
    describe("Original:", controller.resolved().original.as_ref());
    describe("Current:", controller.resolved().current.as_ref());

    if let (Some(baseline), Some(stats)) =
        (controller.scaled_baseline(), controller.stats().current())
    {
        println!("Thrust:   {}", thrust_line(&baseline, stats));
        println!("Isp:      {}", isp_line(&baseline, stats));
        println!("Fuel flow: {:.4}", stats.max_fuel_flow);
    }

    let ignitors = engine.ignition_description();
    if !ignitors.is_empty() {
        println!("{} ignition:", engine.group_name());
        for line in ignitors {
            println!("  {line}");
        }
    }
}

fn resolve(catalog: &Catalog, args: ResolveArgs) -> anyhow::Result<()> {
    let Prepared { engine, .. } = prepare(catalog, &args.selection, args.scale)?;

    let name = args.selection.thruster.as_str();
    let controller = engine.thruster();
    print_summary(name, controller, &engine);

    if let Some(path) = &args.json {
        let report = ResolutionReport {
            thruster: name,
            kind: controller.kind().as_str(),
            original: controller.resolved().original.as_ref().map(CombinationSummary::from),
            current: controller.resolved().current.as_ref().map(CombinationSummary::from),
            baseline: controller.stats().baseline(),
            stats: controller.stats().current(),
            thrust_change_percent: controller.thrust_change_percent(),
            isp_change_percent: controller.isp_change_percent(),
            ignition_resources: engine.ignition_description(),
        };
        let mut writer = writer_for_path(path)
            .with_context(|| format!("opening {}", path.display()))?;
        write_report(writer.as_mut(), &report)?;
    }
    Ok(())
}

/// Resource pool backed by fixed amounts that drain on request.
struct Tanks {
    amounts: HashMap<String, f64>,
}

impl ResourcePool for Tanks {
    fn connected_amount(&self, resource: &str) -> f64 {
        self.amounts.get(resource).copied().unwrap_or(0.0)
    }

    fn request_consumption(&mut self, resource: &str, amount: f64) {
        let available = self.amounts.entry(resource.to_string()).or_insert(0.0);
        let drained = amount.min(*available);
        *available -= drained;
        println!("  drained {drained} {resource}");
    }
}

struct Console;

impl IgnitionEffects for Console {
    fn engage(&mut self) {
        println!("  [engage]");
    }

    fn flameout(&mut self) {
        println!("  [flameout]");
    }

    fn shutdown(&mut self) {
        println!("  [shutdown]");
    }

    fn post_message(&mut self, message: &str) {
        println!("  {message}");
    }
}

fn ignite(catalog: &Catalog, args: IgniteArgs) -> anyhow::Result<()> {
    let Prepared {
        mut engine,
        allow_shutdown,
        throttle_locked,
        ..
    } = prepare(catalog, &args.selection, None)?;

    let mut tanks = Tanks {
        amounts: args.available.into_iter().collect(),
    };
    let snapshot = EngineSnapshot {
        requested_throttle: args.throttle,
        main_throttle: args.throttle,
        engine_ignited: true,
        flameout: false,
        allow_shutdown,
        throttle_locked,
        multi_mode: false,
    };

    let mut state = IgnitionState::Unignited;
    for tick in 1..=args.ticks {
        println!("tick {tick}:");
        state = engine.tick(&snapshot, &[], &mut tanks, &mut Console);
    }
    println!(
        "final state: {}",
        match state {
            IgnitionState::Ignited => "ignited",
            IgnitionState::Unignited => "unignited",
        }
    );

    let mut remaining: Vec<_> = tanks.amounts.into_iter().collect();
    remaining.sort_by(|a, b| a.0.cmp(&b.0));
    for (resource, amount) in remaining {
        println!("remaining {resource}: {amount}");
    }
    Ok(())
}
