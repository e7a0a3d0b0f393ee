use clap::{Parser, Subcommand, ValueEnum};
use cs_app::{
    AppError, AppResult, ComponentSummary, DryRunEngine, RunOptions, RunProgressEvent, RunRequest,
    config_service, run_service,
};
use cs_components::{GeometryKind, ProcessorLayout};
use cs_inventory::{FieldDescription, FieldOrigin};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cs-cli")]
#[command(about = "Mantle convection solver run setup", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a run configuration and resolve every component
    Validate {
        /// Path to the run configuration (YAML or JSON)
        config_path: PathBuf,
    },
    /// Show the resolved properties of every component
    Show {
        /// Path to the run configuration (YAML or JSON)
        config_path: PathBuf,
        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// List the fields a component accepts
    Schema {
        /// Component: output or sphere
        component: String,
        /// Sphere geometry to describe
        #[arg(long, value_enum, default_value_t = GeometryArg::Full)]
        geometry: GeometryArg,
        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Show the processor layout of a run
    Layout {
        /// Path to the run configuration (YAML or JSON)
        config_path: PathBuf,
        /// Locate a rank and list its communicator groups
        #[arg(long)]
        rank: Option<usize>,
    },
    /// Configure, push and launch against the dry-run engine
    Launch {
        /// Path to the run configuration (YAML or JSON)
        config_path: PathBuf,
        /// Process count to check the layout against
        #[arg(long)]
        nproc: Option<u32>,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GeometryArg {
    Full,
    Regional,
}

impl From<GeometryArg> for GeometryKind {
    fn from(arg: GeometryArg) -> Self {
        match arg {
            GeometryArg::Full => GeometryKind::Full,
            GeometryArg::Regional => GeometryKind::Regional,
        }
    }
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Show { config_path, json } => cmd_show(&config_path, json),
        Commands::Schema {
            component,
            geometry,
            json,
        } => cmd_schema(&component, geometry.into(), json),
        Commands::Layout { config_path, rank } => cmd_layout(&config_path, rank),
        Commands::Launch {
            config_path,
            nproc,
            json,
        } => cmd_launch(&config_path, nproc, json),
    }
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = config_service::load_config(config_path)?;
    let assembly = config_service::configure_assembly(&config)?;
    let layout = assembly.layout()?;
    if let Some(nproc) = config.nproc {
        layout.check_total(nproc as usize)?;
    }
    println!(
        "✓ Configuration is valid ({} geometry, {} processes)",
        assembly.geometry(),
        layout.total()
    );
    Ok(())
}

fn cmd_show(config_path: &Path, json: bool) -> AppResult<()> {
    let config = config_service::load_config(config_path)?;
    let summaries = config_service::resolve_config(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("Run '{}':", config.name);
    for summary in &summaries {
        print_summary(summary);
    }
    Ok(())
}

fn print_summary(summary: &ComponentSummary) {
    println!(
        "  [{}] facility={} state={}",
        summary.name, summary.facility, summary.state
    );
    if let Some(props) = &summary.properties {
        let width = props.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, value) in props.iter() {
            println!("    {name:<width$} = {value}");
        }
    }
}

fn cmd_schema(component: &str, geometry: GeometryKind, json: bool) -> AppResult<()> {
    let schema_name = match component {
        "sphere" | "mesher" => geometry.component_name(),
        other => other,
    };
    let fields = config_service::describe_schema(schema_name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&fields)?);
        return Ok(());
    }

    println!("Fields of '{schema_name}':");
    for field in &fields {
        print_field(field);
    }
    Ok(())
}

fn print_field(field: &FieldDescription) {
    let origin = match &field.origin {
        FieldOrigin::Local => String::new(),
        FieldOrigin::Inherited { from } => format!("  (from {from})"),
        FieldOrigin::Redeclared { from } => format!("  (redeclared, was {from})"),
        FieldOrigin::DefaultOverridden { from } => format!("  (default overrides {from})"),
    };
    println!(
        "  {:<28} {:<8} default={}{}",
        field.name, field.field_type, field.default, origin
    );
    if let Some(validator) = &field.validator {
        println!("  {:<28} {:<8} must be {validator}", "", "");
    }
    if let Some(description) = &field.description {
        println!("  {:<28} {:<8} {description}", "", "");
    }
}

fn cmd_layout(config_path: &Path, rank: Option<usize>) -> AppResult<()> {
    let config = config_service::load_config(config_path)?;
    let layout = config_service::configure_assembly(&config)?.layout()?;
    print_layout(&layout);

    let Some(rank) = rank else {
        return Ok(());
    };
    let location = layout.location(rank).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "rank {rank} is outside 0..{} for this layout",
            layout.total()
        ))
    })?;
    println!(
        "Rank {rank}: cap={} x={} y={} z={}",
        location.cap, location.x, location.y, location.z
    );
    println!(
        "  horizontal group: {:?}",
        layout.horizontal_group(location.z)
    );
    println!(
        "  vertical group:   {:?}",
        layout.vertical_group(location.cap, location.x, location.y)
    );
    Ok(())
}

fn print_layout(layout: &ProcessorLayout) {
    println!("Processor layout:");
    println!("  Caps:          {}", layout.caps());
    println!(
        "  Per cap:       {} ({} x {} x {})",
        layout.per_cap(),
        layout.nprocx(),
        layout.nprocy(),
        layout.nprocz()
    );
    println!("  Surface procs: {}", layout.surface_procs());
    println!("  Total:         {}", layout.total());
}

fn cmd_launch(config_path: &Path, nproc: Option<u32>, json: bool) -> AppResult<()> {
    let request = RunRequest {
        config_path,
        options: RunOptions { nproc },
    };
    let mut engine = DryRunEngine::new();

    let report = {
        let mut module = DryRunEngine::new();
        let report = run_service::run_with_progress(
            &request,
            &mut engine,
            &mut module,
            Some(&mut |event| render_cli_progress(&event)),
        )?;
        clear_progress_line();
        tracing::debug!(launches = module.launches().len(), "dry run finished");
        report
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("✓ Launched '{}' via {}", report.name, report.entry_point);
    println!("  Geometry:   {}", report.geometry);
    println!("  Processes:  {}", report.layout.total());
    println!("  Pushes:     {}", engine.pushes().len());
    for summary in &report.components {
        print_summary(summary);
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.3}s",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}
