use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use layoutstat::config::DeviceConfig;
use layoutstat::discovery::{read_dirlist, write_dirlist};
use layoutstat::report::TerminalReporter;
use layoutstat::{
    find_packages, AndroidDevice, AppAnalyzer, AppPackage, Config, CsvReport, LayoutParser,
    ResourceResolver,
};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// layoutstat - Statistics over Android layout XML
#[derive(Parser, Debug)]
#[command(name = "layoutstat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only output errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Append log output to a file instead of the terminal
    #[arg(short = 'l', long, global = true, value_name = "LOGFILE")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze tags and button counts for each application
    Tags(TagsArgs),
    /// Print the element tree of one layout
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct TagsArgs {
    /// Output CSV; existing rows are kept
    #[arg(short, long, value_name = "CSV")]
    output: PathBuf,

    /// Path to one application's res/layout
    #[arg(required_unless_present_any = ["repo", "dirlist"], conflicts_with = "repo")]
    layouts: Option<PathBuf>,

    /// Path to the application's res/values
    #[arg(long, requires = "layouts")]
    values: Option<PathBuf>,

    /// Folder of Android applications, one per subdirectory
    #[arg(long, value_name = "REPOSITORY")]
    repo: Option<PathBuf>,

    /// JSON list of application directories to read instead of discovering
    #[arg(long, value_name = "DIRLIST")]
    dirlist: Option<PathBuf>,

    /// Write the discovered directories to DIRLIST instead of reading it
    #[arg(long, requires = "dirlist")]
    cache: bool,

    /// Also analyze app-defined tags (not just stock Android tags)
    #[arg(long)]
    custom: bool,

    /// In the absence of data, leave CSV cells empty instead of writing 0
    #[arg(long)]
    blanks: bool,

    /// Simulated device preset (galaxy-s3, nexus-one, baseline)
    #[arg(long, value_name = "PRESET")]
    device: Option<String>,

    /// Enable parallel processing for faster analysis
    #[arg(long)]
    parallel: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Layout XML file
    layout: PathBuf,

    /// Path to res/values for resolving @+ references
    #[arg(long)]
    values: Option<PathBuf>,

    /// Simulated device preset (galaxy-s3, nexus-one, baseline)
    #[arg(long, value_name = "PRESET")]
    device: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("layoutstat v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(cli.config.as_ref(), Path::new("."))?;

    match &cli.command {
        Command::Tags(args) => run_tags(config, args, cli.quiet),
        Command::Inspect(args) => run_inspect(config, args),
    }
}

fn init_logging(verbose: bool, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to open log file: {}", path.display()))?;
            fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

/// Apply a `--device` override to the configured device
fn resolve_device(config: &Config, preset: Option<&str>) -> Result<Option<AndroidDevice>> {
    match preset {
        Some(preset) => DeviceConfig::preset(preset)
            .build()
            .into_diagnostic()
            .map(Some),
        None => config.build_device(),
    }
}

fn progress_bar(len: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

fn collect_packages(config: &Config, args: &TagsArgs) -> Result<Vec<AppPackage>> {
    if let (Some(dirlist), false) = (&args.dirlist, args.cache) {
        println!("Using application layouts in {}.", dirlist.display());
        return read_dirlist(dirlist);
    }

    let packages = match (&args.repo, &args.layouts) {
        (Some(repo), _) => {
            info!("Finding applications in {}...", repo.display());
            find_packages(repo, config)?
        }
        (None, Some(layouts)) => {
            if args.values.is_none() {
                warn!("No VALUES directory specified; resource references will fail");
            }
            vec![AppPackage::from_dirs(layouts, args.values.clone())]
        }
        (None, None) => Vec::new(),
    };

    if let Some(dirlist) = &args.dirlist {
        write_dirlist(dirlist, &packages)?;
        println!(
            "{}",
            format!("Cached {} applications to {}", packages.len(), dirlist.display()).cyan()
        );
    }

    Ok(packages)
}

fn run_tags(mut config: Config, args: &TagsArgs, quiet: bool) -> Result<()> {
    let start_time = Instant::now();

    // Override with CLI arguments
    config.custom_tags |= args.custom;
    config.blanks |= args.blanks;
    let device = resolve_device(&config, args.device.as_deref())?;

    // Step 1: Find application directories
    let packages = collect_packages(&config, args)?;
    info!("Found {} applications", packages.len());

    // Step 2: Analyze each application's layouts
    info!("Analyzing application layout tags...");
    let pb = progress_bar(packages.len(), quiet);
    let analyzer = AppAnalyzer::new(&config)
        .with_device(device.as_ref())
        .with_parallel(args.parallel);
    let apps = analyzer.analyze_all(&packages, || pb.inc(1))?;
    pb.finish_and_clear();

    if !quiet {
        TerminalReporter::new().report_apps(&apps);
    }

    // Step 3: Merge into the output file
    info!("Writing {} entries to {}", apps.len(), args.output.display());
    let rows = apps.iter().map(|app| app.to_row()).collect();
    let summary = CsvReport::new(&args.output)
        .with_blanks(config.blanks)
        .write(rows)?;

    if !quiet {
        println!(
            "{}",
            format!(
                "✓ Wrote {} new and {} existing rows ({} columns) to {} in {:.2}s",
                summary.new_rows,
                summary.kept_rows,
                summary.columns,
                args.output.display(),
                start_time.elapsed().as_secs_f64()
            )
            .green()
        );
    }

    Ok(())
}

fn run_inspect(config: Config, args: &InspectArgs) -> Result<()> {
    let device = resolve_device(&config, args.device.as_deref())?;
    let resources = ResourceResolver::new(args.values.iter().cloned().collect());
    let parser = LayoutParser::new(&resources, device.as_ref());

    let tree = parser
        .parse_file(&args.layout)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to model {}", args.layout.display()))?;

    TerminalReporter::new().print_tree(&tree);

    println!("{}", "─".repeat(60).dimmed());
    println!(
        "{} elements, {} buttons{}",
        tree.len(),
        tree.button_count(),
        device
            .as_ref()
            .map(|d| format!(" on {}", d.name()))
            .unwrap_or_default()
    );

    Ok(())
}
