use clap::{Parser, Subcommand};
use smg::{config, generate, output};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Flags that override the matching `smg.toml` keys for one build.
#[derive(clap::Args, Clone, Default)]
struct OutputArgs {
    /// Output path for the JSON manifest (relative to the project)
    #[arg(long)]
    json_output: Option<String>,

    /// Output path for sitemap.xml (relative to the project, "" to skip)
    #[arg(long)]
    xml_output: Option<String>,

    /// Base URL used for <loc> entries in sitemap.xml
    #[arg(short, long)]
    base_url: Option<String>,
}

#[derive(Parser)]
#[command(name = "smg")]
#[command(version)]
#[command(about = "Sitemap manifest generator for file-system-routed web apps")]
#[command(long_about = "\
Sitemap manifest generator for file-system-routed web apps

Every directory under app/ (or src/app/) holding a page file is a route.
Directives in smg.toml include or exclude a route together with everything
below it, until a descendant carries its own directive.

  src/app/
  ├── page.tsx                     # /
  ├── example/page.tsx             # /example
  ├── exclude-children/page.tsx    # /exclude-children
  │   └── exclude-1/page.tsx       # excluded by directive
  │       └── child/page.tsx       # inherits exclude
  └── (marketing)/pricing/page.tsx # /pricing (groups add no segment)

Run 'smg gen-config' to print a documented smg.toml.")]
struct Cli {
    /// Project root
    #[arg(short, long, default_value = ".", global = true)]
    project: PathBuf,

    /// Config file (defaults to <project>/smg.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan, resolve and write the manifests (default)
    Build(OutputArgs),
    /// Resolve the route tree and show what would be written
    Check,
    /// Print a stock smg.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet)?;

    let command = cli
        .command
        .take()
        .unwrap_or_else(|| Command::Build(OutputArgs::default()));

    match command {
        Command::Build(args) => {
            let mut site_config = load_config(&cli)?;
            apply_overrides(&mut site_config, args);
            site_config.validate()?;
            let report = generate::run(&cli.project, &site_config)?;
            output::print_build_output(&report, &cli.project);
        }
        Command::Check => {
            let site_config = load_config(&cli)?;
            let plan = generate::plan(&cli.project, &site_config)?;
            output::print_check_output(&plan, &cli.project);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install a stderr subscriber. Warnings by default.
fn init_logging(verbose: bool, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<config::SmgConfig, config::ConfigError> {
    match &cli.config {
        Some(path) if !path.exists() => Err(config::ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", path.display()),
        ))),
        Some(path) => config::load_config_file(path),
        None => config::load_config(&cli.project),
    }
}

/// CLI flags take precedence over the config file.
fn apply_overrides(site_config: &mut config::SmgConfig, args: OutputArgs) {
    if let Some(json_output) = args.json_output {
        site_config.json_output = json_output;
    }
    if let Some(xml_output) = args.xml_output {
        site_config.xml_output = xml_output;
    }
    if let Some(base_url) = args.base_url {
        site_config.base_url = base_url;
    }
}
