use clap::Parser;
use create_pkg_manifest::{
    common::GlobalOpts,
    config::ToolPaths,
    generate::{generate, GenerateReport},
};
use pkgm_logger as logger;
use pkgm_manifest::PathFilter;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "create-pkg-manifest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Generate a jiri manifest for third_party/pkg",
    long_about = "Parses a DEPS file, extracts the dependencies that live under \
                  sdk/third_party/pkg and writes them as a jiri manifest, \
                  relocated under dart/third_party/pkg."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    /// Input DEPS file (default: ./DEPS)
    #[arg(short, long)]
    deps: Option<PathBuf>,

    /// Output jiri manifest (default: ./dart_third_party_pkg.manifest)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    logger::init(cli.global.verbosity_level());
    init_tracing();

    let paths = ToolPaths::from_overrides(cli.deps, cli.output);

    match generate(&paths, &PathFilter::default()) {
        Ok(report) => report_success(&report),
        Err(e) => {
            logger::error(&format!("{}: {}", e.kind(), e));
            std::process::exit(1);
        }
    }
}

fn report_success(report: &GenerateReport) {
    let noun = if report.selected == 1 {
        "project"
    } else {
        "projects"
    };
    logger::success(&format!(
        "Wrote {} {} to {}",
        report.selected,
        noun,
        report.output.display()
    ));
}

/// Library diagnostics follow the CLI verbosity, not the environment
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(logger::tracing_level()))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}
