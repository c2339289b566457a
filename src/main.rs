//! compdetect - static dependency manifest detector
//!
//! Scans a directory for Conan and pip manifests and reports the
//! de-duplicated component graph they declare:
//! - Conan (conanfile.py, conanfile.txt, conan.lock)
//! - pip (setup.py, requirements*.txt)

use anyhow::{bail, Context};
use clap::Parser;
use compdetect::cli::CliArgs;
use compdetect::error::AppError;
use compdetect::manifest::ManifestInfo;
use compdetect::orchestrator::Pipeline;
use compdetect::output::{create_emitter, DetectionReport};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit status when at least one manifest produced a diagnostic
const EXIT_DIAGNOSTICS: u8 = 2;
/// Exit status after Ctrl-C
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(&args);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            if matches!(e.downcast_ref::<AppError>(), Some(AppError::Cancelled)) {
                eprintln!("Cancelled");
                return ExitCode::from(EXIT_CANCELLED);
            }
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(args: &CliArgs) {
    let filter = EnvFilter::try_from_env("COMPDETECT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose {
            "compdetect=debug,info"
        } else if args.quiet {
            "error"
        } else {
            "compdetect=warn,error"
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(io::stderr))
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = args.load_config()?;
    debug!(?config, "loaded configuration");

    let pipeline = Pipeline::new(config)?.with_progress(args.show_progress());

    let cancel = pipeline.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    info!(
        version = env!("CARGO_PKG_VERSION"),
        path = %args.path.display(),
        "starting detection"
    );

    let outcome = if args.path.is_file() {
        let Some(manifest) = ManifestInfo::from_path(&args.path) else {
            bail!("{} is not a recognized manifest file", args.path.display());
        };
        if !pipeline.config().is_enabled(manifest.ecosystem) {
            bail!(
                "{} is a {} manifest, which is not enabled",
                args.path.display(),
                manifest.ecosystem
            );
        }
        pipeline.scan(vec![manifest]).await?
    } else if args.path.is_dir() {
        pipeline.detect(&args.path).await?
    } else {
        bail!("{} does not exist", args.path.display());
    };

    let report = DetectionReport::from_outcome(&outcome);
    let emitter = create_emitter(args.output_config());

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            emitter.emit(&report, &mut writer).map_err(AppError::from)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            emitter.emit(&report, &mut stdout).map_err(AppError::from)?;
            stdout.flush()?;
        }
    }

    info!(
        components = report.summary.components,
        edges = report.summary.edges,
        diagnostics = report.summary.diagnostics,
        "detection finished"
    );

    if report.diagnostics.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_DIAGNOSTICS))
    }
}
