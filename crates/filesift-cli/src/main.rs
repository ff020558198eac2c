mod commands;
mod logging;
mod progress;

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, GenerateConfigArgs, RunArgs, ScanArgs};
use dotenv::dotenv;
use filesift_core::config::{load_configuration, Settings};
use filesift_core::{scanner, ExtensionAnnotator, Operation, Organizer, RunReport};
use progress::CliReporter;
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let args = Cli::parse();

    let _guard = logging::init_logger(args.verbose);

    let config = match load_configuration(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let outcome = match args.command {
        Some(Commands::Run(run_args)) => run_organizer(config, run_args),
        Some(Commands::Scan(scan_args)) => run_scan(config, scan_args),
        Some(Commands::GenerateConfig(gen_args)) => generate_config(gen_args),
        Some(Commands::PrintConfig) => print_config(&config),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run_organizer(mut settings: Settings, args: RunArgs) -> Result<()> {
    if let Some(source) = args.source {
        settings.source_dir = source;
    }
    if let Some(output) = args.output {
        settings.output_dir = output;
    }
    if args.apply {
        settings.dry_run = false;
    }
    if args.copy {
        settings.operation = Operation::Copy;
    }
    if let Some(approve) = args.approve_threshold {
        settings.thresholds.approve = approve;
    }
    if let Some(review) = args.review_threshold {
        settings.thresholds.review = review;
    }
    if let Some(dataset) = args.dataset {
        settings.dataset_path = Some(dataset);
    }

    if settings.source_dir.as_os_str().is_empty() {
        bail!("no source directory given (use --source or set source_dir)");
    }
    if settings.output_dir.as_os_str().is_empty() {
        bail!("no output directory given (use --output or set output_dir)");
    }
    settings.source_dir = absolute(&settings.source_dir)?;
    settings.output_dir = absolute(&settings.output_dir)?;
    if let Some(dataset) = settings.dataset_path.take() {
        settings.dataset_path = Some(absolute(&dataset)?);
    }

    let organizer = Organizer::new(settings).context("invalid configuration")?;
    let settings = organizer.settings();

    info!(
        "{} {} -> {}",
        if settings.dry_run { "Dry run:" } else { "Organizing:" },
        settings.source_dir.display(),
        settings.output_dir.display()
    );

    if !settings.dry_run && !args.yes {
        let prompt = format!(
            "This will {} files from {} into {}. Continue?",
            match settings.operation {
                Operation::Move => "MOVE",
                Operation::Copy => "COPY",
            },
            settings.source_dir.display(),
            settings.output_dir.display()
        );
        if !prompt_confirm(&prompt, Some(false))? {
            info!("Aborted, nothing was changed");
            return Ok(());
        }
    }

    let reporter = CliReporter::new();
    let report = organizer.run(&ExtensionAnnotator, args.replay, &reporter)?;
    let report_path = report
        .write_json(&args.report_dir)
        .context("failed to write run report")?;

    print_summary(&report);
    println!("Report: {}", report_path.display().to_string().cyan());
    Ok(())
}

fn print_summary(report: &RunReport) {
    let counts = report.counts();
    println!();
    println!(
        "{} files scanned: {} approved, {} for review, {} low confidence, {} invalid",
        counts.scanned,
        format!("{}", counts.approved).green(),
        format!("{}", counts.reviewed).yellow(),
        format!("{}", counts.skipped).cyan(),
        format!("{}", counts.invalid).red(),
    );
    if report.dry_run() {
        println!(
            "{} operations simulated (dry run, nothing changed)",
            format!("{}", counts.simulated).green()
        );
    } else {
        println!(
            "{} operations applied",
            format!("{}", counts.applied).green()
        );
    }
    if counts.failed > 0 {
        println!("{} operations failed:", format!("{}", counts.failed).red());
        for entry in report.failures() {
            println!(
                "  {} {}",
                entry.action.source.display(),
                entry.result.detail.as_deref().unwrap_or("unknown error").red()
            );
        }
    }
}

fn run_scan(settings: Settings, args: ScanArgs) -> Result<()> {
    let source = args.source.unwrap_or(settings.source_dir);
    if source.as_os_str().is_empty() {
        bail!("no source directory given (use --source or set source_dir)");
    }
    let mut scan_settings = settings.scan;
    if args.checksum {
        scan_settings.checksum = true;
    }

    let records = scanner::scan(&source, &scan_settings)?;
    let path = scanner::export_json(&records, &args.output_dir)?;
    println!(
        "{} files exported to {}",
        format!("{}", records.len()).green(),
        path.display().to_string().cyan()
    );
    Ok(())
}

fn generate_config(args: GenerateConfigArgs) -> Result<()> {
    let mut settings = Settings::default();
    if let Some(source) = args.source {
        settings.source_dir = absolute(&source)?;
    }
    if let Some(output) = args.output {
        settings.output_dir = absolute(&output)?;
    }

    if args.path.exists()
        && !prompt_confirm(
            &format!("{} already exists. Overwrite?", args.path.display()),
            Some(false),
        )?
    {
        return Ok(());
    }

    let rendered = toml::to_string_pretty(&settings).context("failed to render configuration")?;
    fs::write(&args.path, rendered)
        .with_context(|| format!("failed to write {}", args.path.display()))?;
    println!("Configuration written to {}", args.path.display().to_string().cyan());
    Ok(())
}

fn print_config(settings: &Settings) -> Result<()> {
    let rendered = toml::to_string_pretty(settings).context("failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
