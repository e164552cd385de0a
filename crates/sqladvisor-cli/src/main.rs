//! sqladvisor CLI - SQL review tool

mod args;
mod config;
mod output;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sqladvisor_core::{
    parse_script, plan_execution, Advisor, Engine, MemorySink, Status, Target,
};

use crate::args::{Args, Command};
use crate::config::{Config, CONFIG_FILE_NAME};
use crate::output::OutputFormatter;

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match (args.quiet, args.verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, 2) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn parse_engine(value: &str) -> Result<Engine> {
    value.parse().map_err(|e: String| miette::miette!(e))
}

fn run(args: Args) -> Result<bool> {
    match args.command {
        Command::Check {
            files,
            config: config_path,
            engine,
            engine_version,
            format,
            strict,
        } => {
            let config = if let Some(path) = config_path {
                Config::from_file(&path)?
            } else {
                Config::find_and_load()?.unwrap_or_default()
            };
            let config = config.merge_with_args(&files, &engine, &engine_version, &format);

            let engine = match &config.engine {
                Some(name) => parse_engine(name)?,
                None => Engine::default(),
            };
            let mut target = Target::new(engine);
            if let Some(version) = &config.engine_version {
                target = target.with_version(version);
            }

            if config.rules.is_empty() {
                miette::bail!(
                    "No rules configured. Add [[rule]] entries to {}",
                    CONFIG_FILE_NAME
                );
            }

            let mut script_files = Vec::new();
            for pattern in &config.files {
                if pattern.contains('*') {
                    for path in glob::glob(pattern).into_diagnostic()?.flatten() {
                        script_files.push(path);
                    }
                } else {
                    script_files.push(PathBuf::from(pattern));
                }
            }

            if script_files.is_empty() {
                miette::bail!(
                    "No script files specified. Use positional arguments or configure in {}",
                    CONFIG_FILE_NAME
                );
            }

            let advisor = Advisor::default();
            let output_format = config.output_format();
            let mut sink = MemorySink::new();
            let mut total_errors = 0;
            let mut total_warnings = 0;

            for script_file in &script_files {
                let content = fs::read_to_string(script_file).into_diagnostic()?;
                let report = advisor.check_sql(target, &content, &config.rules)?;
                if strict {
                    if let Some(rule) = report.unsupported.first() {
                        return Err(sqladvisor_core::AdvisorError::from(rule.clone()).into());
                    }
                }

                let name = script_file.display().to_string();
                OutputFormatter::new(output_format, name.clone()).print_report(&report, &content);
                report.record_into(&name, &mut sink);

                for advice in &report.advice {
                    match advice.status {
                        Status::Error => total_errors += 1,
                        Status::Warning => total_warnings += 1,
                        Status::Success => {}
                    }
                }
            }

            if !args.quiet {
                let flagged = sink
                    .active_keys()
                    .filter(|key| {
                        sink.active(key)
                            .is_some_and(|r| r.advice.iter().any(|a| !a.is_ok()))
                    })
                    .count();
                if total_errors > 0 || total_warnings > 0 {
                    eprintln!();
                    eprintln!(
                        "Found {} error(s), {} warning(s) in {} of {} file(s)",
                        total_errors,
                        total_warnings,
                        flagged,
                        script_files.len()
                    );
                } else {
                    eprintln!("All {} file(s) passed review", script_files.len());
                }
            }

            Ok(total_errors > 0)
        }

        Command::Rules { engine } => {
            let engines = match engine {
                Some(name) => vec![parse_engine(&name)?],
                None => Engine::ALL.to_vec(),
            };
            let advisor = Advisor::default();

            for engine in engines {
                println!("{}:", engine);
                for rule in advisor.registry().rules_for(engine) {
                    println!("  - {}", rule);
                }
            }

            Ok(false)
        }

        Command::Plan { file, engine } => {
            let engine = parse_engine(&engine)?;
            let content = fs::read_to_string(&file).into_diagnostic()?;

            let statements = parse_script(engine, &content)?;
            let plan = plan_execution(engine, statements.iter().map(|s| s.text.as_str()));

            println!("-- transactional ({})", plan.transactional.len());
            for stmt in &plan.transactional {
                println!("{};", stmt);
            }
            println!();
            println!("-- non-transactional ({})", plan.non_transactional.len());
            for stmt in &plan.non_transactional {
                println!("{};", stmt);
            }

            Ok(plan.is_mixed())
        }
    }
}
