// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use agenda_app::{AppState, MeetingId};
use agenda_client::Client;
use anyhow::{Context, Result, anyhow};
use config::Config;
use runtime::{DemoRuntime, HttpRuntime};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `agenda --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    init_logging(&config)?;

    let meeting = options.meeting.or_else(|| config.meeting_id());
    let mut state = AppState::default();

    if options.demo {
        let mut runtime = DemoRuntime::new(agenda_testkit::FIXTURE_SEED);
        if options.check_only {
            return Ok(());
        }
        let meeting = meeting.or_else(|| runtime.first_meeting());
        log::info!("starting demo club");
        return agenda_tui::run_app(&mut state, &mut runtime, meeting);
    }

    let base_url = config.base_url()?;
    let client = Client::new(&base_url, config.timeout()?, config.session_cookie())
        .with_context(|| {
            format!(
                "invalid [server] config in {}; fix base_url/timeout values",
                options.config_path.display()
            )
        })?;
    if options.check_only {
        client
            .fetch_reference_data()
            .with_context(|| format!("check server {base_url}"))?;
        return Ok(());
    }

    log::info!("connecting to {base_url}");
    let mut runtime = HttpRuntime::new(client);
    agenda_tui::run_app(&mut state, &mut runtime, meeting)
}

/// Sends log output to the configured file so the terminal UI stays intact.
/// `RUST_LOG` wins over the configured level.
fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| {
            format!(
                "open log file {} -- set [logging].file to a writable path",
                path.display()
            )
        })?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level()))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("initialize logging")?;
    log::debug!("logging to {}", path.display());
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    meeting: Option<MeetingId>,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        meeting: None,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--meeting" => {
                let id = iter
                    .next()
                    .and_then(|value| value.as_ref().parse::<i64>().ok())
                    .filter(|id| *id > 0)
                    .ok_or_else(|| anyhow!("--meeting requires a positive meeting id"))?;
                options.meeting = Some(MeetingId::new(id));
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("agenda");
    println!("  --config <path>          Use a specific config path");
    println!("  --meeting <id>           Open this meeting at startup");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch against a seeded in-memory club");
    println!("  --check                  Validate config and reach the server");
    println!("  --help                   Show this help");
}
