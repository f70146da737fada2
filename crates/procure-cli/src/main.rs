// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod render;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use procure_app::{
    AssistantCommand, AssistantState, DashboardCommand, DemoMode, Identity, InsightsApi,
    ORG_OPTIONS, Role, Runtime, Session, ViewMode,
};
use std::env;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::{info, warn};

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
            "load config {}; run `procure --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    init_logging(&config)?;

    let client = procure_api::Client::new(config.api_base_url(), config.api_timeout()?)
        .with_context(|| {
            format!(
                "invalid [api] config in {}; fix base_url/timeout values",
                options.config_path.display()
            )
        })?;
    if options.check_only {
        return Ok(());
    }

    let command = options.command.clone().ok_or_else(|| {
        anyhow!("no command given; pass --health, --dashboard, or --ask <scenario>")
    })?;

    let identity = Identity::new(
        options.org.as_deref().unwrap_or(config.org_id()),
        options.role.as_deref().unwrap_or(config.role()),
    );
    for warning in identity_warnings(&identity) {
        warn!("{warning}");
    }
    let demo_mode = DemoMode::new(options.cached_ai || config.use_cached_ai());
    info!(
        org_id = %identity.org_id,
        role = %identity.role,
        base_url = client.base_url(),
        "starting"
    );

    let assistant = AssistantState::with_context_defaults(
        config.assistant_org_type(),
        config.assistant_project_type(),
        OffsetDateTime::now_utc(),
    );
    let mut runtime = Runtime::new(
        client,
        Session::new(identity, demo_mode),
        config.reorder_limit(),
    )
    .with_assistant(assistant);

    print!("{}", execute(&mut runtime, &command)?);
    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    let level = config.log_level()?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

/// The server decides which orgs and roles exist, so unfamiliar values are
/// only flagged.
fn identity_warnings(identity: &Identity) -> Vec<String> {
    let mut warnings = Vec::new();
    if !ORG_OPTIONS.contains(&identity.org_id.as_str()) {
        warnings.push(format!(
            "org {:?} is not one of the demo orgs ({})",
            identity.org_id,
            ORG_OPTIONS.join(", ")
        ));
    }
    if Role::parse(&identity.role).is_none() {
        let known: Vec<&str> = Role::ALL.iter().map(|role| role.as_str()).collect();
        warnings.push(format!(
            "role {:?} is not a known role ({})",
            identity.role,
            known.join(", ")
        ));
    }
    warnings
}

/// Drives one command to completion and returns the text to print.
fn execute<A: InsightsApi>(runtime: &mut Runtime<A>, command: &Command) -> Result<String> {
    match command {
        Command::Health => {
            let response = runtime.check_health().context("health check failed")?;
            Ok(render::health(&response))
        }
        Command::Dashboard { select, chart } => {
            runtime.dispatch_dashboard(DashboardCommand::LoadDemoData);
            runtime.run_pending();
            if let Some(error) = runtime.dashboard().demo().phase.error() {
                bail!("load demo data: {error}");
            }

            if let Some(sku) = select {
                if !runtime.dashboard().rows().iter().any(|row| &row.sku == sku) {
                    bail!("sku {sku:?} is not in the reorder list; pick one of the listed rows");
                }
                runtime.dispatch_dashboard(DashboardCommand::SelectRow(sku.clone()));
                runtime.run_pending();
            }
            if *chart {
                runtime.dispatch_dashboard(DashboardCommand::SetViewMode(ViewMode::Chart));
            }
            Ok(render::dashboard(runtime.dashboard()))
        }
        Command::Ask(ask) => {
            // The sample prompt sets its own context; explicit flags win.
            match &ask.scenario {
                Some(scenario) => {
                    runtime.dispatch_assistant(AssistantCommand::SetScenario(scenario.clone()));
                }
                None => runtime.dispatch_assistant(AssistantCommand::ApplySamplePrompt),
            }
            if let Some(sku) = &ask.sku {
                runtime.dispatch_assistant(AssistantCommand::SetSelectedSku(sku.clone()));
            }
            if let Some(org_type) = &ask.org_type {
                runtime.dispatch_assistant(AssistantCommand::SetOrgType(org_type.clone()));
            }
            if let Some(project_type) = &ask.project_type {
                runtime.dispatch_assistant(AssistantCommand::SetProjectType(project_type.clone()));
            }
            runtime.dispatch_assistant(AssistantCommand::SendPrompt);
            runtime.run_pending();
            Ok(render::assistant(runtime.assistant()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Health,
    Dashboard { select: Option<String>, chart: bool },
    Ask(AskOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct AskOptions {
    /// `None` sends the built-in sample prompt.
    scenario: Option<String>,
    sku: Option<String>,
    org_type: Option<String>,
    project_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    org: Option<String>,
    role: Option<String>,
    cached_ai: bool,
    command: Option<Command>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        org: None,
        role: None,
        cached_ai: false,
        command: None,
    };
    let mut health = false;
    let mut dashboard = false;
    let mut chart = false;
    let mut select = None;
    let mut ask: Option<AskOptions> = None;
    let mut sku = None;
    let mut org_type = None;
    let mut project_type = None;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let path = required(&mut iter, "--config", "a file path")?;
                options.config_path = PathBuf::from(path);
            }
            "--org" => options.org = Some(required(&mut iter, "--org", "an org id")?),
            "--role" => options.role = Some(required(&mut iter, "--role", "a role")?),
            "--cached-ai" => options.cached_ai = true,
            "--health" => health = true,
            "--dashboard" => dashboard = true,
            "--chart" => chart = true,
            "--select" => select = Some(required(&mut iter, "--select", "a sku")?),
            "--ask" => {
                ask = Some(AskOptions {
                    scenario: Some(required(&mut iter, "--ask", "a scenario")?),
                    ..AskOptions::default()
                });
            }
            "--sample" => ask = Some(AskOptions::default()),
            "--sku" => sku = Some(required(&mut iter, "--sku", "a sku")?),
            "--org-type" => org_type = Some(required(&mut iter, "--org-type", "an org type")?),
            "--project-type" => {
                project_type = Some(required(&mut iter, "--project-type", "a project type")?);
            }
            "--print-config-path" => options.print_config_path = true,
            "--print-example-config" => options.print_example = true,
            "--check" => options.check_only = true,
            "--help" | "-h" => options.show_help = true,
            unknown => {
                bail!("unknown argument {unknown:?}; run with --help to see supported options");
            }
        }
    }

    let chosen = usize::from(health) + usize::from(dashboard) + usize::from(ask.is_some());
    if chosen > 1 {
        bail!("pick one of --health, --dashboard, or --ask/--sample");
    }
    if (select.is_some() || chart) && !dashboard {
        bail!("--select and --chart only apply to --dashboard");
    }
    if (sku.is_some() || org_type.is_some() || project_type.is_some()) && ask.is_none() {
        bail!("--sku, --org-type, and --project-type only apply to --ask or --sample");
    }

    options.command = if health {
        Some(Command::Health)
    } else if dashboard {
        Some(Command::Dashboard { select, chart })
    } else {
        ask.map(|ask| {
            Command::Ask(AskOptions {
                sku,
                org_type,
                project_type,
                ..ask
            })
        })
    };

    Ok(options)
}

fn required<S: AsRef<str>>(
    iter: &mut impl Iterator<Item = S>,
    flag: &str,
    what: &str,
) -> Result<String> {
    iter.next()
        .map(|value| value.as_ref().to_owned())
        .ok_or_else(|| anyhow!("{flag} requires {what}"))
}

fn print_help() {
    println!("procure: insights dashboard and procurement assistant client");
    println!("  --config <path>          Use a specific config path");
    println!("  --org <id>               Org to act as (default from [identity])");
    println!("  --role <role>            Role to act as (BUYER or ADMIN)");
    println!("  --cached-ai              Ask the server for cached assistant replies");
    println!("  --health                 Check that the insights API is up");
    println!("  --dashboard              Load demo data and show reorder predictions");
    println!("    --select <sku>         Select a row and show its bundles");
    println!("    --chart                Show last order quantities as a chart");
    println!("  --ask <scenario>         Ask the procurement assistant");
    println!("  --sample                 Ask the assistant the sample prompt");
    println!("    --sku <sku>            Sku context for the assistant");
    println!("    --org-type <type>      Org type context for the assistant");
    println!("    --project-type <type>  Project type context for the assistant");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and client setup");
    println!("  --help                   Show this help");
}
