use clap::{Parser, Subcommand};
use snapadmin::panel::actions::{validation_failures, Panel};
use snapadmin::panel::bridge::local::LocalBridge;
use snapadmin::panel::result_error::error::Error;
use snapadmin::panel::result_error::result::Result;
use snapadmin::panel::result_error::WithMsg;
use snapadmin::panel::settings::PanelSettings;
use snapadmin::panel::state::PanelState;
use snapadmin::panel::timing::NextRun;
use std::fs::File;
use std::path::PathBuf;
use std::process::exit;
use tracing::error;
use validator::Validate;

/// Administration backend for an rsnapshot-compatible backup tool
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Location of panel settings file; defaults target /etc/rsnapshot.conf
    #[arg(short, long)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the parsed configuration as JSON
    Show,
    /// Validate rows and report drift between configuration and schedule
    Check,
    /// Print the next scheduled instant per enabled interval
    NextRun,
    /// Trigger an ad-hoc backup run for one interval
    Run { interval: String },
    /// Print the tool's log
    Log,
    /// Run the tool's own configuration test
    Configtest,
}

fn load_settings(path: Option<PathBuf>) -> Result<PanelSettings> {
    let path = match path {
        Some(path) => path,
        None => return Ok(PanelSettings::default()),
    };

    File::open(&path)
        .map_err(Error::from)
        .and_then(|f| {
            serde_yml::from_reader::<_, PanelSettings>(f)
                .map_err(Error::from)
                .with_msg(format!("Parse YAML settings failed: {:?}", &path))
        })
        .and_then(|settings| {
            settings
                .validate()
                .map_err(Error::from)
                .map(|_| settings)
                .with_msg(format!("Settings validation failed: {:?}", &path))
        })
}

fn run(args: Args) -> Result<()> {
    let settings = load_settings(args.settings)?;
    let mut state = PanelState::new(settings.tool.to_string());
    let panel = Panel::new(settings, LocalBridge);

    match args.command {
        Cmd::Show => {
            panel.load_config(&mut state);
            println!("{}", serde_json::to_string_pretty(&state.config)?);
        }
        Cmd::Check => {
            panel.load_config(&mut state);
            panel.load_schedule(&mut state);
            for failure in validation_failures(&state) {
                println!("invalid row: {failure}");
            }
            let report = state.consistency();
            if report.is_consistent() {
                println!("configuration and schedule agree");
            } else {
                for name in &report.missing_in_config {
                    println!("scheduled but not retained: {name}");
                }
                for name in &report.missing_in_schedule {
                    println!("retained but not scheduled: {name}");
                }
            }
        }
        Cmd::NextRun => {
            panel.load_schedule(&mut state);
            let now = chrono::Utc::now();
            for (name, next) in state.next_runs(&now) {
                match next {
                    NextRun::NonPeriodic => println!("{name}\t(no next instant)"),
                    other => println!("{name}\t{other}"),
                }
            }
        }
        Cmd::Run { interval } => {
            let status = panel.probe();
            if !status.tool_available {
                return Err(Error::ToolMissing(panel.settings().tool.to_string()));
            }
            if !status.privileged {
                return Err(Error::PrivilegeMissing);
            }
            println!("Starting {} backup...", &interval);
            panel.run_backup(&interval, &mut |line| println!("{line}"))?;
            println!("Backup finished.");
        }
        Cmd::Log => {
            print!("{}", panel.tail_log()?);
        }
        Cmd::Configtest => {
            let status = panel.probe();
            if !status.tool_available {
                return Err(Error::ToolMissing(panel.settings().tool.to_string()));
            }
            panel.config_test(&mut |line| println!("{line}"))?;
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        error!("{e}");
        exit(1);
    }
}
