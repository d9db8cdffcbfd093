//! # snapadmin
//!
//! Administration backend for an rsnapshot-compatible backup tool.
//!
//! ## Features
//!
//! - **Configuration editing**: Parse and re-emit the tool's line-oriented
//!   configuration file, preserving unrecognized lines verbatim
//! - **Schedule management**: Manage the tool's cron.d entries per
//!   interval, keeping disabled entries as commented-out lines
//! - **Drift detection**: Cross-reference the intervals enabled in the
//!   configuration against the intervals enabled in the schedule
//! - **Ad-hoc runs**: Trigger the tool with streamed output, with optional
//!   SMTP notification of the outcome
//! - **Host probes**: Detect a missing tool or missing privilege once and
//!   disable the affected actions with guidance
//!
//! ## Quick Start
//!
//! ```no_run
//! use snapadmin::panel::actions::Panel;
//! use snapadmin::panel::bridge::local::LocalBridge;
//! use snapadmin::panel::settings::PanelSettings;
//! use snapadmin::panel::state::PanelState;
//!
//! // Load panel settings from YAML file
//! let settings: PanelSettings = serde_yml::from_reader(std::fs::File::open("settings.yml")?)?;
//!
//! let mut state = PanelState::new(settings.tool.to_string());
//! let panel = Panel::new(settings, LocalBridge);
//!
//! // Pull both backing files into the state container
//! panel.load_config(&mut state);
//! panel.load_schedule(&mut state);
//! println!("{:?}", state.consistency());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod panel;
