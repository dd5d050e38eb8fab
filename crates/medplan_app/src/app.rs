use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use medplan_core::clock::{Clock, FixedClock, SystemClock};
use medplan_core::date::parse_day_key;
use medplan_core::display::DisplaySurface;
use medplan_core::store::FileStore;
use medplan_core::transfer::BACKUP_FILE_NAME;
use medplan_core::ScheduleEngine;
use notify::{RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::terminal::TerminalSurface;

/// medplan - 60-day medication checklist
#[derive(Debug, Parser)]
#[command(name = "medplan")]
#[command(about = "Track a 60-day medication plan and prescription renewal", long_about = None)]
pub struct Cli {
    /// Directory holding the saved plan (overrides MEDPLAN_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Treat this YYYY-MM-DD date as today (overrides MEDPLAN_TODAY)
    #[arg(long, global = true)]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show the saved plan
    Show,
    /// Build a new 60-day plan, replacing the saved one
    Generate {
        /// First day of treatment (YYYY-MM-DD), defaults to today
        start: Option<String>,
    },
    /// Delete the saved plan
    Clear {
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Write a backup of the saved plan
    Export {
        /// Destination file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace the saved plan with a backup
    Import { file: PathBuf },
    /// Print the schedule without notices or warnings
    Print,
    /// Redraw whenever the saved plan changes on disk
    Watch,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) data_dir: PathBuf,
    pub(crate) today: Option<NaiveDate>,
    pub(crate) assume_yes: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("MEDPLAN_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(today) = std::env::var("MEDPLAN_TODAY") {
            config.set_today(&today).context("invalid MEDPLAN_TODAY")?;
        }
        if let Ok(flag) = std::env::var("MEDPLAN_ASSUME_YES") {
            config.assume_yes = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }
        Ok(config)
    }

    /// Applies command-line overrides on top of the environment.
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        if let Some(dir) = &cli.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(today) = &cli.today {
            self.set_today(today).context("invalid --today")?;
        }
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn set_today(&mut self, raw: &str) -> Result<()> {
        self.today = Some(parse_day_key(raw)?);
        Ok(())
    }

    fn clock(&self) -> Box<dyn Clock> {
        match self.today {
            Some(day) => Box::new(FixedClock(day)),
            None => Box::new(SystemClock),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("medplan");
        Self {
            data_dir,
            today: None,
            assume_yes: false,
        }
    }
}

pub fn build_engine(config: &AppConfig) -> ScheduleEngine {
    ScheduleEngine::builder()
        .with_store(Box::new(FileStore::new(&config.data_dir)))
        .with_clock(config.clock())
        .build()
}

pub fn run(config: AppConfig, command: Command) -> Result<()> {
    info!(data_dir = %config.data_dir.display(), ?command, "starting");
    let mut engine = build_engine(&config);

    match command {
        Command::Print => {
            let mut surface = TerminalSurface::stdio(config.assume_yes).print_only();
            engine.initialize(&mut surface);
            engine.print(&mut surface);
        }
        Command::Watch => {
            let mut surface = TerminalSurface::stdio(config.assume_yes);
            watch(&config, &mut engine, &mut surface)?;
        }
        Command::Clear { yes } => {
            let mut surface = TerminalSurface::stdio(config.assume_yes || yes);
            engine.clear(&mut surface);
        }
        other => {
            let mut surface = TerminalSurface::stdio(config.assume_yes);
            dispatch(&mut engine, &mut surface, other)?;
        }
    }
    Ok(())
}

/// Runs one user action against `surface`. `Watch` is handled by [`run`].
pub fn dispatch(
    engine: &mut ScheduleEngine,
    surface: &mut dyn DisplaySurface,
    command: Command,
) -> Result<()> {
    match command {
        Command::Show => engine.initialize(surface),
        Command::Generate { start } => match start {
            Some(start) => engine.generate_from(surface, &start),
            None => engine.generate(surface),
        },
        Command::Clear { .. } => engine.clear(surface),
        Command::Export { output } => {
            if let Some(bytes) = engine.export(surface) {
                let path = output.unwrap_or_else(|| PathBuf::from(BACKUP_FILE_NAME));
                fs::write(&path, bytes)
                    .with_context(|| format!("failed to write backup to {}", path.display()))?;
                info!(path = %path.display(), "backup written");
            }
        }
        Command::Import { file } => {
            let bytes = fs::read(&file)
                .with_context(|| format!("failed to read backup {}", file.display()))?;
            engine.import(surface, &bytes);
        }
        Command::Print => {
            engine.initialize(surface);
            engine.print(surface);
        }
        Command::Watch => anyhow::bail!("watch needs an interactive terminal"),
    }
    Ok(())
}

fn watch(
    config: &AppConfig,
    engine: &mut ScheduleEngine,
    surface: &mut dyn DisplaySurface,
) -> Result<()> {
    fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "failed to create data directory {}",
            config.data_dir.display()
        )
    })?;

    engine.initialize(surface);
    let mut last_seen = engine.store().load_raw();

    let (tx, rx) = mpsc::channel::<notify::Result<notify::Event>>();
    let mut watcher = notify::recommended_watcher(tx).context("failed to start watcher")?;
    watcher
        .watch(&config.data_dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", config.data_dir.display()))?;
    info!(path = %config.data_dir.display(), "watching for plan changes");

    for event in rx {
        match event {
            Ok(event) => {
                debug!(?event, "filesystem change detected");
                redraw_if_changed(engine, surface, &mut last_seen);
            }
            Err(err) => warn!(%err, "watch error"),
        }
    }
    Ok(())
}

/// Redisplays the plan when its stored bytes differ from `last_seen`.
///
/// Redrawing re-saves the plan, so `last_seen` is refreshed afterwards and the
/// event fired by that save is ignored. A plan removed by another process
/// takes the schedule off the surface. Returns whether anything was redrawn.
pub fn redraw_if_changed(
    engine: &mut ScheduleEngine,
    surface: &mut dyn DisplaySurface,
    last_seen: &mut Option<String>,
) -> bool {
    let current = engine.store().load_raw();
    if current == *last_seen {
        return false;
    }
    info!(present = current.is_some(), "saved plan changed");
    engine.initialize(surface);
    *last_seen = engine.store().load_raw();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use medplan_core::display::{Notice, ScheduleView};
    use tempfile::tempdir;

    #[derive(Default)]
    struct Collect {
        views: usize,
        resets: usize,
        notices: Vec<Notice>,
    }

    impl DisplaySurface for Collect {
        fn render(&mut self, _view: &ScheduleView) {
            self.views += 1;
        }

        fn notify(&mut self, notice: &Notice) {
            self.notices.push(notice.clone());
        }

        fn confirm(&mut self, _prompt: &str) -> bool {
            false
        }

        fn reset(&mut self) {
            self.resets += 1;
        }

        fn print(&mut self, _view: &ScheduleView) {}
    }

    fn config_in(dir: &Path) -> AppConfig {
        AppConfig {
            data_dir: dir.to_path_buf(),
            today: NaiveDate::from_ymd_opt(2024, 1, 10),
            assume_yes: false,
        }
    }

    #[test]
    fn cli_overrides_environment_defaults() {
        let cli = Cli::parse_from([
            "medplan",
            "--data-dir",
            "/tmp/plans",
            "--today",
            "2024-02-01",
            "generate",
            "2024-01-01",
        ]);
        let mut config = AppConfig::default();
        config.apply_cli(&cli).unwrap();
        assert_eq!(config.data_dir(), Path::new("/tmp/plans"));
        assert_eq!(config.today, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(
            cli.command,
            Some(Command::Generate {
                start: Some("2024-01-01".into())
            })
        );
    }

    #[test]
    fn bad_today_override_is_rejected() {
        let cli = Cli::parse_from(["medplan", "--today", "yesterday"]);
        assert!(AppConfig::default().apply_cli(&cli).is_err());
    }

    #[test]
    fn export_writes_backup_file_that_imports_elsewhere() {
        let temp = tempdir().expect("tempdir");
        let config = config_in(&temp.path().join("store"));
        let mut engine = build_engine(&config);
        let mut surface = Collect::default();

        dispatch(
            &mut engine,
            &mut surface,
            Command::Generate {
                start: Some("2024-01-01".into()),
            },
        )
        .unwrap();
        let backup = temp.path().join(BACKUP_FILE_NAME);
        dispatch(
            &mut engine,
            &mut surface,
            Command::Export {
                output: Some(backup.clone()),
            },
        )
        .unwrap();
        assert!(backup.exists());

        let other = config_in(&temp.path().join("other"));
        let mut restored = build_engine(&other);
        dispatch(&mut restored, &mut surface, Command::Import { file: backup }).unwrap();
        assert_eq!(restored.store().load(), engine.store().load());
        assert_eq!(surface.notices.last(), Some(&Notice::success("Restored!")));
    }

    #[test]
    fn export_without_plan_writes_nothing() {
        let temp = tempdir().expect("tempdir");
        let config = config_in(&temp.path().join("store"));
        let mut engine = build_engine(&config);
        let mut surface = Collect::default();
        let backup = temp.path().join(BACKUP_FILE_NAME);

        dispatch(
            &mut engine,
            &mut surface,
            Command::Export {
                output: Some(backup.clone()),
            },
        )
        .unwrap();
        assert!(!backup.exists());
        assert_eq!(surface.notices, vec![Notice::error("No data.")]);
    }

    #[test]
    fn missing_import_file_is_an_error() {
        let temp = tempdir().expect("tempdir");
        let mut engine = build_engine(&config_in(temp.path()));
        let mut surface = Collect::default();
        let result = dispatch(
            &mut engine,
            &mut surface,
            Command::Import {
                file: temp.path().join("missing.json"),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn show_redraws_saved_plan() {
        let temp = tempdir().expect("tempdir");
        let config = config_in(temp.path());
        let mut surface = Collect::default();
        dispatch(
            &mut build_engine(&config),
            &mut surface,
            Command::Generate { start: None },
        )
        .unwrap();

        let mut engine = build_engine(&config);
        dispatch(&mut engine, &mut surface, Command::Show).unwrap();
        assert_eq!(surface.views, 2);
        assert_eq!(engine.state().start_input, "2024-01-10");
    }

    fn watching(config: &AppConfig) -> (ScheduleEngine, Collect, Option<String>) {
        let mut engine = build_engine(config);
        let mut surface = Collect::default();
        engine.initialize(&mut surface);
        let last_seen = engine.store().load_raw();
        (engine, surface, last_seen)
    }

    #[test]
    fn own_save_does_not_trigger_a_redraw() {
        let temp = tempdir().expect("tempdir");
        let config = config_in(temp.path());
        let (mut engine, mut surface, _) = watching(&config);
        engine.generate_from(&mut surface, "2024-01-01");
        let mut last_seen = engine.store().load_raw();
        let views = surface.views;

        assert!(!redraw_if_changed(&mut engine, &mut surface, &mut last_seen));
        assert_eq!(surface.views, views);
    }

    #[test]
    fn save_from_another_process_is_redrawn() {
        let temp = tempdir().expect("tempdir");
        let config = config_in(temp.path());
        let (mut engine, mut surface, mut last_seen) = watching(&config);
        assert!(last_seen.is_none());

        let mut other = build_engine(&config);
        other.generate_from(&mut Collect::default(), "2023-12-20");

        assert!(redraw_if_changed(&mut engine, &mut surface, &mut last_seen));
        assert_eq!(surface.views, 1);
        assert_eq!(engine.state().start_input, "2023-12-20");
        assert_eq!(last_seen, engine.store().load_raw());
        assert!(!redraw_if_changed(&mut engine, &mut surface, &mut last_seen));
    }

    #[test]
    fn clear_from_another_process_resets_the_surface() {
        let temp = tempdir().expect("tempdir");
        let config = config_in(temp.path());
        build_engine(&config).generate_from(&mut Collect::default(), "2024-01-01");
        let (mut engine, mut surface, mut last_seen) = watching(&config);
        assert_eq!(surface.views, 1);

        build_engine(&config).store().clear().expect("clear");

        assert!(redraw_if_changed(&mut engine, &mut surface, &mut last_seen));
        assert_eq!(surface.resets, 1);
        assert!(engine.state().view.is_none());
        assert!(last_seen.is_none());
        assert_eq!(surface.notices.last(), Some(&Notice::success("Data cleared.")));
    }
}
