//! Inspect, change and follow the desktop light/dark preference.
//!
//! ```text
//! themesync show
//! themesync set dark
//! themesync --flag ~/.cache/theme watch --interval-ms 500
//! ```
//!
//! Set `RUST_LOG=themesync=debug` to see every flag application.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use themesync::host::os::{FileStore, FlagFile, OsColorScheme};
use themesync::{
    apply_initial_theme_with, read_persisted_mode, resolve, ColorSchemeSignal, DarkFlag,
    EffectiveTheme, NoHost, PreferenceStore, ThemeConfig, ThemeMode, ThemeSync,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "themesync", version, about = "Resolve and follow the light/dark preference")]
struct Cli {
    /// YAML settings file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Preference file (defaults to the user config directory).
    #[arg(long, global = true, value_name = "FILE")]
    store: Option<PathBuf>,

    /// File that receives `dark` or `light` whenever the theme is applied.
    #[arg(long, global = true, value_name = "FILE")]
    flag: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the stored mode, the system preference and the effective theme.
    Show,
    /// Store and apply a mode.
    Set {
        #[arg(value_enum)]
        mode: ModeArg,
    },
    /// Follow the system preference, printing each change.
    Watch {
        /// Polling interval.
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
        /// Stop after this many polls.
        #[arg(long)]
        ticks: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Light,
    Dark,
    System,
}

impl From<ModeArg> for ThemeMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Light => ThemeMode::Light,
            ModeArg::Dark => ThemeMode::Dark,
            ModeArg::System => ThemeMode::System,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ThemeConfig::from_file(path)?,
        None => ThemeConfig::default(),
    };
    let store_path = cli
        .store
        .clone()
        .or_else(FileStore::default_location)
        .context("no config directory on this platform; pass --store")?;
    let store = FileStore::new(store_path);
    let flag: Box<dyn DarkFlag> = match &cli.flag {
        Some(path) => Box::new(FlagFile::new(path)),
        None => Box::new(NoHost),
    };

    match cli.command {
        Command::Show => show(&config, &store),
        Command::Set { mode } => {
            apply_initial_theme_with(&config, &store, &OsColorScheme::new(), &flag);
            let sync = ThemeSync::mount_with_config(&config, store, OsColorScheme::new(), flag);
            sync.set_mode(mode.into());
            println!("{} ({})", sync.mode(), sync.effective());
            sync.teardown();
            Ok(())
        }
        Command::Watch { interval_ms, ticks } => {
            apply_initial_theme_with(&config, &store, &OsColorScheme::new(), &flag);
            let sync = ThemeSync::mount_with_config(&config, store, OsColorScheme::new(), flag);
            watch(&sync, Duration::from_millis(interval_ms), ticks);
            sync.teardown();
            Ok(())
        }
    }
}

fn show(config: &ThemeConfig, store: &FileStore) -> Result<()> {
    let saved = read_persisted_mode(store, &config.storage_key);
    let system_dark = OsColorScheme::new().is_dark_preferred();
    println!("store:     {}", store.path().display());
    println!("saved:     {saved}");
    println!("system:    {}", EffectiveTheme::from(system_dark));
    println!("effective: {}", resolve(saved, system_dark));
    Ok(())
}

fn watch<S, F>(sync: &ThemeSync<S, OsColorScheme, F>, interval: Duration, ticks: Option<u64>)
where
    S: PreferenceStore + 'static,
    F: DarkFlag + 'static,
{
    if !sync.is_following_system() {
        println!(
            "mode is {}; system changes will not affect the theme",
            sync.mode()
        );
    }

    let mut last = sync.effective();
    println!("{last}");

    let mut tick = 0;
    while ticks.map_or(true, |limit| tick < limit) {
        thread::sleep(interval);
        tick += 1;
        if sync.signal().poll() {
            let now = sync.effective();
            if now != last {
                println!("{now}");
                last = now;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serial_test::serial;
    use tempfile::TempDir;
    use themesync::host::os::{reset_scheme_detector, set_scheme_detector};

    use super::*;

    fn prefer_light() -> bool {
        false
    }

    #[test]
    fn test_parse_set_with_global_store() {
        let cli =
            Cli::try_parse_from(["themesync", "set", "dark", "--store", "prefs.json"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("prefs.json")));
        assert!(cli.flag.is_none());
        match cli.command {
            Command::Set { mode } => assert_eq!(ThemeMode::from(mode), ThemeMode::Dark),
            _ => panic!("expected set"),
        }
    }

    #[test]
    fn test_parse_watch_defaults() {
        let cli = Cli::try_parse_from(["themesync", "watch"]).unwrap();
        match cli.command {
            Command::Watch { interval_ms, ticks } => {
                assert_eq!(interval_ms, 1000);
                assert_eq!(ticks, None);
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["themesync", "set", "sepia"]).is_err());
        assert!(Cli::try_parse_from(["themesync", "set"]).is_err());
    }

    #[test]
    fn test_mode_arg_mapping() {
        assert_eq!(ThemeMode::from(ModeArg::Light), ThemeMode::Light);
        assert_eq!(ThemeMode::from(ModeArg::Dark), ThemeMode::Dark);
        assert_eq!(ThemeMode::from(ModeArg::System), ThemeMode::System);
    }

    #[test]
    #[serial]
    fn test_set_dark_writes_store_and_flag() {
        set_scheme_detector(prefer_light);
        let dir = TempDir::new().unwrap();
        let store_path = dir.path().join("prefs.json");
        let flag_path = dir.path().join("flag");

        let cli = Cli::try_parse_from([
            "themesync",
            "set",
            "dark",
            "--store",
            store_path.to_str().unwrap(),
            "--flag",
            flag_path.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).unwrap();

        let store = FileStore::new(&store_path);
        assert_eq!(
            store.get("rss-reader-theme").unwrap().as_deref(),
            Some("dark")
        );
        assert_eq!(fs::read_to_string(&flag_path).unwrap(), "dark\n");

        reset_scheme_detector();
    }
}
