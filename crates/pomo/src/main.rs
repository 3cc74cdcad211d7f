//! pomo - Focus/break interval timer
//!
//! Usage:
//!   pomo run                    Interactive timer (default command)
//!   pomo run --focus 50         One-off durations, not saved
//!   pomo settings show          Show saved durations
//!   pomo settings set --focus N Save new durations
//!   pomo settings reset         Forget saved durations
//!   pomo stats [DAYS]           Completed sessions over the last DAYS days

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use pomo_core::{format, Paths};
use pomo_notify::Backend;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use pomo::alerts::{DesktopNotifier, LogNotifier};
use pomo::history::{HistoryNotifier, SessionLog};
use pomo::settings::{self, MAX_MINUTES};
use pomo::{
    ticker, AppConfig, FileSettingsStore, Observer, RunState, SessionController, SessionStats,
    Settings, SettingsStore, Snapshot, TickSource,
};

/// pomo - Focus/break interval timer
#[derive(Parser)]
#[command(name = "pomo")]
#[command(about = "Focus/break interval timer with long-break scheduling")]
#[command(version)]
#[command(after_help = r#"KEYS (type a letter and press Enter while running):
    <enter>, t    Start or pause
    s / p         Start / pause
    r             Reset the current period
    m             Switch between focus and break
    q             Quit

LONG BREAKS:
    A break is long when the session count is a multiple of
    (sessions before long break + 1). With the default of 4, the
    breaks at session 5, 10, 15, ... are long.

EXAMPLES:
    pomo                                # 25/5/15 minute timer
    pomo run --autostart                # Start counting immediately
    pomo run --focus 50 --short 10      # One-off durations
    pomo settings set --focus 45        # Save a longer focus period
    pomo stats 30                       # Last 30 days

FILES:
    $POMO_HOME relocates everything below under one directory.
    <config>/pomo/settings.json         Saved durations
    <config>/pomo/config.toml           Notifications, display, log level
    <data>/pomo/history/*.jsonl         Completed sessions
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive timer
    #[command(alias = "r")]
    Run {
        #[command(flatten)]
        durations: DurationArgs,

        /// Start the first focus period right away
        #[arg(long)]
        autostart: bool,

        /// Skip desktop notifications for this run
        #[arg(long)]
        no_notify: bool,
    },

    /// Show or change saved durations
    #[command(alias = "config")]
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Show statistics for completed sessions
    #[command(alias = "statistics")]
    Stats {
        /// Number of days to include (default: 7)
        #[arg(default_value = "7")]
        days: u32,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the effective settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save new durations (unspecified fields keep their current value)
    Set {
        #[command(flatten)]
        durations: DurationArgs,
    },

    /// Remove saved durations and go back to the defaults
    Reset,
}

#[derive(clap::Args, Default)]
struct DurationArgs {
    /// Focus period in minutes
    #[arg(long, value_name = "MINS", value_parser = minutes_parser())]
    focus: Option<u32>,

    /// Short break in minutes
    #[arg(long, value_name = "MINS", value_parser = minutes_parser())]
    short: Option<u32>,

    /// Long break in minutes
    #[arg(long, value_name = "MINS", value_parser = minutes_parser())]
    long: Option<u32>,

    /// Focus sessions before a long break
    #[arg(long, value_name = "N")]
    every: Option<u32>,
}

fn minutes_parser() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(1..=i64::from(MAX_MINUTES))
}

impl DurationArgs {
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(m) = self.focus {
            settings.focus_minutes = m;
        }
        if let Some(m) = self.short {
            settings.short_break_minutes = m;
        }
        if let Some(m) = self.long {
            settings.long_break_minutes = m;
        }
        if let Some(n) = self.every {
            settings.sessions_before_long_break = n;
        }
        settings
    }

    fn is_empty(&self) -> bool {
        self.focus.is_none() && self.short.is_none() && self.long.is_none() && self.every.is_none()
    }
}

// ANSI color codes
const GREEN: &str = "\x1b[0;32m";
const CYAN: &str = "\x1b[0;36m";
const YELLOW: &str = "\x1b[0;33m";
const MAGENTA: &str = "\x1b[0;35m";
const BOLD: &str = "\x1b[1m";
const NC: &str = "\x1b[0m";

/// Check if stdout is a TTY and colors should be used
fn use_colors() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

/// Conditionally apply color
fn color(code: &str, text: &str) -> String {
    if use_colors() {
        format!("{}{}{}", code, text, NC)
    } else {
        text.to_string()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = Paths::new();
    let config = AppConfig::load(&paths.config_file())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = FileSettingsStore::new(&paths.settings_file());

    match cli.command {
        Some(Commands::Run {
            durations,
            autostart,
            no_notify,
        }) => cmd_run(&paths, &config, &store, &durations, autostart, no_notify),
        Some(Commands::Settings { action }) => match action {
            Some(SettingsAction::Show { json }) => cmd_settings_show(&store, json),
            Some(SettingsAction::Set { durations }) => cmd_settings_set(&store, &durations),
            Some(SettingsAction::Reset) => cmd_settings_reset(&store),
            None => cmd_settings_show(&store, false),
        },
        Some(Commands::Stats { days }) => cmd_stats(&paths, days),
        None => cmd_run(&paths, &config, &store, &DurationArgs::default(), false, false),
    }
}

/// Run the interactive timer until the user quits
fn cmd_run(
    paths: &Paths,
    config: &AppConfig,
    store: &FileSettingsStore,
    durations: &DurationArgs,
    autostart: bool,
    no_notify: bool,
) -> Result<()> {
    let settings = durations.apply(settings::load_or_default(store));

    // Single-threaded: ticks and key presses are handled one at a time
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    // The interval needs a runtime handle at creation
    let (ticks, gate) = {
        let _guard = rt.enter();
        ticker::channel(Duration::from_secs(1))
    };
    let mut timer = SessionController::new(settings, ticks);

    timer.add_observer(TerminalView::new(
        config.display.bar_width,
        config.display.color && use_colors(),
    ));
    timer.add_notifier(LogNotifier);

    match SessionLog::new(&paths.history_dir()) {
        Ok(log) => timer.add_notifier(HistoryNotifier::new(log)),
        Err(e) => warn!("Session history disabled: {:#}", e),
    }

    if config.notify.desktop && !no_notify {
        let backend = Backend::from_name(&config.notify.backend)
            .context("Invalid [notify] backend in config")?;
        timer.add_notifier(DesktopNotifier::new(backend, config.notify.sound));
    }

    print_banner(timer.settings());

    let result = rt.block_on(event_loop(&mut timer, gate, autostart));
    // A pending stdin read cannot be cancelled; don't wait for it
    rt.shutdown_background();

    println!();
    result
}

async fn event_loop<T: TickSource>(
    timer: &mut SessionController<T>,
    mut gate: ticker::TickGate,
    autostart: bool,
) -> Result<()> {
    timer.publish();
    if autostart {
        timer.start();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = gate.wait() => timer.tick(),
            line = lines.next_line(), if stdin_open => {
                match line.context("Failed to read from stdin")? {
                    Some(line) => match Key::parse(&line) {
                        Some(Key::Quit) => break,
                        Some(key) => key.apply(timer),
                        None => println!("\nUnknown key '{}' (enter, s, p, r, m, q)", line.trim()),
                    },
                    None => stdin_open = false,
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    Ok(())
}

/// Line-based keyboard commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Toggle,
    Start,
    Pause,
    Reset,
    Mode,
    Quit,
}

impl Key {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "" | "t" | "toggle" | "space" => Some(Key::Toggle),
            "s" | "start" => Some(Key::Start),
            "p" | "pause" => Some(Key::Pause),
            "r" | "reset" => Some(Key::Reset),
            "m" | "mode" => Some(Key::Mode),
            "q" | "quit" | "exit" => Some(Key::Quit),
            _ => None,
        }
    }

    fn apply<T: TickSource>(self, timer: &mut SessionController<T>) {
        match self {
            Key::Toggle => timer.toggle(),
            Key::Start => timer.start(),
            Key::Pause => timer.pause(),
            Key::Reset => timer.reset(),
            Key::Mode => timer.toggle_mode(),
            Key::Quit => {}
        }
    }
}

fn print_banner(settings: &Settings) {
    println!("{}", color(&format!("{}{}", BOLD, MAGENTA), "POMODORO TIMER"));
    println!(
        "  {} {}m focus / {}m short break / {}m long break every {} sessions",
        color(CYAN, "Durations:"),
        settings.focus_minutes,
        settings.short_break_minutes,
        settings.long_break_minutes,
        settings.long_break_interval()
    );
    println!(
        "  {}      <enter> start/pause, r reset, m focus/break, q quit",
        color(CYAN, "Keys:")
    );
    println!();
}

/// One status line for a snapshot
fn render_line(snapshot: &Snapshot, bar_width: usize, colored: bool) -> String {
    let state = match snapshot.run_state {
        RunState::Running => (GREEN, snapshot.run_state.as_str()),
        RunState::Paused => (YELLOW, snapshot.run_state.as_str()),
        RunState::Idle => (CYAN, snapshot.run_state.as_str()),
    };
    let paint = |code: &str, text: &str| {
        if colored {
            format!("{}{}{}", code, text, NC)
        } else {
            text.to_string()
        }
    };

    format!(
        "{} [{}] {} | session {} | {}",
        paint(BOLD, &snapshot.remaining.to_string()),
        format::progress_bar(snapshot.progress, bar_width),
        snapshot.kind.description(),
        snapshot.session_count,
        paint(state.0, state.1)
    )
}

/// Observer that redraws the status line in place on a terminal
struct TerminalView {
    bar_width: usize,
    colored: bool,
    tty: bool,
    last: Option<Snapshot>,
}

impl TerminalView {
    fn new(bar_width: usize, colored: bool) -> Self {
        Self {
            bar_width,
            colored,
            tty: use_colors(),
            last: None,
        }
    }

    /// Off a terminal, only print state changes and whole minutes
    fn worth_printing(&self, snapshot: &Snapshot) -> bool {
        match &self.last {
            None => true,
            Some(last) => {
                last.run_state != snapshot.run_state
                    || last.mode != snapshot.mode
                    || last.session_count != snapshot.session_count
                    || snapshot.remaining.seconds == 0
            }
        }
    }
}

impl Observer for TerminalView {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        let line = render_line(snapshot, self.bar_width, self.colored);
        let mut stdout = std::io::stdout();

        if self.tty {
            // Window title mirrors the clock
            let _ = write!(stdout, "\x1b]0;{} - Pomodoro Timer\x07", snapshot);
            let _ = write!(stdout, "\r{}\x1b[K", line);
            let _ = stdout.flush();
        } else if self.worth_printing(snapshot) {
            let _ = writeln!(stdout, "{}", line);
        }

        self.last = Some(*snapshot);
    }
}

/// Print the effective settings
fn cmd_settings_show(store: &FileSettingsStore, json: bool) -> Result<()> {
    let settings = settings::load_or_default(store);

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    println!("{}Settings{}", BOLD, NC);
    println!();
    println!("  {}         {} minutes", color(CYAN, "Focus:"), settings.focus_minutes);
    println!(
        "  {}   {} minutes",
        color(CYAN, "Short break:"),
        settings.short_break_minutes
    );
    println!(
        "  {}    {} minutes",
        color(CYAN, "Long break:"),
        settings.long_break_minutes
    );
    println!(
        "  {}   every {} sessions",
        color(CYAN, "Long breaks:"),
        settings.long_break_interval()
    );
    println!();
    println!("Saved in {}", store.path().display());

    Ok(())
}

/// Save new durations over the current ones
fn cmd_settings_set(store: &FileSettingsStore, durations: &DurationArgs) -> Result<()> {
    if durations.is_empty() {
        println!("{} Nothing to change", color(CYAN, "[info]"));
        println!("Pass --focus, --short, --long or --every");
        return Ok(());
    }

    let settings = durations.apply(settings::load_or_default(store)).validated();
    store.save(&settings)?;

    println!("{} Settings saved", color(GREEN, "[ok]"));
    println!(
        "{}m focus / {}m short / {}m long, long break every {} sessions",
        settings.focus_minutes,
        settings.short_break_minutes,
        settings.long_break_minutes,
        settings.long_break_interval()
    );

    Ok(())
}

/// Drop saved durations
fn cmd_settings_reset(store: &FileSettingsStore) -> Result<()> {
    store.clear()?;
    println!("{} Settings reset to defaults", color(GREEN, "[ok]"));
    Ok(())
}

/// Show statistics for completed sessions
fn cmd_stats(paths: &Paths, days: u32) -> Result<()> {
    let log = SessionLog::new(&paths.history_dir())?;
    let sessions = log.sessions_for_days(Utc::now().date_naive(), days)?;
    let stats = SessionStats::from_sessions(&sessions);

    let (hours, mins) = stats.focus_time();

    println!("{}Session Statistics (Last {} days){}", BOLD, days, NC);
    println!();
    println!("  {}    {}", color(CYAN, "Total Sessions:"), stats.total_sessions);
    println!("  {}    {}", color(CYAN, "Focus Sessions:"), stats.focus_sessions);
    println!(
        "  {}            {} short, {} long",
        color(CYAN, "Breaks:"),
        stats.short_breaks,
        stats.long_breaks
    );
    println!("  {}  {}h {}m", color(CYAN, "Total Focus Time:"), hours, mins);

    if stats.focus_sessions > 0 {
        println!();
        println!(
            "  {}     {} minutes",
            color(CYAN, "Average Focus:"),
            stats.average_focus_minutes()
        );
        println!(
            "  {}       {}",
            color(CYAN, "Break Time:"),
            format::duration(stats.break_seconds as f64)
        );
    }

    Ok(())
}
