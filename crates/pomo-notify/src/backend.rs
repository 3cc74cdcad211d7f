//! Notification backends for different platforms

use anyhow::{bail, Result};
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// Errors from backend selection
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Unknown notification backend: {0}")]
    UnknownBackend(String),
}

/// Seconds a kdialog popup stays on screen
const POPUP_SECONDS: u32 = 5;

/// A notification to display
#[derive(Debug, Clone, Default)]
pub struct Notification {
    pub title: String,
    pub message: String,
    /// Ask the platform to play its notification sound
    pub sound: bool,
}

impl Notification {
    /// Create a new notification with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: crate::DEFAULT_TITLE.to_string(),
            message: message.into(),
            sound: true,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Disable sound
    pub fn silent(mut self) -> Self {
        self.sound = false;
        self
    }
}

/// Available notification backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// macOS terminal-notifier
    TerminalNotifier,
    /// macOS osascript
    Osascript,
    /// Linux notify-send
    NotifySend,
    /// KDE kdialog
    Kdialog,
    /// WSL PowerShell toast
    Wsl,
    /// Print to stdout
    Echo,
}

impl Backend {
    /// Detect the best available backend for the current platform
    pub fn detect() -> Self {
        #[cfg(target_os = "macos")]
        {
            if Self::command_exists("terminal-notifier") {
                return Self::TerminalNotifier;
            }
            return Self::Osascript;
        }

        #[cfg(target_os = "linux")]
        {
            if std::env::var("WSL_DISTRO_NAME").is_ok() {
                return Self::Wsl;
            }
            if Self::command_exists("notify-send") {
                return Self::NotifySend;
            }
            if Self::command_exists("kdialog") {
                return Self::Kdialog;
            }
            return Self::Echo;
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            Self::Echo
        }
    }

    /// Resolve a configured backend name; "auto" means [`Backend::detect`]
    pub fn from_name(name: &str) -> Result<Self, NotifyError> {
        match name.trim().to_lowercase().as_str() {
            "auto" | "" => Ok(Self::detect()),
            "terminal-notifier" => Ok(Self::TerminalNotifier),
            "osascript" => Ok(Self::Osascript),
            "notify-send" => Ok(Self::NotifySend),
            "kdialog" => Ok(Self::Kdialog),
            "wsl" => Ok(Self::Wsl),
            "echo" => Ok(Self::Echo),
            other => Err(NotifyError::UnknownBackend(other.to_string())),
        }
    }

    fn command_exists(cmd: &str) -> bool {
        Command::new("which")
            .arg(cmd)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TerminalNotifier => "terminal-notifier",
            Self::Osascript => "osascript",
            Self::NotifySend => "notify-send",
            Self::Kdialog => "kdialog",
            Self::Wsl => "wsl",
            Self::Echo => "echo",
        }
    }

    /// Send a notification using this backend
    pub fn send(&self, notification: &Notification) -> Result<()> {
        debug!("Sending notification via {}: {}", self.name(), notification.title);
        match self {
            Self::TerminalNotifier => self.send_terminal_notifier(notification),
            Self::Osascript => self.send_osascript(notification),
            Self::NotifySend => self.send_notify_send(notification),
            Self::Kdialog => self.send_kdialog(notification),
            Self::Wsl => self.send_wsl(notification),
            Self::Echo => self.send_echo(notification),
        }
    }

    fn send_terminal_notifier(&self, notification: &Notification) -> Result<()> {
        let mut cmd = Command::new("terminal-notifier");
        cmd.args([
            "-title",
            &notification.title,
            "-message",
            &notification.message,
            "-group",
            "pomo",
        ]);

        if notification.sound {
            cmd.args(["-sound", "default"]);
        }

        let status = cmd.status()?;
        if !status.success() {
            bail!("terminal-notifier failed with status: {}", status);
        }
        Ok(())
    }

    fn send_osascript(&self, notification: &Notification) -> Result<()> {
        let title = notification.title.replace('"', r#"\""#);
        let message = notification.message.replace('"', r#"\""#);

        let mut script = format!(r#"display notification "{}" with title "{}""#, message, title);
        if notification.sound {
            script.push_str(r#" sound name "default""#);
        }

        let status = Command::new("osascript").args(["-e", &script]).status()?;
        if !status.success() {
            bail!("osascript failed with status: {}", status);
        }
        Ok(())
    }

    fn send_notify_send(&self, notification: &Notification) -> Result<()> {
        let mut cmd = Command::new("notify-send");
        cmd.args([&notification.title, &notification.message]);
        cmd.args(["--app-name", "pomo"]);

        let status = cmd.status()?;
        if !status.success() {
            bail!("notify-send failed with status: {}", status);
        }
        Ok(())
    }

    fn send_kdialog(&self, notification: &Notification) -> Result<()> {
        let status = Command::new("kdialog")
            .args([
                "--passivepopup",
                &notification.message,
                &POPUP_SECONDS.to_string(),
                "--title",
                &notification.title,
            ])
            .status()?;

        if !status.success() {
            bail!("kdialog failed with status: {}", status);
        }
        Ok(())
    }

    fn send_wsl(&self, notification: &Notification) -> Result<()> {
        let title = notification.title.replace('\'', "''");
        let message = notification.message.replace('\'', "''");

        let ps_script = format!(
            r#"[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] | Out-Null; $template = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02); $template.GetElementsByTagName('text')[0].AppendChild($template.CreateTextNode('{}')) | Out-Null; $template.GetElementsByTagName('text')[1].AppendChild($template.CreateTextNode('{}')) | Out-Null; [Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier('pomo').Show([Windows.UI.Notifications.ToastNotification]::new($template))"#,
            title, message
        );

        let status = Command::new("powershell.exe")
            .args(["-Command", &ps_script])
            .status()?;

        // Toasts fail often under WSL; the line on stdout still reaches the user
        if !status.success() {
            self.send_echo(notification)?;
        }
        Ok(())
    }

    fn send_echo(&self, notification: &Notification) -> Result<()> {
        println!("[{}] {}", notification.title, notification.message);
        Ok(())
    }
}
