//! Display formatting helpers

/// Format a number of seconds as a zero-padded `MM:SS` clock
pub fn clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Format a duration in seconds for humans ("45s", "12m 5s", "1h 30m")
pub fn duration(seconds: f64) -> String {
    let secs = seconds.max(0.0).round() as u64;
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        let (m, s) = (secs / 60, secs % 60);
        if s == 0 {
            format!("{}m", m)
        } else {
            format!("{}m {}s", m, s)
        }
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Render a fraction in [0, 1] as a block progress bar of `width` cells
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    let filled = ((width as f64) * fraction).floor() as usize;
    let empty = width - filled.min(width);
    format!("{}{}", "\u{2588}".repeat(filled.min(width)), "\u{2591}".repeat(empty))
}
