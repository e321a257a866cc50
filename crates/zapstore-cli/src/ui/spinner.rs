//! Single-line progress spinner.
//!
//! The status line is owned by a render thread that repaints on a 100ms
//! tick. Everything that writes to the terminal while the spinner is alive
//! goes through its channel, so output never interleaves. [`Spinner::finish`]
//! stops and joins the thread before the final line is printed.

use std::io::{IsTerminal, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::QueueableCommand;
use crossterm::cursor::MoveToColumn;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use zapstore_core::Reporter;

use super::theme::{Theme, format_size};

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug)]
enum Msg {
    Status(String),
    Print(String),
    Stop,
}

/// Blinks between the active and pending icons every two ticks.
#[derive(Debug, Default)]
struct Frames {
    frame: usize,
}

impl Frames {
    fn next(&mut self, theme: &Theme) -> &'static str {
        self.frame = self.frame.wrapping_add(1);
        if self.frame % 4 < 2 {
            theme.icons.active
        } else {
            theme.icons.pending
        }
    }
}

/// Handle to a running spinner.
#[derive(Debug)]
pub struct Spinner {
    sender: mpsc::Sender<Msg>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner showing `status`. Nothing is animated when stdout is
    /// not a terminal.
    pub fn start(status: impl Into<String>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let animate = std::io::stdout().is_terminal();
        let status = status.into();
        let handle = thread::spawn(move || run(&receiver, status, animate));

        Self {
            sender,
            handle: Some(handle),
        }
    }

    /// Replace the status text.
    pub fn set_status(&self, status: impl Into<String>) {
        let _ = self.sender.send(Msg::Status(status.into()));
    }

    /// Print a line above the spinner.
    pub fn println(&self, line: impl Into<String>) {
        let _ = self.sender.send(Msg::Print(line.into()));
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.sender.send(Msg::Stop);
            let _ = handle.join();
        }
    }

    /// Stop with a success line.
    pub fn success(mut self, msg: &str) {
        self.stop();
        let theme = Theme::default();
        println!("  {} {msg}", theme.icons.success.with(theme.colors.success));
    }

    /// Stop with an error line.
    pub fn fail(mut self, msg: &str) {
        self.stop();
        let theme = Theme::default();
        println!("  {} {msg}", theme.icons.error.with(theme.colors.error));
    }

    /// Stop without printing anything.
    pub fn finish(mut self) {
        self.stop();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(receiver: &mpsc::Receiver<Msg>, mut status: String, animate: bool) {
    let theme = Theme::default();
    let mut frames = Frames::default();
    let mut stdout = std::io::stdout();

    loop {
        match receiver.recv_timeout(TICK) {
            Ok(Msg::Status(s)) => status = s,
            Ok(Msg::Print(line)) => {
                clear_line(&mut stdout, animate);
                let _ = writeln!(stdout, "{line}");
            }
            Ok(Msg::Stop) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                clear_line(&mut stdout, animate);
                let _ = stdout.flush();
                return;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        if animate {
            clear_line(&mut stdout, animate);
            let icon = frames.next(&theme).with(theme.colors.active);
            let _ = write!(stdout, "  {icon} {status}");
            let _ = stdout.flush();
        }
    }
}

fn clear_line(out: &mut std::io::Stdout, animate: bool) {
    if animate {
        let _ = out.queue(MoveToColumn(0));
        let _ = out.queue(Clear(ClearType::CurrentLine));
    }
}

/// Status text for a download in progress.
pub fn download_status(app_id: &str, current: u64, total: Option<u64>) -> String {
    match total {
        Some(total) if total > 0 => {
            let pct = (current.saturating_mul(100) / total).min(100);
            format!(
                "Downloading {app_id}  {pct:>3}%  {} / {}",
                format_size(current),
                format_size(total)
            )
        }
        _ => format!("Downloading {app_id}  {}", format_size(current)),
    }
}

impl Reporter for Spinner {
    fn resolving(&self, app_id: &str) {
        self.set_status(format!("Resolving {app_id}..."));
    }

    fn downloading(&self, app_id: &str, _version: &str, current: u64, total: Option<u64>) {
        self.set_status(download_status(app_id, current, total));
    }

    fn verified(&self, _app_id: &str, _version: &str) {
        let theme = Theme::default();
        self.println(format!(
            "  {} Hash verified {}",
            theme.icons.info.with(theme.colors.secondary),
            "(SHA-256)".with(theme.colors.secondary)
        ));
    }

    fn linked(&self, binary: &str, version: &str) {
        self.set_status(format!("Linking {binary} {version}..."));
    }

    fn info(&self, msg: &str) {
        let theme = Theme::default();
        self.println(format!("  {} {msg}", theme.icons.info));
    }

    fn warning(&self, msg: &str) {
        let theme = Theme::default();
        self.println(format!(
            "  {} {msg}",
            theme.icons.warning.with(theme.colors.warning)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_blink() {
        let theme = Theme::default();
        let mut frames = Frames::default();
        let seq: Vec<_> = (0..4).map(|_| frames.next(&theme)).collect();
        assert_eq!(seq, ["●", "○", "○", "●"]);
    }

    #[test]
    fn test_download_status() {
        assert_eq!(
            download_status("nak", 512, Some(1024)),
            "Downloading nak   50%  512 B / 1.0 KB"
        );
        assert_eq!(download_status("nak", 2048, None), "Downloading nak  2.0 KB");
        assert!(download_status("nak", 10, Some(0)).ends_with("10 B"));
    }

    #[test]
    fn test_spinner_stops_and_joins() {
        let spinner = Spinner::start("working");
        spinner.set_status("still working");
        spinner.info("note");
        spinner.finish();
    }
}
