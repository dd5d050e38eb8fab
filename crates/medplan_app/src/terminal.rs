use std::io::{self, BufRead, Write};

use medplan_core::date::format_display;
use medplan_core::display::{DisplaySurface, Notice, ScheduleView, Severity};
use medplan_core::regimen::DAILY_DOSES;
use medplan_core::schedule::TOTAL_DAYS;
use tracing::warn;

const BAR_WIDTH: usize = 30;

/// Draws schedules as plain-text tables.
///
/// Regular output goes to `out`, error notices to `err`, and confirmation
/// answers are read line by line from `input`.
pub struct TerminalSurface<O, E, I> {
    out: O,
    err: E,
    input: I,
    assume_yes: bool,
    print_only: bool,
}

impl TerminalSurface<io::Stdout, io::Stderr, io::StdinLock<'static>> {
    pub fn stdio(assume_yes: bool) -> Self {
        Self::new(io::stdout(), io::stderr(), io::stdin().lock(), assume_yes)
    }
}

impl<O: Write, E: Write, I: BufRead> TerminalSurface<O, E, I> {
    pub fn new(out: O, err: E, input: I, assume_yes: bool) -> Self {
        Self {
            out,
            err,
            input,
            assume_yes,
            print_only: false,
        }
    }

    /// Silences everything except the printable table and error notices.
    pub fn print_only(mut self) -> Self {
        self.print_only = true;
        self
    }

    pub fn into_parts(self) -> (O, E) {
        (self.out, self.err)
    }

    fn write_table(&mut self, view: &ScheduleView) -> io::Result<()> {
        write!(self.out, "{:>3}  {:<10}", "Day", "Date")?;
        for dose in &DAILY_DOSES {
            write!(self.out, "  {:<13}", dose.medication)?;
        }
        writeln!(self.out, "  Status")?;
        for row in &view.rows {
            write!(
                self.out,
                "{:>3}  {:<10}",
                row.day_number,
                format_display(row.date)
            )?;
            for dose in &DAILY_DOSES {
                write!(self.out, "  {:<13}", dose.label())?;
            }
            writeln!(self.out, "  {}", if row.completed { "[x]" } else { "[ ]" })?;
        }
        Ok(())
    }

    fn write_header(&mut self, view: &ScheduleView) -> io::Result<()> {
        writeln!(
            self.out,
            "Treatment: {} - {}",
            format_display(view.start_date),
            format_display(view.end_date)
        )?;
        writeln!(
            self.out,
            "Progress: {}/{} days {} {}%",
            view.progress.completed_count,
            TOTAL_DAYS,
            progress_bar(view.progress.percent),
            view.progress.rounded_percent()
        )
    }

    fn write_view(&mut self, view: &ScheduleView) -> io::Result<()> {
        self.write_header(view)?;
        if let Some(banner) = view.progress.banner() {
            writeln!(self.out, "{banner}")?;
        }
        writeln!(self.out)?;
        self.write_table(view)?;
        self.out.flush()
    }

    fn write_print(&mut self, view: &ScheduleView) -> io::Result<()> {
        self.write_header(view)?;
        writeln!(self.out)?;
        self.write_table(view)?;
        self.out.flush()
    }

    fn ask(&mut self, prompt: &str) -> io::Result<bool> {
        write!(self.out, "{prompt} [y/N] ")?;
        self.out.flush()?;
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        let answer = answer.trim();
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }
}

impl<O: Write, E: Write, I: BufRead> DisplaySurface for TerminalSurface<O, E, I> {
    fn render(&mut self, view: &ScheduleView) {
        if self.print_only {
            return;
        }
        if let Err(err) = self.write_view(view) {
            warn!(%err, "failed to write schedule");
        }
    }

    fn notify(&mut self, notice: &Notice) {
        let written = match notice.severity {
            Severity::Error => writeln!(self.err, "error: {}", notice.text),
            Severity::Success if self.print_only => Ok(()),
            Severity::Success => writeln!(self.out, "{}", notice.text),
        };
        if let Err(err) = written {
            warn!(%err, "failed to write notice");
        }
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        match self.ask(prompt) {
            Ok(answer) => answer,
            Err(err) => {
                warn!(%err, "could not read confirmation");
                false
            }
        }
    }

    fn reset(&mut self) {}

    fn print(&mut self, view: &ScheduleView) {
        if let Err(err) = self.write_print(view) {
            warn!(%err, "failed to print schedule");
        }
    }
}

fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
