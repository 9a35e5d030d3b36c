use crate::migration::Direction;
use console::style;
use std::time::Duration;

/// Prints one line per migration step as a plan runs
pub struct StepReporter {
    total_steps: usize,
    current_step: usize,
    quiet: bool,
}

impl StepReporter {
    pub fn new(total_steps: usize, quiet: bool) -> Self {
        Self {
            total_steps,
            current_step: 0,
            quiet,
        }
    }

    pub fn start_step(&mut self, version: u64, name: &str, direction: Direction) {
        self.current_step += 1;
        if self.quiet {
            return;
        }

        let arrow = match direction {
            Direction::Up => style("↑").cyan(),
            Direction::Down => style("↓").magenta(),
        };
        if self.total_steps > 1 {
            println!(
                "  [{}/{}] {} {}_{}",
                self.current_step, self.total_steps, arrow, version, name
            );
        } else {
            println!("  {} {}_{}", arrow, version, name);
        }
    }

    pub fn complete_step(&self, version: u64, duration: Duration) {
        if self.quiet {
            return;
        }
        println!(
            "    {} now at version {} ({})",
            style("✓").green(),
            version,
            style(format_duration(duration)).dim()
        );
    }

    pub fn fail_step(&self, version: u64, error: &dyn std::fmt::Display) {
        println!(
            "{} Migration {} failed: {}",
            style("✗").red(),
            version,
            style(error.to_string()).red()
        );
    }

    pub fn summary(&self, from: u64, to: u64, total_duration: Duration) {
        if self.quiet {
            return;
        }
        println!(
            "{} Migrated {} → {} in {}",
            style("✓").green(),
            from,
            to,
            style(format_duration(total_duration)).green()
        );
    }
}

pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let millis = d.subsec_millis();

    if total_secs == 0 {
        format!("{}ms", millis)
    } else if total_secs < 60 {
        if millis >= 100 {
            format!("{}.{}s", total_secs, millis / 100)
        } else {
            format!("{}s", total_secs)
        }
    } else if total_secs < 3600 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m{}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    } else {
        let hours = total_secs / 3600;
        let mins = (total_secs % 3600) / 60;
        if mins > 0 {
            format!("{}h{}m", hours, mins)
        } else {
            format!("{}h", hours)
        }
    }
}
