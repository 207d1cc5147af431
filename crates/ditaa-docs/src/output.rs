//! Colored terminal output.

use std::path::Path;

use console::{Style, Term};
use ditaa_builder::BuildReport;

/// Status lines on stderr.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a highlighted message (cyan bold).
    pub(crate) fn highlight(&self, msg: &str) {
        let _ = self
            .term
            .write_line(&self.cyan_bold.apply_to(msg).to_string());
    }

    /// Print the outcome of a build pass.
    pub(crate) fn report(&self, report: &BuildReport, output_dir: &Path) {
        self.success(&build_summary(report, output_dir));
        if !report.warnings.is_empty() {
            self.warning(&format!("{} warning(s), see log above", report.warnings.len()));
        }
    }
}

fn build_summary(report: &BuildReport, output_dir: &Path) -> String {
    format!(
        "Built {} document(s) to {} ({} diagram(s) rendered, {} cached)",
        report.documents,
        output_dir.display(),
        report.rendered,
        report.cache_hits
    )
}
