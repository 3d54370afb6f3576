use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

const TITLE: &str = "EVA Validation Report";
const RULE: &str = "=====================";

/// Outcome of one check
#[derive(Debug, Clone, PartialEq)]
pub enum CheckStatus {
    /// Check passed
    Ok,
    /// File is usable but unusual
    Warning(String),
    /// File violates the format
    Failed(String),
}

impl CheckStatus {
    fn symbol(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "✓",
            CheckStatus::Warning(_) => "⚠",
            CheckStatus::Failed(_) => "✗",
        }
    }

    #[cfg(feature = "colorized_output")]
    fn ascii_symbol(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "OK",
            CheckStatus::Warning(_) => "WARN",
            CheckStatus::Failed(_) => "FAIL",
        }
    }
}

/// A named check and its outcome
#[derive(Debug, Clone)]
pub struct ValidationCheck {
    /// Check name, sometimes with a short summary in parentheses
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
}

impl ValidationCheck {
    pub(crate) fn ok(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Ok,
        }
    }

    pub(crate) fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warning(message.into()),
        }
    }

    pub(crate) fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Failed(message.into()),
        }
    }
}

/// All checks run against one EVA file
#[derive(Debug)]
pub struct ValidationReport {
    /// Checks in the order they ran
    pub checks: Vec<ValidationCheck>,
    /// Path (or label) of the validated file
    pub file_path: String,
}

impl ValidationReport {
    /// Empty report for `file_path`
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            checks: Vec::new(),
            file_path: file_path.into(),
        }
    }

    /// Record a check
    pub fn add_check(&mut self, check: ValidationCheck) {
        self.checks.push(check);
    }

    /// Look up a check by name prefix
    pub fn check(&self, name: &str) -> Option<&ValidationCheck> {
        self.checks.iter().find(|c| c.name.starts_with(name))
    }

    /// True when no check failed
    pub fn is_valid(&self) -> bool {
        !self.has_failures()
    }

    /// True when any check failed
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// True when any check warned
    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// Number of passed checks
    pub fn success_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Ok))
    }

    /// Number of warnings
    pub fn warning_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Warning(_)))
    }

    /// Number of failed checks
    pub fn failure_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&CheckStatus) -> bool) -> usize {
        self.checks.iter().filter(|c| pred(&c.status)).count()
    }

    fn verdict(&self) -> &'static str {
        if self.has_failures() {
            "Validation FAILED"
        } else if self.has_warnings() {
            "Validation PASSED with warnings"
        } else {
            "Validation PASSED"
        }
    }

    /// Render with terminal colors when the `colorized_output` feature is
    /// enabled, otherwise the same as `Display`
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            let mut output = String::new();
            output.push_str(&format!("{}\n", style(TITLE).bold().cyan()));
            output.push_str(&format!("{}\n", style(RULE).cyan()));
            output.push_str(&format!("{}: {}\n\n", style("File").bold(), self.file_path));

            for check in &self.checks {
                let symbol = Emoji(check.status.symbol(), check.status.ascii_symbol());
                match &check.status {
                    CheckStatus::Ok => {
                        output.push_str(&format!("[{}] {}\n", symbol, style(&check.name).green()));
                    }
                    CheckStatus::Warning(msg) => output.push_str(&format!(
                        "[{}] {} - {}: {}\n",
                        symbol,
                        style(&check.name).yellow(),
                        style("WARNING").yellow().bold(),
                        msg
                    )),
                    CheckStatus::Failed(msg) => output.push_str(&format!(
                        "[{}] {} - {}: {}\n",
                        symbol,
                        style(&check.name).red(),
                        style("FAILED").red().bold(),
                        msg
                    )),
                }
            }

            output.push_str(&format!(
                "\n{}: {} passed, {} warnings, {} failed\n\n",
                style("Summary").bold(),
                style(self.success_count()).green(),
                style(self.warning_count()).yellow(),
                style(self.failure_count()).red()
            ));
            let verdict = style(self.verdict()).bold();
            let verdict = if self.has_failures() {
                verdict.red()
            } else if self.has_warnings() {
                verdict.yellow()
            } else {
                verdict.green()
            };
            output.push_str(&format!("{}\n", verdict));
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", TITLE)?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "File: {}", self.file_path)?;
        writeln!(f)?;

        for check in &self.checks {
            write!(f, "[{}] {}", check.status.symbol(), check.name)?;
            match &check.status {
                CheckStatus::Ok => writeln!(f)?,
                CheckStatus::Warning(msg) => writeln!(f, " - WARNING: {}", msg)?,
                CheckStatus::Failed(msg) => writeln!(f, " - FAILED: {}", msg)?,
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} passed, {} warnings, {} failed",
            self.success_count(),
            self.warning_count(),
            self.failure_count()
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.verdict())
    }
}
