use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Success,
    Error,
    Info,
    Warning,
}

impl Kind {
    fn as_str(self) -> &'static str {
        match self {
            Kind::Success => "success",
            Kind::Error => "error",
            Kind::Info => "info",
            Kind::Warning => "warning",
        }
    }
}

/// User-facing messages in the selected format
///
/// Logs go to stderr through `tracing`; this is what the command itself
/// reports. Errors are printed even in quiet mode.
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.message(Kind::Success, msg.as_ref());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        self.message(Kind::Error, msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.message(Kind::Info, msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.message(Kind::Warning, msg.as_ref());
    }

    fn message(&self, kind: Kind, msg: &str) {
        if self.quiet && kind != Kind::Error {
            return;
        }

        match self.format {
            OutputFormat::Human => match kind {
                Kind::Success => println!("{} {}", "✓".green(), msg),
                Kind::Error => eprintln!("{} {}", "✗".red(), msg),
                Kind::Info => println!("{}", msg),
                Kind::Warning => println!("{} {}", "⚠".yellow(), msg),
            },
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": kind.as_str(),
                    "message": msg
                }));
            }
        }
    }

    /// Print a rendered block (tables, lists) in human mode; ignored for JSON output
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.quiet || self.format != OutputFormat::Human {
            return;
        }
        println!("{}", msg.as_ref());
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet && self.format != OutputFormat::Human {
            return;
        }

        self.print_json(data);
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(data).unwrap_or_default());
            }
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Human => {
                println!("{}", data);
            }
        }
    }
}
