//! The print job model.
//!
//! A [`PrintJob`] is one unit of content submitted to one printer.  It is
//! created per print request, never mutated, and discarded after submission.
//!
//! # Pixel vs. raw (for beginners)
//!
//! - **Pixel** content is rendered visual content (HTML) that the agent
//!   rasterises before sending it to the printer.  Receipts use this kind.
//! - **Raw** content is a printer-native command stream (ESC/POS, ZPL, ...)
//!   that the agent forwards unmodified.
//!
//! The agent also wants a `format` and a `flavor` for each job.  These are not
//! chosen by the caller: they follow from the kind by a fixed rule, see
//! [`PrintKind::format`] and [`PrintKind::flavor`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Option key the agent uses to decide whether to scale pixel content.
pub const SCALE_CONTENT: &str = "scaleContent";

/// The content kind of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintKind {
    /// Rendered HTML, rasterised by the agent.
    #[default]
    Pixel,
    /// Printer-native command stream, sent unmodified.
    Raw,
}

impl PrintKind {
    /// Returns the agent `format` for this kind.
    ///
    /// `Pixel` maps to `html`; every other kind maps to `command`.
    pub fn format(self) -> PrintFormat {
        match self {
            PrintKind::Pixel => PrintFormat::Html,
            _ => PrintFormat::Command,
        }
    }

    /// Returns the agent `flavor` for this kind.  Always `plain`.
    pub fn flavor(self) -> PrintFlavor {
        PrintFlavor::Plain
    }

    /// Returns the wire name (`"pixel"` or `"raw"`).
    pub fn as_str(self) -> &'static str {
        match self {
            PrintKind::Pixel => "pixel",
            PrintKind::Raw => "raw",
        }
    }
}

impl fmt::Display for PrintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrintKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pixel" => Ok(PrintKind::Pixel),
            "raw" => Ok(PrintKind::Raw),
            other => Err(format!("unknown print kind '{other}' (expected 'pixel' or 'raw')")),
        }
    }
}

/// The agent-side data format of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintFormat {
    Html,
    Command,
}

/// How the job data is encoded inside the JSON string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintFlavor {
    Plain,
}

/// Agent print options, merged over the defaults before submission.
///
/// The defaults are `{"scaleContent": false}`.  Caller entries win on key
/// collisions.
///
/// # Example
///
/// ```rust
/// use qzprint_core::PrintOptions;
///
/// let opts = PrintOptions::new().with("copies", 2);
/// let merged = opts.merged();
/// assert_eq!(merged["copies"], 2);
/// assert_eq!(merged["scaleContent"], false);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrintOptions(Map<String, Value>);

impl PrintOptions {
    /// Creates an empty option set (only the defaults will apply).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one option.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns `true` when the caller supplied no options.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the caller options merged over the defaults.
    pub fn merged(&self) -> Map<String, Value> {
        let mut merged = Map::new();
        merged.insert(SCALE_CONTENT.to_string(), Value::Bool(false));
        for (key, value) in &self.0 {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

impl From<Map<String, Value>> for PrintOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One job for one printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    kind: PrintKind,
    format: PrintFormat,
    flavor: PrintFlavor,
    data: String,
    target: String,
}

impl PrintJob {
    /// Builds a job, deriving `format` and `flavor` from `kind`.
    pub fn new(target: impl Into<String>, data: impl Into<String>, kind: PrintKind) -> Self {
        Self {
            kind,
            format: kind.format(),
            flavor: kind.flavor(),
            data: data.into(),
            target: target.into(),
        }
    }

    pub fn kind(&self) -> PrintKind {
        self.kind
    }

    pub fn format(&self) -> PrintFormat {
        self.format
    }

    pub fn flavor(&self) -> PrintFlavor {
        self.flavor
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the single job entry of the `data` array.
    ///
    /// ```json
    /// {"type":"pixel","format":"html","flavor":"plain","data":"<html>..</html>"}
    /// ```
    pub fn entry(&self) -> Value {
        json!({
            "type": self.kind,
            "format": self.format,
            "flavor": self.flavor,
            "data": self.data,
        })
    }

    /// Returns the `params` object of the agent's `print` call.
    pub fn to_params(&self, options: &PrintOptions) -> Value {
        json!({
            "printer": { "name": self.target },
            "options": options.merged(),
            "data": [self.entry()],
        })
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintOutcome {
    pub successful: bool,
}

impl PrintOutcome {
    pub fn success() -> Self {
        Self { successful: true }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
