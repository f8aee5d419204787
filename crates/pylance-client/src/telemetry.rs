//! Rendering of server telemetry notifications into status text.

use pylance_core::PackageName;
use serde::Deserialize;
use serde_json::Value;

/// Notification method the server publishes telemetry under.
pub const TELEMETRY_EVENT_METHOD: &str = "telemetry/event";

/// Event name marking the end of a full analysis pass.
pub const ANALYSIS_COMPLETE_EVENT: &str = "language_server/analysis_complete";

/// A `telemetry/event` notification payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryEvent {
    /// Which event this is, e.g. `language_server/analysis_complete`.
    #[serde(rename = "EventName", default)]
    pub event_name: String,
    /// Numeric measurements attached to the event.
    #[serde(rename = "Measurements", default)]
    pub measurements: Measurements,
}

/// Measurements attached to an analysis-complete event.
///
/// All fields arrive as numbers; `isFirstRun` is a 0/1 flag.
#[derive(Debug, Clone, Deserialize)]
pub struct Measurements {
    /// Files analyzed in this pass; `-1` when the server omitted it.
    #[serde(rename = "numFilesAnalyzed", default = "minus_one")]
    pub num_files_analyzed: i64,
    /// Total files in the program.
    #[serde(rename = "numFilesInProgram", default)]
    pub num_files_in_program: i64,
    /// Wall-clock duration of the pass in milliseconds.
    #[serde(rename = "elapsedMs", default)]
    pub elapsed_ms: f64,
    /// Nonzero on the first analysis after server start.
    #[serde(rename = "isFirstRun", default)]
    pub is_first_run: f64,
}

impl Default for Measurements {
    fn default() -> Self {
        Self {
            num_files_analyzed: minus_one(),
            num_files_in_program: 0,
            elapsed_ms: 0.0,
            is_first_run: 0.0,
        }
    }
}

const fn minus_one() -> i64 {
    -1
}

/// Renders an analysis-complete telemetry payload into status-bar text.
///
/// Returns `None` for every other event, for payloads missing the
/// analyzed-file count, and for payloads that do not parse - telemetry is
/// best-effort and never worth an error.
///
/// # Examples
///
/// ```
/// use pylance_client::analysis_status_message;
/// use pylance_core::PackageName;
/// use serde_json::json;
///
/// let params = json!({
///     "EventName": "language_server/analysis_complete",
///     "Measurements": {
///         "numFilesAnalyzed": 10,
///         "numFilesInProgram": 12,
///         "elapsedMs": 1234.0,
///         "isFirstRun": 1,
///     },
/// });
///
/// let message = analysis_status_message(&PackageName::new("LSP-pylance"), &params);
/// assert_eq!(
///     message.as_deref(),
///     Some("LSP-pylance: Analysis 10/12 files completed in 1.234 seconds. (first run)"),
/// );
/// ```
#[must_use]
pub fn analysis_status_message(package_name: &PackageName, params: &Value) -> Option<String> {
    let event: TelemetryEvent = serde_json::from_value(params.clone()).ok()?;
    if event.event_name != ANALYSIS_COMPLETE_EVENT {
        return None;
    }

    let measurements = &event.measurements;
    if measurements.num_files_analyzed < 0 {
        return None;
    }

    let first_run = if measurements.is_first_run > 0.0 {
        " (first run)"
    } else {
        ""
    };

    Some(format!(
        "{package_name}: Analysis {}/{} files completed in {:.3} seconds.{first_run}",
        measurements.num_files_analyzed,
        measurements.num_files_in_program,
        measurements.elapsed_ms / 1000.0,
    ))
}
