use anyhow::Context;
use serde_json::Value;
use skycast_core::{DateFormatter, LocalizedFormat};

pub fn render_json(body: &Value, compact: bool) -> anyhow::Result<String> {
    let rendered = if compact {
        serde_json::to_string(body)
    } else {
        serde_json::to_string_pretty(body)
    };
    rendered.context("Failed to render provider response")
}

/// Human-readable lines for the unix timestamps a current-weather payload carries.
///
/// Times are shown in the configured timezone; when the payload reports the location's
/// UTC shift (`timezone`, in seconds) the location's wall-clock time is appended.
pub fn timestamp_summary(body: &Value, formatter: &DateFormatter) -> Vec<String> {
    let shift = body
        .get("timezone")
        .and_then(Value::as_i64)
        .and_then(|s| i32::try_from(s).ok());

    let fields = [
        ("Observed", body.get("dt")),
        ("Sunrise", body.pointer("/sys/sunrise")),
        ("Sunset", body.pointer("/sys/sunset")),
    ];

    fields
        .into_iter()
        .filter_map(|(label, value)| {
            let ts = value.and_then(Value::as_i64)?;
            let here = formatter.format_unix(ts, LocalizedFormat::FullDateTime)?;
            let there = shift.and_then(|offset| {
                formatter.format_unix_with_offset(ts, offset, LocalizedFormat::Time)
            });

            Some(match there {
                Some(there) => format!("{label}: {here} ({there} at location)"),
                None => format!("{label}: {here}"),
            })
        })
        .collect()
}
