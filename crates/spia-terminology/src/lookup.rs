//! Batched `CodeSystem/$lookup` requests.
//!
//! A list of codes is sent as one FHIR `batch` Bundle, one Parameters entry
//! per code, and the `batch-response` is read back entry by entry. The result
//! list always has the same length and order as the request list: a failed
//! lookup leaves `None` at its position and never shifts later results.

use std::time::Instant;

use serde_json::{Value, json};

use crate::client::TerminologyService;
use crate::error::{Result, TerminologyError};

pub const LOOKUP_REQUEST_URL: &str = "CodeSystem/$lookup";

/// Diagnostics the server returns for empty or malformed codes. Lookups that
/// fail this way are expected and are not reported.
const EXPECTED_DIAGNOSTICS: [&str; 3] = [
    "invalid code type",
    "blank code",
    "no code or coding",
];

/// Builds a `$lookup` Parameters resource.
pub fn lookup_parameters(system: &str, code: &str, properties: &[&str]) -> Value {
    let mut parameter = vec![
        json!({ "name": "system", "valueUri": system }),
        json!({ "name": "code", "valueCode": code }),
    ];
    parameter.extend(
        properties
            .iter()
            .map(|property| json!({ "name": "property", "valueString": property })),
    );
    json!({ "resourceType": "Parameters", "parameter": parameter })
}

/// Builds a `batch` Bundle with one `$lookup` entry per code, in order.
pub fn build_lookup_bundle(system: &str, codes: &[String], properties: &[&str]) -> Value {
    let entry: Vec<Value> = codes
        .iter()
        .map(|code| {
            json!({
                "resource": lookup_parameters(system, code, properties),
                "request": { "method": "POST", "url": LOOKUP_REQUEST_URL },
            })
        })
        .collect();
    json!({ "resourceType": "Bundle", "type": "batch", "entry": entry })
}

/// Looks up the display of every code in one round-trip.
///
/// # Errors
///
/// Transport failures (after retries) and a response whose entry count
/// differs from the request are fatal. Individual lookup failures are logged
/// and recorded as `None`.
pub fn batch_lookup(
    service: &dyn TerminologyService,
    system: &str,
    codes: &[String],
) -> Result<Vec<Option<String>>> {
    if codes.is_empty() {
        return Ok(Vec::new());
    }
    let start = Instant::now();
    let request = build_lookup_bundle(system, codes, &[]);
    let response = service.batch(&request)?;
    let entries = response_entries(&response)?;
    if entries.len() != codes.len() {
        return Err(TerminologyError::LengthMismatch {
            requested: codes.len(),
            returned: entries.len(),
        });
    }
    let displays: Vec<Option<String>> = entries
        .iter()
        .zip(codes)
        .map(|(entry, code)| entry_display(entry, system, code))
        .collect();
    tracing::info!(
        system,
        codes = codes.len(),
        resolved = displays.iter().filter(|d| d.is_some()).count(),
        duration_ms = start.elapsed().as_millis(),
        "batch lookup complete"
    );
    Ok(displays)
}

fn response_entries(response: &Value) -> Result<&[Value]> {
    if response.get("resourceType").and_then(Value::as_str) != Some("Bundle") {
        return Err(TerminologyError::MalformedResponse(
            "batch response is not a Bundle".to_string(),
        ));
    }
    match response.get("entry") {
        None => Ok(&[]),
        Some(Value::Array(entries)) => Ok(entries),
        Some(_) => Err(TerminologyError::MalformedResponse(
            "Bundle.entry is not an array".to_string(),
        )),
    }
}

fn entry_display(entry: &Value, system: &str, code: &str) -> Option<String> {
    let resource = entry.get("resource");
    let resource_type = resource
        .and_then(|r| r.get("resourceType"))
        .and_then(Value::as_str);
    let status_ok = entry_status(entry).is_none_or(|status| (200..300).contains(&status));

    if resource_type == Some("OperationOutcome") || !status_ok {
        let diagnostics = resource.and_then(outcome_diagnostics).unwrap_or_default();
        if !is_expected_failure(&diagnostics) {
            tracing::warn!(system, code, %diagnostics, "lookup failed");
        }
        return None;
    }
    match resource {
        Some(parameters) if resource_type == Some("Parameters") => display_from_parameters(parameters),
        _ => {
            tracing::debug!(system, code, "lookup entry carried no Parameters resource");
            None
        }
    }
}

/// Numeric status from `Bundle.entry.response.status`, e.g. `"200 OK"`.
fn entry_status(entry: &Value) -> Option<u16> {
    let status = entry.get("response")?.get("status")?.as_str()?;
    status.split_whitespace().next()?.parse().ok()
}

fn outcome_diagnostics(outcome: &Value) -> Option<String> {
    let issues = outcome.get("issue")?.as_array()?;
    let messages: Vec<&str> = issues
        .iter()
        .filter_map(|issue| {
            issue
                .get("diagnostics")
                .and_then(Value::as_str)
                .or_else(|| issue.get("details")?.get("text")?.as_str())
        })
        .collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

fn is_expected_failure(diagnostics: &str) -> bool {
    let lower = diagnostics.to_lowercase();
    EXPECTED_DIAGNOSTICS
        .iter()
        .any(|fragment| lower.contains(fragment))
}

fn parameter_named<'a>(parameters: &'a Value, name: &str) -> impl Iterator<Item = &'a Value> {
    parameters
        .get("parameter")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(move |p| p.get("name").and_then(Value::as_str) == Some(name))
}

/// Extracts the `display` parameter from a `$lookup` response.
pub fn display_from_parameters(parameters: &Value) -> Option<String> {
    parameter_named(parameters, "display")
        .find_map(|p| p.get("valueString").and_then(Value::as_str))
        .map(str::to_string)
}

/// True when a `$lookup` response reports the `inactive` property as true.
pub fn is_inactive(parameters: &Value) -> bool {
    parameter_named(parameters, "property").any(|property| {
        let parts = property
            .get("part")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let names_inactive = parts.iter().any(|part| {
            part.get("name").and_then(Value::as_str) == Some("code")
                && ["valueCode", "valueString"]
                    .iter()
                    .any(|key| part.get(*key).and_then(Value::as_str) == Some("inactive"))
        });
        let is_true = parts
            .iter()
            .any(|part| part.get("valueBoolean").and_then(Value::as_bool) == Some(true));
        names_inactive && is_true
    })
}
