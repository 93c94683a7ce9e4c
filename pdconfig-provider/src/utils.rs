//! Helper functions shared by resource implementations

use std::sync::LazyLock;

use pdconfig_client::ApiError;
use pdconfig_client::models::{Operation as ApiOperation, OperationType};
use pdconfig_core::attr::Attr;
use pdconfig_core::diagnostics::{Diagnostic, Diagnostics};
use pdconfig_core::operations::{Operation, OperationKind};
use pdconfig_core::schema::AttributeType;
use pdconfig_core::value::Value;
use regex::Regex;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s*([A-Za-z]+)\s*$").expect("duration pattern is valid")
});

/// Parse a server duration such as `"1 w"`, `"30 days"` or `"500ms"` into milliseconds
pub fn parse_pd_duration(value: &str) -> Option<u64> {
    let caps = DURATION_RE.captures(value)?;
    let amount: u64 = caps[1].parse().ok()?;
    let unit_ms: u64 = match caps[2].to_ascii_lowercase().as_str() {
        "ms" | "millisecond" | "milliseconds" => 1,
        "s" | "sec" | "second" | "seconds" => 1_000,
        "m" | "min" | "minute" | "minutes" => 60_000,
        "h" | "hr" | "hour" | "hours" => 3_600_000,
        "d" | "day" | "days" => 86_400_000,
        "w" | "week" | "weeks" => 604_800_000,
        _ => return None,
    };
    amount.checked_mul(unit_ms)
}

/// String attribute holding a server duration
pub fn pd_duration() -> AttributeType {
    AttributeType::Custom {
        name: "Duration".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) if s.is_empty() || parse_pd_duration(s).is_some() => Ok(()),
            Value::String(s) => Err(format!(
                "Invalid duration '{}', expected a number followed by a unit (ms, s, m, h, d, w)",
                s
            )),
            _ => Ok(()),
        },
    }
}

/// Warn when the server stored a value in a different textual form than configured.
///
/// The server canonicalizes some values (durations in particular); the
/// configuration should use the server's form to avoid a diff on every plan.
pub fn check_mismatched_pd_formatted_attributes(
    attribute: &str,
    expected: &Attr<String>,
    found: &Attr<String>,
    diagnostics: &mut Diagnostics,
) {
    let (Some(expected), Some(found)) = (expected.as_known(), found.as_known()) else {
        return;
    };
    if expected == found {
        return;
    }

    let equivalent = match (parse_pd_duration(expected), parse_pd_duration(found)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    let mut detail = format!(
        "Expected value for {}: '{}' does not match the server-formatted value: '{}'.",
        attribute, expected, found
    );
    if equivalent {
        detail.push_str(" The values are equivalent; use the server-formatted value in the configuration.");
    } else {
        detail.push_str(" Update the configuration to match the server-formatted value.");
    }
    diagnostics.push(
        Diagnostic::warning("Mismatched server-formatted attribute", detail)
            .with_attribute(attribute),
    );
}

/// Report a failed API call as a single error diagnostic
pub fn report_http_error(diagnostics: &mut Diagnostics, summary: &str, error: &ApiError) {
    let detail = match error.response_body() {
        Some(body) => format!("Error: {}\nHTTP response body: {}", error, body),
        None => format!("Error: {}", error),
    };
    log::debug!("{}: {}", summary, detail);
    diagnostics.add_error(summary, detail);
}

/// Convert computed operations into the API's PATCH form
pub fn to_api_operations(ops: &[Operation]) -> Vec<ApiOperation> {
    ops.iter()
        .map(|op| ApiOperation {
            op: match op.kind {
                OperationKind::Replace => OperationType::Replace,
                OperationKind::Remove => OperationType::Remove,
            },
            path: op.path.clone(),
            value: op.value.as_ref().map(|v| v.to_json()),
        })
        .collect()
}

/// Timestamp recorded in `last_updated` after each create or update
pub fn last_updated_timestamp() -> String {
    chrono::Utc::now()
        .format("%A, %d-%b-%y %H:%M:%S UTC")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdconfig_client::models::OperationType;
    use pdconfig_client::StatusCode;
    use pdconfig_core::operations::OperationValue;

    fn not_found() -> ApiError {
        ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: r#"{"detail":"Recurring Task nightly not found"}"#.to_string(),
        }
    }

    #[test]
    fn parse_durations() {
        assert_eq!(parse_pd_duration("1 d"), Some(86_400_000));
        assert_eq!(parse_pd_duration("24 h"), Some(86_400_000));
        assert_eq!(parse_pd_duration("2w"), Some(1_209_600_000));
        assert_eq!(parse_pd_duration("500 ms"), Some(500));
        assert_eq!(parse_pd_duration("30 Days"), Some(2_592_000_000));
        assert_eq!(parse_pd_duration("one day"), None);
        assert_eq!(parse_pd_duration("5 fortnights"), None);
        assert_eq!(parse_pd_duration(""), None);
    }

    #[test]
    fn duration_type_validation() {
        let t = pd_duration();
        assert!(t.validate(&Value::from("7 d")).is_ok());
        assert!(t.validate(&Value::from("")).is_ok());
        assert!(t.validate(&Value::from("soon")).is_err());
        assert!(t.validate(&Value::Int(7)).is_err());
    }

    #[test]
    fn matching_values_produce_no_warning() {
        let mut diags = Diagnostics::new();
        check_mismatched_pd_formatted_attributes(
            "retain_previous_profile_age",
            &Attr::known("1 d"),
            &Attr::known("1 d"),
            &mut diags,
        );
        check_mismatched_pd_formatted_attributes(
            "retain_previous_profile_age",
            &Attr::Null,
            &Attr::known("1 d"),
            &mut diags,
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn reformatted_value_is_a_warning() {
        let mut diags = Diagnostics::new();
        check_mismatched_pd_formatted_attributes(
            "retain_previous_profile_age",
            &Attr::known("24 h"),
            &Attr::known("1 d"),
            &mut diags,
        );
        assert_eq!(diags.len(), 1);
        assert!(!diags.has_error());
        let warning = diags.iter().next().unwrap();
        assert_eq!(
            warning.attribute.as_deref(),
            Some("retain_previous_profile_age")
        );
        assert!(warning.detail.contains("equivalent"));
    }

    #[test]
    fn http_error_includes_body() {
        let mut diags = Diagnostics::new();
        report_http_error(
            &mut diags,
            "An error occurred while getting the Generate Server Profile Recurring Task",
            &not_found(),
        );
        let error = diags.errors().next().unwrap();
        assert!(error.detail.starts_with("Error: 404 Not Found"));
        assert!(error.detail.contains("not found"));
    }

    #[test]
    fn operations_convert_to_api_form() {
        let ops = vec![
            Operation::replace("alertOnStart", OperationValue::Bool(true)),
            Operation::remove("description"),
        ];
        let api = to_api_operations(&ops);
        assert_eq!(api[0].op, OperationType::Replace);
        assert_eq!(api[0].value, Some(serde_json::json!(true)));
        assert_eq!(api[1].op, OperationType::Remove);
        assert_eq!(api[1].value, None);
    }

    #[test]
    fn timestamp_is_rfc850_style() {
        let ts = last_updated_timestamp();
        assert!(ts.ends_with(" UTC"));
        assert!(ts.contains(", "));
    }
}
