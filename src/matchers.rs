//! Output matchers
//!
//! Stateless verdict functions over captured CLI output. Each returns a
//! human-readable mismatch via [`Error::Assertion`]; none of them touch
//! remote state.

use regex::Regex;

use crate::common::{Error, Result};

/// Assert `haystack` contains `needle`
pub fn contains(haystack: &str, needle: &str) -> Result<()> {
    if haystack.contains(needle) {
        Ok(())
    } else {
        Err(Error::assertion(
            "substring not found",
            needle,
            &excerpt(haystack),
        ))
    }
}

/// Assert `haystack` does not contain `needle`
pub fn not_contains(haystack: &str, needle: &str) -> Result<()> {
    if haystack.contains(needle) {
        Err(Error::assertion(
            "unexpected substring present",
            &format!("no '{needle}'"),
            &excerpt(haystack),
        ))
    } else {
        Ok(())
    }
}

/// Assert `actual`, trimmed, equals `expected`
pub fn equals_trimmed(actual: &str, expected: &str) -> Result<()> {
    if actual.trim() == expected {
        Ok(())
    } else {
        Err(Error::assertion("output mismatch", expected, actual.trim()))
    }
}

/// Assert `text` matches `pattern`
pub fn matches(text: &str, pattern: &str) -> Result<()> {
    let re = compile(pattern)?;
    if re.is_match(text) {
        Ok(())
    } else {
        Err(Error::assertion(
            "pattern did not match",
            pattern,
            &excerpt(text),
        ))
    }
}

/// Extract the first capture group of `pattern` from `text`
pub fn capture(text: &str, pattern: &str) -> Result<String> {
    let re = compile(pattern)?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            Error::assertion("capture group not found", pattern, &excerpt(text))
        })
}

/// Assert a numeric magnitude is strictly below a threshold
pub fn below(description: &str, value: f64, threshold: f64) -> Result<()> {
    if value.abs() < threshold {
        Ok(())
    } else {
        Err(Error::assertion(
            description,
            &format!("magnitude < {threshold}"),
            &value.to_string(),
        ))
    }
}

// === Domain patterns fixed by the stemcell's log/mount formats ===

/// Assert a syslog line for `token` carries a fractional-seconds ISO-8601
/// timestamp written by rsyslog
///
/// Traditional `May  4 12:00:00 host ...` lines must not match.
pub fn has_precision_timestamp(stdout: &str, token: &str) -> Result<()> {
    let pattern = format!(
        r"\d{{4}}-\d{{2}}-\d{{2}}T\d{{2}}:\d{{2}}:\d{{2}}\.\d{{1,6}}\+00:00 [\w-]+ bosh_[^ ]+: {token}"
    );
    matches(stdout, &pattern)
}

/// Assert `findmnt -n -T <target>` output shows `target` bind-mounted to a
/// device with the bracketed sub-path `subdir`
///
/// A plain device source without the `[/subdir]` suffix is a plain mount,
/// not the bind mount the stemcell sets up, and must fail.
pub fn is_bind_mounted(findmnt_output: &str, target: &str, subdir: &str) -> Result<()> {
    let pattern = format!(
        r"{}\s+/dev/[a-z0-9]+\[/{}\]",
        regex::escape(target),
        regex::escape(subdir)
    );
    matches(findmnt_output, &pattern)
}

/// Extract the NTP reference server from `chronyc -a tracking` output
pub fn chrony_reference_id(tracking_output: &str) -> Result<String> {
    capture(
        tracking_output,
        // Newer chrony prints a hex refid before the parenthesised address;
        // older versions print the dotted quad directly. The hex prefix must
        // be a whole token so it cannot eat octets of a bare address.
        r"Reference ID\s+:\s+(?:[0-9A-F]{8}\s+\()?([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})",
    )
}

/// Extract the system-time drift in seconds from `chronyc -a tracking`
/// output
pub fn chrony_system_time_drift(tracking_output: &str) -> Result<f64> {
    let raw = capture(tracking_output, r"System time\s+:\s(\d\.\d+)")?;
    raw.parse::<f64>().map_err(|_| {
        Error::assertion("system time drift is not a number", "a float", &raw)
    })
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::Assertion(format!("invalid pattern '{pattern}': {e}")))
}

/// Clip long captured output in mismatch messages
fn excerpt(text: &str) -> String {
    const LIMIT: usize = 300;
    let trimmed = text.trim();
    if trimmed.len() > LIMIT {
        let mut end = LIMIT;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    } else {
        trimmed.to_string()
    }
}
