//! Client identification and content negotiation headers

/// User agent sent with every request, with an optional suffix appended
pub fn user_agent(suffix: Option<&str>) -> String {
    let base = format!("searchlight/{} (rust)", crate::VERSION);
    match suffix {
        Some(suffix) if !suffix.trim().is_empty() => format!("{} {}", base, suffix.trim()),
        _ => base,
    }
}

/// Standard accept header for JSON requests
pub fn accept_json() -> &'static str {
    "application/json"
}
