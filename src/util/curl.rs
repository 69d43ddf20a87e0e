//! Render transport requests as shell commands for debugging

use crate::network::TransportRequest;

/// Render a request as an equivalent `curl` command line
pub fn to_curl_command(request: &TransportRequest, base_url: &str) -> String {
    let mut command = format!(
        "curl -X{} '{}/{}",
        request.method,
        base_url.trim_end_matches('/'),
        request.path.trim_start_matches('/')
    );

    if !request.params.is_empty() {
        let query = request
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        command.push('?');
        command.push_str(&query);
    }
    command.push('\'');

    if let Some(ref body) = request.body {
        let body = body.to_string().replace('\'', "'\\''");
        command.push_str(&format!(" -d '{}'", body));
    }

    command
}
