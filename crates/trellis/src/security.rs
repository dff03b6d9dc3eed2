//! Security header application.
//!
//! Computes the fixed security header set once per request; the
//! application attaches it to every outgoing response. No request
//! validation happens here - this is headers only.

use crate::config::AppConfig;

/// Security headers for the current configuration.
///
/// Always set: frame options, content-type sniffing block, referrer
/// policy, legacy XSS protection. A Content-Security-Policy is added when
/// configured, and the "dev" environment disables caching so stale assets
/// never mask a change during development.
pub fn security_headers(config: &AppConfig) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = [
        ("X-Frame-Options", "SAMEORIGIN"),
        ("X-Content-Type-Options", "nosniff"),
        ("Referrer-Policy", "strict-origin-when-cross-origin"),
        ("X-XSS-Protection", "1; mode=block"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect();

    if let Some(csp) = &config.security.csp {
        if !csp.is_empty() {
            headers.push(("Content-Security-Policy".to_string(), csp.clone()));
        }
    }

    if config.env == "dev" {
        headers.push((
            "Cache-Control".to_string(),
            "no-store, no-cache, must-revalidate".to_string(),
        ));
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(headers: &[(String, String)], name: &str) -> bool {
        headers.iter().any(|(n, _)| n == name)
    }

    #[test]
    fn test_standard_headers_always_present() {
        let headers = security_headers(&AppConfig::default());
        assert!(has(&headers, "X-Frame-Options"));
        assert!(has(&headers, "X-Content-Type-Options"));
        assert!(has(&headers, "Referrer-Policy"));
        assert!(has(&headers, "X-XSS-Protection"));
    }

    #[test]
    fn test_prod_has_no_cache_override_and_no_csp_by_default() {
        let headers = security_headers(&AppConfig::default());
        assert!(!has(&headers, "Cache-Control"));
        assert!(!has(&headers, "Content-Security-Policy"));
    }

    #[test]
    fn test_dev_disables_caching() {
        let mut config = AppConfig::default();
        config.env = "dev".to_string();

        let headers = security_headers(&config);
        assert!(headers.contains(&(
            "Cache-Control".to_string(),
            "no-store, no-cache, must-revalidate".to_string()
        )));
    }

    #[test]
    fn test_csp_from_config() {
        let mut config = AppConfig::default();
        config.security.csp = Some("default-src 'self'".to_string());

        let headers = security_headers(&config);
        assert!(headers.contains(&(
            "Content-Security-Policy".to_string(),
            "default-src 'self'".to_string()
        )));
    }
}
