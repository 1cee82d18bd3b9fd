use std::env;

/// Local Vite dev server, always allowed.
const DEV_ORIGIN: &str = "http://localhost:5173";

/// Resolve the CORS origin to echo back for a request.
///
/// The allow-list is the configured frontend origin plus the dev origin.
/// Unknown origins fall back to the configured frontend so that browsers
/// reject the response rather than the server.
pub fn get_cors_origin(request_origin: Option<&str>) -> String {
    let frontend = env::var("FRONTEND_URL").ok();

    if let Some(origin) = request_origin {
        if origin == DEV_ORIGIN || frontend.as_deref() == Some(origin) {
            return origin.to_string();
        }
    }

    frontend.unwrap_or_else(|| DEV_ORIGIN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_origin_is_always_echoed() {
        assert_eq!(get_cors_origin(Some(DEV_ORIGIN)), DEV_ORIGIN);
    }

    #[test]
    fn unknown_origin_is_not_echoed() {
        let resolved = get_cors_origin(Some("https://evil.example"));
        assert_ne!(resolved, "https://evil.example");
    }
}
