//! Where to send a user after they sign in.
//!
//! Return paths are always same-site relative paths, so a crafted
//! `redirect_url` cannot bounce a freshly signed in user to another site.

use axum::{
    extract::Request,
    http::{HeaderMap, Uri},
};

use crate::endpoints;

/// The path and query of `uri`, if it is a page worth returning to.
fn page_path(uri: &Uri) -> Option<String> {
    let path_and_query = uri.path_and_query()?;
    let path = path_and_query.path();

    let is_same_site = path.starts_with('/') && !path.starts_with("//");
    let is_page = !path.starts_with("/api") && path != endpoints::SIGN_IN_VIEW;

    (is_same_site && is_page).then(|| path_and_query.as_str().to_owned())
}

/// Accepts `raw_url` only if it is a relative page path, e.g. "/dashboard?range=month".
pub fn safe_return_path(raw_url: &str) -> Option<String> {
    let uri: Uri = raw_url.parse().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    page_path(&uri)
}

/// The sign in page URL that returns the user to `return_path` afterwards.
pub fn sign_in_url(return_path: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", return_path)]) {
        Ok(query) => format!("{}?{query}", endpoints::SIGN_IN_VIEW),
        Err(error) => {
            tracing::error!("Could not encode return path {return_path}: {error}");
            endpoints::SIGN_IN_VIEW.to_owned()
        }
    }
}

/// The page HTMX was showing when it made the request.
///
/// `HX-Current-URL` holds an absolute URL, only its path and query are kept.
fn htmx_current_page(headers: &HeaderMap) -> Option<String> {
    let is_htmx = headers
        .get("hx-request")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));
    if !is_htmx {
        return None;
    }

    let current_url = headers.get("hx-current-url")?.to_str().ok()?;
    let page = current_url.parse().ok().and_then(|uri: Uri| page_path(&uri));
    if page.is_none() {
        tracing::warn!("Ignoring HX-Current-URL {current_url}");
    }

    page
}

/// The page to return to after signing in, given the request that was turned away.
///
/// API routes are not pages, so for those the page HTMX was showing is used.
/// Falls back to the dashboard.
pub fn return_path_for(request: &Request) -> String {
    let return_path = if request.uri().path().starts_with("/api") {
        htmx_current_page(request.headers())
    } else {
        page_path(request.uri())
    };

    return_path.unwrap_or_else(|| {
        tracing::debug!(
            "No page to return to for {}, using the dashboard.",
            request.uri()
        );
        endpoints::DASHBOARD_VIEW.to_owned()
    })
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request};

    use super::{return_path_for, safe_return_path, sign_in_url};

    fn request(uri: &str, headers: &[(&str, &str)]) -> Request {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn keeps_query_of_relative_page_paths() {
        assert_eq!(
            safe_return_path("/dashboard?range=month").as_deref(),
            Some("/dashboard?range=month")
        );
    }

    #[test]
    fn refuses_other_sites_api_routes_and_the_sign_in_page() {
        for raw_url in [
            "https://evil.example/dashboard",
            "//evil.example/dashboard",
            "dashboard",
            "/api/insights",
            "/sign_in?redirect_url=%2F",
        ] {
            assert_eq!(safe_return_path(raw_url), None, "{raw_url} was accepted");
        }
    }

    #[test]
    fn sign_in_url_encodes_the_return_path() {
        assert_eq!(
            sign_in_url("/dashboard?range=all"),
            "/sign_in?redirect_url=%2Fdashboard%3Frange%3Dall"
        );
    }

    #[test]
    fn page_requests_return_to_themselves() {
        assert_eq!(
            return_path_for(&request("/dashboard?range=week", &[])),
            "/dashboard?range=week"
        );
    }

    #[test]
    fn htmx_requests_return_to_the_current_page() {
        let request = request(
            "/api/insights",
            &[
                ("HX-Request", "true"),
                ("HX-Current-URL", "https://example.com/dashboard?range=all"),
            ],
        );

        assert_eq!(return_path_for(&request), "/dashboard?range=all");
    }

    #[test]
    fn api_requests_without_htmx_headers_return_to_the_dashboard() {
        assert_eq!(return_path_for(&request("/api/insights", &[])), "/dashboard");
    }
}
