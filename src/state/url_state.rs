//! URL state encoding/decoding for shareable URLs.
//!
//! Encodes the map centre and zoom in the URL query string so reloading
//! restores the view and URLs can be shared.

/// Parsed URL parameters.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct UrlParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub zoom: Option<f64>,
}

impl UrlParams {
    /// Centre and zoom, when the URL carries a complete, finite view.
    pub fn view(&self) -> Option<(f64, f64, f64)> {
        let (lat, lng) = (self.lat?, self.lng?);
        let zoom = self.zoom.unwrap_or(1.0);
        (lat.is_finite() && lng.is_finite() && zoom.is_finite()).then_some((lat, lng, zoom))
    }
}

/// Parse a query string such as `?lat=52.5&lng=13.4&zoom=3`.
///
/// Unknown keys and unparsable values are ignored.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub fn parse_query(search: &str) -> UrlParams {
    let mut params = UrlParams::default();

    let query = search.trim_start_matches('?');
    if query.is_empty() {
        return params;
    }

    for pair in query.split('&') {
        let mut kv = pair.splitn(2, '=');
        let key = kv.next().unwrap_or("");
        let value = kv.next().unwrap_or("");
        match key {
            "lat" => params.lat = value.parse().ok(),
            "lng" | "lon" => params.lng = value.parse().ok(),
            "zoom" => params.zoom = value.parse().ok(),
            _ => {}
        }
    }

    params
}

/// Format a view as a query string.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub fn format_query(lat: f64, lng: f64, zoom: f64) -> String {
    format!("?lat={:.4}&lng={:.4}&zoom={:.2}", lat, lng, zoom)
}

/// Parse URL query parameters from the current browser URL.
#[cfg(target_arch = "wasm32")]
pub fn parse_from_url() -> UrlParams {
    let search = web_sys::window().and_then(|window| window.location().search().ok());
    match search {
        Some(search) => parse_query(&search),
        None => UrlParams::default(),
    }
}

/// No-op stub for native builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn parse_from_url() -> UrlParams {
    UrlParams::default()
}

/// Push current state to the URL query string using `replaceState`.
#[cfg(target_arch = "wasm32")]
pub fn push_to_url(lat: f64, lng: f64, zoom: f64) {
    let query = format_query(lat, lng, zoom);

    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(history) = window.history() else {
        return;
    };
    if let Err(e) = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&query)) {
        log::debug!("replaceState failed: {:?}", e);
    }
}

/// No-op stub for native builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn push_to_url(_lat: f64, _lng: f64, _zoom: f64) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_query() {
        let params = parse_query("?lat=52.52&lng=13.405&zoom=3.5");
        assert_eq!(params.lat, Some(52.52));
        assert_eq!(params.lng, Some(13.405));
        assert_eq!(params.zoom, Some(3.5));
        assert_eq!(params.view(), Some((52.52, 13.405, 3.5)));
    }

    #[test]
    fn test_parse_ignores_junk() {
        let params = parse_query("lat=abc&foo=1&lng=2&zoom");
        assert_eq!(params.lat, None);
        assert_eq!(params.lng, Some(2.0));
        assert_eq!(params.zoom, None);
        assert_eq!(params.view(), None);
        assert_eq!(parse_query(""), UrlParams::default());
    }

    #[test]
    fn test_zoom_defaults_to_one() {
        assert_eq!(parse_query("?lat=1&lon=2").view(), Some((1.0, 2.0, 1.0)));
        assert_eq!(parse_query("?lat=NaN&lng=2").view(), None);
    }

    #[test]
    fn test_format_parses_back() {
        let query = format_query(-33.8688, 151.2093, 2.0);
        assert_eq!(query, "?lat=-33.8688&lng=151.2093&zoom=2.00");
        assert_eq!(parse_query(&query).view(), Some((-33.8688, 151.2093, 2.0)));
    }
}
