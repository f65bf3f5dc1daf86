//! Request building for the transparency API.
//!
//! Codes are forwarded as given. The only check made here is on the window, which
//! the provider caps at one year per request.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{Instant, QueryParams, RequestWindow};
use crate::error::AppError;

/// Provider period format (`periodStart` / `periodEnd`).
const PERIOD_FORMAT: &str = "%Y%m%d%H%M";

/// Query pairs for one request, in a stable order. The security token is added by
/// the client, never stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub params: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub fn build_request(query: &QueryParams, window: &RequestWindow) -> RequestDescriptor {
    let mut params = vec![
        ("documentType".to_string(), query.document_type.clone()),
        ("processType".to_string(), query.process_type.clone()),
    ];
    if let Some(psr) = &query.psr_type {
        params.push(("psrType".to_string(), psr.clone()));
    }
    params.push(("in_Domain".to_string(), query.domain.clone()));
    params.push(("periodStart".to_string(), window.start.format(PERIOD_FORMAT).to_string()));
    params.push(("periodEnd".to_string(), window.end.format(PERIOD_FORMAT).to_string()));
    RequestDescriptor { params }
}

/// Parse a CLI window bound: `YYYY-MM-DDTHH:MMZ` or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_window_bound(text: &str) -> Result<Instant, AppError> {
    let trimmed = text.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%MZ") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            AppError::input(format!(
                "Invalid window bound '{text}' (expected YYYY-MM-DD or YYYY-MM-DDTHH:MMZ)."
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn query(psr: Option<&str>) -> QueryParams {
        QueryParams {
            document_type: "A75".to_string(),
            process_type: "A16".to_string(),
            psr_type: psr.map(str::to_string),
            domain: "10YDE-VE-------2".to_string(),
        }
    }

    #[test]
    fn request_carries_codes_and_window_verbatim() {
        let window = RequestWindow::new(
            Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2015, 12, 31, 23, 0, 0).unwrap(),
        )
        .unwrap();
        let req = build_request(&query(Some("B16")), &window);
        assert_eq!(req.get("documentType"), Some("A75"));
        assert_eq!(req.get("processType"), Some("A16"));
        assert_eq!(req.get("psrType"), Some("B16"));
        assert_eq!(req.get("in_Domain"), Some("10YDE-VE-------2"));
        assert_eq!(req.get("periodStart"), Some("201501010000"));
        assert_eq!(req.get("periodEnd"), Some("201512312300"));
    }

    #[test]
    fn psr_type_is_optional() {
        let window = RequestWindow::new(
            Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2015, 1, 2, 0, 0, 0).unwrap(),
        )
        .unwrap();
        let req = build_request(&query(None), &window);
        assert_eq!(req.get("psrType"), None);
        assert_eq!(req.params.len(), 5);
    }

    #[test]
    fn window_bounds_accept_both_forms() {
        assert_eq!(
            parse_window_bound("2015-01-01").unwrap(),
            Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_window_bound("2015-01-01T06:30Z").unwrap(),
            Utc.with_ymd_and_hms(2015, 1, 1, 6, 30, 0).unwrap()
        );
        let err = parse_window_bound("01.01.2015").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
