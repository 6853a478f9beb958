//! Response bodies of the auxiliary endpoints

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `GET /status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayStatus {
    /// Session paired and usable
    pub ready: bool,

    /// A pairing QR code is waiting to be scanned
    #[serde(rename = "qrCode", default)]
    pub qr_code_available: bool,
}

/// `GET /qrcode`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrCode {
    /// Pairing payload, to be rendered as a QR code
    Ready(String),
    /// Gateway is regenerating the code (HTTP 202), retry in a few seconds
    Pending(String),
}

/// Country classification returned by the analysis endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryInfo {
    pub code: Option<String>,
    pub country: String,
    pub is_formatted: bool,
}

/// `POST /analyze-number`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberAnalysis {
    pub original: String,
    pub cleaned: String,
    pub country_info: CountryInfo,
    pub formatted_number: String,
}

/// Aggregates of `POST /analyze-batch`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total: usize,
    pub formatted: usize,
    #[serde(default)]
    pub by_country: BTreeMap<String, usize>,
}

/// `POST /analyze-batch`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAnalysis {
    pub results: Vec<NumberAnalysis>,
    pub stats: BatchStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_deserialize() {
        let status: GatewayStatus =
            serde_json::from_str(r#"{"ready":false,"qrCode":true}"#).unwrap();
        assert!(!status.ready);
        assert!(status.qr_code_available);

        let status: GatewayStatus = serde_json::from_str(r#"{"ready":true}"#).unwrap();
        assert!(!status.qr_code_available);
    }

    #[test]
    fn test_batch_analysis_deserialize() {
        let body = r#"{
            "results": [{
                "original": "(11) 99999-0000",
                "cleaned": "11999990000",
                "countryInfo": {"code": null, "country": "Unknown", "isFormatted": false},
                "formattedNumber": "5511999990000"
            }],
            "stats": {"total": 1, "formatted": 0, "byCountry": {"Unknown": 1}}
        }"#;
        let batch: BatchAnalysis = serde_json::from_str(body).unwrap();
        assert_eq!(batch.results.len(), 1);
        assert_eq!(batch.results[0].formatted_number, "5511999990000");
        assert_eq!(batch.stats.by_country.get("Unknown"), Some(&1));
    }
}
