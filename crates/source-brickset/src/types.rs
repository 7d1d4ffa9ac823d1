//! Brickset API v3 wire types.

use serde::{Deserialize, Serialize};

/// Envelope every v3 endpoint returns.
#[derive(Debug, Clone, Deserialize)]
pub struct BricksetResponse {
    pub status: String,
    pub message: Option<String>,
    pub matches: Option<i64>,
    #[serde(default)]
    pub sets: Vec<BricksetSet>,
}

impl BricksetResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// One set record from `getSets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BricksetSet {
    #[serde(rename = "setID")]
    pub set_id: i64,
    pub number: Option<String>,
    #[serde(rename = "numberVariant")]
    pub number_variant: Option<i32>,
    pub name: Option<String>,
    pub year: Option<i32>,
    pub theme: Option<String>,
    pub subtheme: Option<String>,
    pub pieces: Option<i32>,
    pub image: Option<BricksetImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BricksetImage {
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
}

/// Query parameters for `getSets`, serialized into the `params` JSON blob.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetSetsParams {
    #[serde(rename = "setType", skip_serializing_if = "Option::is_none")]
    pub set_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "setNumber", skip_serializing_if = "Option::is_none")]
    pub set_number: Option<String>,
    #[serde(rename = "pageSize", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_sets_response() {
        let body = r#"{
            "status": "success",
            "matches": 1,
            "sets": [{
                "setID": 32451,
                "number": "sw0001",
                "numberVariant": 1,
                "name": "Darth Vader",
                "year": 1999,
                "theme": "Star Wars",
                "subtheme": "Episode IV",
                "pieces": 4,
                "image": {
                    "thumbnailURL": "https://images.brickset.com/sets/small/sw0001.jpg",
                    "imageURL": "https://images.brickset.com/sets/images/sw0001.jpg"
                }
            }]
        }"#;
        let response: BricksetResponse = serde_json::from_str(body).unwrap();
        assert!(response.is_success());
        assert_eq!(response.sets.len(), 1);
        assert_eq!(response.sets[0].number.as_deref(), Some("sw0001"));
        assert_eq!(response.sets[0].year, Some(1999));
    }

    #[test]
    fn test_error_response_has_no_sets() {
        let body = r#"{"status": "error", "message": "Invalid API key"}"#;
        let response: BricksetResponse = serde_json::from_str(body).unwrap();
        assert!(!response.is_success());
        assert!(response.sets.is_empty());
    }

    #[test]
    fn test_params_serialize_sparsely() {
        let params = GetSetsParams {
            set_type: Some("Minifig".to_string()),
            page_size: Some(500),
            ..GetSetsParams::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"setType":"Minifig","pageSize":500}"#);
    }
}
