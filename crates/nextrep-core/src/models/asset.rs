use serde::{Deserialize, Serialize};

use super::de_id;

/// Metadata for an uploaded file (profile picture or post attachment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Asset {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetData {
    pub asset: Asset,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignedUrlData {
    #[serde(rename = "signedUrl")]
    pub signed_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_asset() {
        let json = r#"{"id": 3, "file_name": "me.jpg", "content_type": "image/jpeg", "size": 2048}"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.id, "3");
        assert_eq!(asset.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(asset.size, Some(2048));
    }

    #[test]
    fn test_asset_metadata_is_optional() {
        let asset: Asset = serde_json::from_str(r#"{"id": "a1"}"#).unwrap();
        assert_eq!(asset.id, "a1");
        assert!(asset.file_name.is_none());
        assert!(asset.content_type.is_none());
    }

    #[test]
    fn test_parse_signed_url() {
        let data: SignedUrlData =
            serde_json::from_str(r#"{"signedUrl": "https://cdn.example/a1?sig=x"}"#).unwrap();
        assert_eq!(data.signed_url, "https://cdn.example/a1?sig=x");
    }
}
