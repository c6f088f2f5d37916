use super::segment;
use crate::api::{ApiClient, ApiError};
use crate::models::{Asset, AssetData, SignedUrlData};

impl ApiClient {
    pub async fn get_asset(&self, asset_id: &str) -> Result<Asset, ApiError> {
        let path = format!("/assets/{}", segment(asset_id));
        let data: AssetData = self.get_data(&path).await?;
        Ok(data.asset)
    }

    /// Short-lived download URL for an asset
    pub async fn asset_url(&self, asset_id: &str) -> Result<String, ApiError> {
        let path = format!("/assets/url/{}", segment(asset_id));
        let data: SignedUrlData = self.get_data(&path).await?;
        Ok(data.signed_url)
    }
}
