use crate::domain::model::UploadedAsset;

/// Pad to 800x800 on white, let the CDN pick format, quality and pixel ratio.
pub const DEFAULT_TRANSFORM: &str = "c_pad,w_800,h_800,b_white,f_auto,q_auto,dpr_auto";
pub const DEFAULT_DELIVERY_BASE_URL: &str = "https://res.cloudinary.com";

/// Builds transformed delivery URLs. Pure string composition, no network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryUrlBuilder {
    base_url: String,
    cloud_name: String,
    transform: String,
}

impl DeliveryUrlBuilder {
    pub fn new(base_url: &str, cloud_name: &str, transform: &str) -> Self {
        debug_assert!(!cloud_name.is_empty(), "cloud name must not be empty");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cloud_name: cloud_name.to_string(),
            transform: transform.trim_matches('/').to_string(),
        }
    }

    pub fn transform(&self) -> &str {
        &self.transform
    }

    /// `<base>/<cloud>/image/upload/<transform>/v<version>/<public_id>.<format>`.
    /// The version and extension are left out when the host did not report them.
    pub fn build(&self, asset: &UploadedAsset) -> String {
        debug_assert!(!asset.public_id.is_empty(), "asset has no public id");

        let mut url = format!("{}/{}/image/upload/", self.base_url, self.cloud_name);
        if !self.transform.is_empty() {
            url.push_str(&self.transform);
            url.push('/');
        }
        if let Some(version) = asset.version {
            url.push_str(&format!("v{}/", version));
        }
        url.push_str(&asset.public_id);
        if let Some(format) = asset.format.as_deref().filter(|f| !f.is_empty()) {
            url.push('.');
            url.push_str(format);
        }
        url
    }
}
