//! Marketplace gallery URL templates and request headers.

use pylance_core::{ExtensionId, ExtensionVersion};

/// Browser-mimicking user agent sent with download requests.
///
/// The gallery endpoint serves `vspackage` downloads to browsers; plain
/// client user agents get inconsistent treatment, so the request pretends
/// to be Edge on Windows.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/86.0.4240.193 Safari/537.36 Edg/86.0.622.63";

const DEFAULT_BASE: &str = "https://marketplace.visualstudio.com";

/// Base address of the marketplace gallery API.
///
/// Injectable so tests can point the installer at a local stub server; the
/// default is the public Visual Studio marketplace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceEndpoint {
    base: String,
}

impl MarketplaceEndpoint {
    /// Creates an endpoint with a custom base URL (no trailing slash
    /// required).
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// Returns the templated `vspackage` download URL for one extension
    /// version.
    #[must_use]
    pub fn download_url(&self, id: &ExtensionId, version: &ExtensionVersion) -> String {
        format!(
            "{}/_apis/public/gallery/publishers/{}/vsextensions/{}/{}/vspackage",
            self.base,
            id.vendor(),
            id.name(),
            version,
        )
    }

    /// Returns the extension's item page URL, sent as the `Referer`.
    #[must_use]
    pub fn item_url(&self, id: &ExtensionId) -> String {
        format!("{}/items?itemName={}", self.base, id)
    }
}

impl Default for MarketplaceEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_BASE)
    }
}
