use crate::model::VersionIdentifier;

pub const DEFAULT_REFERENCE_HOST: &str = "vuldb.com";
pub const DEFAULT_CPE_VENDOR: &str = "gitlab";
pub const DEFAULT_CPE_PRODUCT: &str = "gitlab";

/// Builds vulnerability-lookup links keyed by CPE 2.3 names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceLinker {
    host: String,
    vendor: String,
    product: String,
}

impl ReferenceLinker {
    pub fn new(
        host: impl Into<String>,
        vendor: impl Into<String>,
        product: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            vendor: vendor.into(),
            product: product.into(),
        }
    }

    /// CPE 2.3 name for `identifier`, e.g.
    /// `cpe:2.3:a:gitlab:gitlab:16.5.0:*:*:*:community:*:*:*`.
    pub fn cpe(&self, identifier: &VersionIdentifier) -> Option<String> {
        let edition = identifier.edition()?;
        let bare = identifier.bare_version()?;
        Some(format!(
            "cpe:2.3:a:{}:{}:{}:*:*:*:{}:*:*:*",
            self.vendor,
            self.product,
            bare,
            edition.cpe_word()
        ))
    }

    /// Lookup URL for `identifier`, or `None` when it carries no
    /// recognisable edition and version.
    pub fn link(&self, identifier: &VersionIdentifier) -> Option<String> {
        let cpe = self.cpe(identifier)?;
        Some(format!("https://{}/?cpe={}", self.host, cpe))
    }
}

impl Default for ReferenceLinker {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_HOST, DEFAULT_CPE_VENDOR, DEFAULT_CPE_PRODUCT)
    }
}
