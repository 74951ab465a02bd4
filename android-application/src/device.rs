/// Returns `true` if `product` names an emulator build
///
/// `product` is the `Build.PRODUCT` identifier (the `ro.product.name` system
/// property). Emulator images are named `sdk` or carry an `sdk` component,
/// such as `google_sdk` or `sdk_gphone64_arm64`.
pub fn is_emulator(product: &str) -> bool {
    product == "sdk" || product.contains("_sdk") || product.contains("sdk_")
}

/// Identifying details of the build the application is running on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// `Build.PRODUCT`
    pub product: String,
    /// `Build.VERSION.SDK_INT`, if it could be read
    pub sdk_version: Option<i32>,
}

impl BuildInfo {
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            sdk_version: None,
        }
    }

    pub fn is_emulator(&self) -> bool {
        is_emulator(&self.product)
    }

    /// Reads the build details from the Android system properties
    ///
    /// Returns `None` if `ro.product.name` is not set.
    #[cfg(target_os = "android")]
    pub fn from_system_properties() -> Option<Self> {
        let mut product = android_properties::getprop("ro.product.name");
        let product = product.value()?;

        let mut sdk = android_properties::getprop("ro.build.version.sdk");
        let sdk_version = sdk.value().and_then(|val| {
            val.parse::<i32>()
                .map_err(|err| log::warn!("Failed to parse ro.build.version.sdk {val:?}: {err}"))
                .ok()
        });

        Some(Self {
            product,
            sdk_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emulator_products() {
        for product in ["sdk", "google_sdk", "sdk_x86", "sdk_gphone64_arm64", "aosp_sdk_phone"] {
            assert!(is_emulator(product), "{product} should be an emulator");
        }
    }

    #[test]
    fn device_products() {
        for product in ["generic", "", "sdkx", "xsdk", "SDK", "raven", "sdkless"] {
            assert!(!is_emulator(product), "{product} should not be an emulator");
        }
    }

    #[test]
    fn build_info_delegates() {
        assert!(BuildInfo::new("google_sdk").is_emulator());
        assert!(!BuildInfo::new("generic").is_emulator());
    }
}
