//! Stable constants shared across services.

/// Environment variable consulted when resolving the trusted store.
pub const STORE_ENV: &str = "SSL_CERT_FILE";

/// Override for nonstandard AWS CLI install locations.
pub const AWS_BUNDLE_OVERRIDE_ENV: &str = "CERTUP_AWS_BUNDLE";

/// Bundle vendored by the windows AWS CLI installer.
pub const AWS_BUNDLE_WINDOWS: &str =
    r"C:\Program Files\Amazon\AWSCLI\botocore\vendored\requests\cacert.pem";
