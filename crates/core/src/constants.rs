/// Constants shared by the helper and its clients

// Default host handling
pub const DEFAULT_HOST: &str = "rubygems";
pub const DEFAULT_HOST_ALIASES: &[&str] = &["rubygems", "rubygems_api_key"];

// Secret store naming
pub const API_KEY_SERVICE: &str = "gem-keychain.api-key";
pub const SIGNING_KEY_SERVICE: &str = "gem-keychain.signing-key";
pub const CERTIFICATE_SERVICE: &str = "gem-keychain.certificate";
pub const SIGNING_KEY_TAG: &str = "gem-keychain.key";

// Binary and file names
pub const HELPER_BINARY: &str = "gem-keychain-helper";
pub const APP_DIR_NAME: &str = "gem-keychain";
pub const HELPER_CONFIG_FILENAME: &str = "helper.json";

// Environment variable names
pub const HELPER_PATH_VAR: &str = "GEM_KEYCHAIN_HELPER";
pub const CREDENTIALS_PATH_VAR: &str = "GEM_KEYCHAIN_CREDENTIALS";
pub const CONFIG_PATH_VAR: &str = "GEM_KEYCHAIN_CONFIG";
pub const BACKEND_VAR: &str = "GEM_KEYCHAIN_BACKEND";
pub const STORE_DIR_VAR: &str = "GEM_KEYCHAIN_STORE_DIR";
pub const LOG_VAR: &str = "GEM_KEYCHAIN_LOG";

// Signing identity defaults
pub const DEFAULT_KEY_BITS: usize = 3072;
pub const MIN_KEY_BITS: usize = 1024;
pub const DEFAULT_CERT_VALIDITY_DAYS: u32 = 365;
pub const DEFAULT_CERT_SUBJECT: &str = "CN=gem-keychain,O=RubyGems";
