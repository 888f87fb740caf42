//! Buffers for secret material

use zeroize::Zeroizing;

/// Secret bytes that are wiped when dropped
pub type SecretBytes = Zeroizing<Vec<u8>>;

/// Secret text that is wiped when dropped
pub type SecretText = Zeroizing<String>;
