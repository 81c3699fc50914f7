use serde::{Deserialize, Serialize};

/// Public model; serde is confined to this module tree.
///
/// Wire names match what the compose API expects: `baseurl` plus an
/// optional PEM-armored `gpgkey` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub(crate) baseurl: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) gpgkey: Option<String>,
}

impl Repository {
    // Borrowing getters (no clones).
    pub fn baseurl(&self) -> &str {
        &self.baseurl
    }

    pub fn gpgkey(&self) -> Option<&str> {
        self.gpgkey.as_deref()
    }
}
