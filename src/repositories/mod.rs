mod models;

use std::collections::HashMap;
use std::sync::OnceLock;

pub use models::Repository; // Re-export the model type to callers.

/// Distro-to-repository table shipped with the binary. The table is plain
/// constant data; it is parsed exactly once and never mutated.
const EMBEDDED_CATALOG: &str = include_str!("../../resources/repositories.json");

/// Single, module-private cache (set exactly once).
static CATALOG: OnceLock<HashMap<String, Vec<Repository>>> = OnceLock::new();

fn catalog() -> &'static HashMap<String, Vec<Repository>> {
    CATALOG.get_or_init(|| {
        serde_json::from_str(EMBEDDED_CATALOG).expect("invalid embedded repository catalog")
    })
}

// ---- Public API (serde hidden from callers) ----

/// Repositories for `distro`, in the order the compose request must carry
/// them. Unknown keys are a hard error; there is no fallback set.
pub fn for_distro(distro: &str) -> Result<&'static [Repository], CatalogError> {
    catalog()
        .get(distro)
        .map(|v| v.as_slice())
        .ok_or_else(|| CatalogError::UnknownDistribution(distro.to_string()))
}

/// Known distribution names, sorted, for the usage message.
pub fn known_distros() -> Vec<&'static str> {
    let mut names: Vec<&str> = catalog().keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}

/// ---- Errors ----
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("unknown distribution: {0}")]
    UnknownDistribution(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_distro_has_repositories() {
        for distro in known_distros() {
            let repos = for_distro(distro).unwrap();
            assert!(!repos.is_empty(), "empty repository list for {distro}");
        }
    }

    #[test]
    fn fedora_repositories_carry_a_gpg_key() {
        for distro in ["fedora-31", "fedora-32"] {
            let repos = for_distro(distro).unwrap();
            assert_eq!(repos.len(), 1);
            assert!(repos[0].baseurl().contains("download.fedoraproject.org"));
            let key = repos[0].gpgkey().expect("fedora repo must be signed");
            assert!(key.starts_with("-----BEGIN PGP PUBLIC KEY BLOCK-----"));
        }
    }

    #[test]
    fn rhel_8_lists_baseos_before_appstream() {
        let repos = for_distro("rhel-8").unwrap();
        assert_eq!(repos.len(), 2);
        assert!(repos[0].baseurl().contains("/BaseOS/"));
        assert!(repos[1].baseurl().contains("/AppStream/"));
        assert!(repos.iter().all(|r| r.gpgkey().is_none()));
    }

    #[test]
    fn unknown_distro_is_an_error() {
        let err = for_distro("unknown-distro").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownDistribution(ref name) if name == "unknown-distro"));
    }
}
