//! SSH keypair provisioning
//!
//! One branch, two terminal paths: a local public key is imported under the
//! logical name; no local key means the cloud generates a pair whose
//! private key is returned exactly once and must be persisted immediately.
//! A persistence failure after cloud-side creation is unrecoverable and the
//! error says so.

use crate::error::{ProvisionError, Result};
use crate::report::{Ensured, ProvisionReport};
use lakeflow_cloud::CloudProvider;
use lakeflow_core::KeypairConfig;
use std::path::Path;
use tokio::fs;

/// How the keypair was ensured
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeypairOutcome {
    /// Cloud generated the pair; both files were persisted locally
    Generated,
    /// Existing local public key was imported into the cloud
    Imported,
    /// Keypair was already registered, nothing to do
    Reused,
}

/// Ensure the keypair exists locally and in the cloud
pub async fn ensure_keypair(
    provider: &dyn CloudProvider,
    config: &KeypairConfig,
    report: &mut ProvisionReport,
) -> Result<KeypairOutcome> {
    let registered = provider.get_keypair(&config.name).await?.is_some();

    if config.public_key.exists() {
        if registered {
            report.add("keypair", &config.name, Ensured::Reused);
            return Ok(KeypairOutcome::Reused);
        }
        let public_key = fs::read_to_string(&config.public_key).await?;
        provider
            .import_keypair(&config.name, public_key.trim())
            .await?;
        report.add("keypair", &config.name, Ensured::Created);
        tracing::info!(
            name = %config.name,
            public_key = %config.public_key.display(),
            "Imported existing public key"
        );
        return Ok(KeypairOutcome::Imported);
    }

    if registered {
        // Cloud knows the key but the local half is gone; generating a new
        // pair under the same name would fail, importing is impossible
        return Err(ProvisionError::KeypairConflict {
            name: config.name.clone(),
        });
    }

    let created = provider.generate_keypair(&config.name).await?;
    persist(&config.private_key, &created.private_key, 0o600).await?;
    persist(&config.public_key, &created.public_key, 0o644).await?;
    report.add("keypair", &config.name, Ensured::Created);
    tracing::info!(
        name = %config.name,
        private_key = %config.private_key.display(),
        public_key = %config.public_key.display(),
        "Generated keypair and persisted key files"
    );
    Ok(KeypairOutcome::Generated)
}

/// Write key material with the given mode; failures are unrecoverable
/// because the cloud-side keypair already exists
async fn persist(path: &Path, content: &str, mode: u32) -> Result<()> {
    let write = async {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(path, content).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
        }
        #[cfg(not(unix))]
        let _ = mode;
        Ok::<(), std::io::Error>(())
    };

    write.await.map_err(|source| ProvisionError::KeyPersistFailed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakeflow_cloud::mock::MockCloud;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn config(dir: &Path) -> KeypairConfig {
        KeypairConfig {
            name: "dlaas_key".to_string(),
            public_key: dir.join("keys/dlaas_key.pub"),
            private_key: dir.join("keys/dlaas_key"),
        }
    }

    #[tokio::test]
    async fn fresh_run_generates_and_persists_both_files() {
        let dir = tempdir().unwrap();
        let mock = MockCloud::new();
        let config = config(dir.path());
        let mut report = ProvisionReport::new();

        let outcome = ensure_keypair(&mock, &config, &mut report).await.unwrap();
        assert_eq!(outcome, KeypairOutcome::Generated);
        assert!(config.private_key.exists());
        assert!(config.public_key.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let private_mode =
                std::fs::metadata(&config.private_key).unwrap().permissions().mode() & 0o777;
            let public_mode =
                std::fs::metadata(&config.public_key).unwrap().permissions().mode() & 0o777;
            assert_eq!(private_mode, 0o600);
            assert_eq!(public_mode, 0o644);
        }
    }

    #[tokio::test]
    async fn existing_public_key_is_imported_without_private_key() {
        let dir = tempdir().unwrap();
        let mock = MockCloud::new();
        let config = config(dir.path());
        std::fs::create_dir_all(config.public_key.parent().unwrap()).unwrap();
        std::fs::write(&config.public_key, "ssh-rsa AAAAexisting user@host\n").unwrap();
        let mut report = ProvisionReport::new();

        let outcome = ensure_keypair(&mock, &config, &mut report).await.unwrap();
        assert_eq!(outcome, KeypairOutcome::Imported);
        assert!(!config.private_key.exists());
        assert_eq!(mock.mutations(), vec!["import_keypair dlaas_key"]);
    }

    #[tokio::test]
    async fn registered_key_with_local_public_key_is_reused() {
        let dir = tempdir().unwrap();
        let mock = MockCloud::new();
        let config = config(dir.path());
        std::fs::create_dir_all(config.public_key.parent().unwrap()).unwrap();
        std::fs::write(&config.public_key, "ssh-rsa AAAAexisting user@host\n").unwrap();
        mock.import_keypair("dlaas_key", "ssh-rsa AAAAexisting")
            .await
            .unwrap();
        let mut report = ProvisionReport::new();

        let outcome = ensure_keypair(&mock, &config, &mut report).await.unwrap();
        assert_eq!(outcome, KeypairOutcome::Reused);
        assert_eq!(mock.mutations().len(), 1); // only the seeding import
    }

    #[tokio::test]
    async fn cloud_key_without_local_key_is_a_conflict() {
        let dir = tempdir().unwrap();
        let mock = MockCloud::new();
        mock.import_keypair("dlaas_key", "ssh-rsa AAAAorphan")
            .await
            .unwrap();
        let mut report = ProvisionReport::new();

        let err = ensure_keypair(&mock, &config(dir.path()), &mut report)
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::KeypairConflict { .. }));
    }

    #[tokio::test]
    async fn persist_failure_reports_the_unrecoverable_path() {
        let mock = MockCloud::new();
        // A private-key path under a file (not a directory) cannot be created
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let config = KeypairConfig {
            name: "dlaas_key".to_string(),
            public_key: dir.path().join("missing/dlaas_key.pub"),
            private_key: blocker.join("dlaas_key"),
        };
        let mut report = ProvisionReport::new();

        let err = ensure_keypair(&mock, &config, &mut report).await.unwrap_err();
        match err {
            ProvisionError::KeyPersistFailed { path, .. } => {
                assert_eq!(path, PathBuf::from(blocker.join("dlaas_key")));
            }
            other => panic!("expected KeyPersistFailed, got {other}"),
        }
    }
}
