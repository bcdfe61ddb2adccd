// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use super::static_::read_key_file;
use crate::constants::*;
use crate::{Credential, CredentialKind};
use async_trait::async_trait;
use ini::Ini;
use log::debug;
use nosqlsign_core::{Context, Error, ProvideCredential, Result};

/// ConfigFileCredentialProvider loads a user principal from the OCI config file (`~/.oci/config`).
///
/// The config file path and profile name are resolved in this order:
/// - the value set on the provider with [`Self::with_config_file`] / [`Self::with_profile`]
/// - `OCI_CONFIG_FILE` / `OCI_PROFILE`
/// - `~/.oci/config` / `DEFAULT`
///
/// A missing file or profile yields no credential. A profile that names a key file that
/// cannot be read is an error.
#[derive(Debug, Default, Clone)]
pub struct ConfigFileCredentialProvider {
    config_file: Option<String>,
    profile: Option<String>,
}

impl ConfigFileCredentialProvider {
    /// Create a new ConfigFileCredentialProvider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this config file instead of the default one.
    pub fn with_config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Use this profile instead of the default one.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

#[async_trait]
impl ProvideCredential for ConfigFileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let config_file = self
            .config_file
            .clone()
            .or_else(|| ctx.env_var(ORACLE_CONFIG_FILE))
            .unwrap_or_else(|| ORACLE_CONFIG_PATH.to_string());
        let profile = self
            .profile
            .clone()
            .or_else(|| ctx.env_var(ORACLE_PROFILE))
            .unwrap_or_else(|| ORACLE_DEFAULT_PROFILE.to_string());

        let Some(expanded_path) = ctx.expand_home_dir(&config_file) else {
            debug!("home directory is unknown, skipping oracle config file");
            return Ok(None);
        };

        let content = match ctx.file_read_as_string(&expanded_path).await {
            Ok(content) => content,
            Err(_) => {
                debug!("oracle config file not found at {expanded_path:?}");
                return Ok(None);
            }
        };

        let ini = Ini::load_from_str(&content).map_err(|e| {
            Error::config_invalid(format!("failed to parse config file {expanded_path}"))
                .with_source(e)
        })?;
        let Some(section) = ini.section(Some(profile.as_str())) else {
            debug!("profile {profile} not found in config file {expanded_path}");
            return Ok(None);
        };

        let (Some(tenancy), Some(user), Some(fingerprint), Some(key_file)) = (
            section.get("tenancy"),
            section.get("user"),
            section.get("fingerprint"),
            section.get("key_file"),
        ) else {
            debug!("profile {profile} in config file is incomplete, skipping");
            return Ok(None);
        };

        let private_key = read_key_file(ctx, key_file).await?;
        debug!("loaded oracle user principal from profile {profile} of {expanded_path}");

        Ok(Some(Credential {
            kind: CredentialKind::User,
            key_id: Credential::user_key_id(tenancy, user, fingerprint),
            private_key,
            passphrase: section.get("pass_phrase").map(|s| s.to_string()),
            tenancy: Some(tenancy.to_string()),
            region: section.get("region").map(|s| s.to_string()),
            claims: Default::default(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nosqlsign_core::{ErrorKind, StaticEnv};
    use nosqlsign_file_read_tokio::TokioFileRead;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::path::Path;

    const PKCS8: &str = include_str!("../../testdata/key_pkcs8.pem");

    fn write_config(dir: &Path) -> anyhow::Result<String> {
        let key_path = dir.join("oci_api_key.pem");
        std::fs::write(&key_path, PKCS8)?;

        let config_path = dir.join("config");
        std::fs::write(
            &config_path,
            format!(
                "[DEFAULT]\n\
                 user=ocid1.user.bob\n\
                 fingerprint=aa:bb\n\
                 tenancy=ocid1.tenancy.acme\n\
                 region=us-phoenix-1\n\
                 key_file={key}\n\
                 \n\
                 [ADMIN]\n\
                 user=ocid1.user.alice\n\
                 fingerprint=cc:dd\n\
                 tenancy=ocid1.tenancy.acme\n\
                 key_file={key}\n\
                 pass_phrase=secret\n\
                 \n\
                 [BROKEN]\n\
                 user=ocid1.user.eve\n",
                key = key_path.display()
            ),
        )?;
        Ok(config_path.to_string_lossy().to_string())
    }

    fn context(envs: HashMap<String, String>, home_dir: Option<&Path>) -> Context {
        Context::new()
            .with_file_read(TokioFileRead)
            .with_env(StaticEnv {
                home_dir: home_dir.map(Path::to_path_buf),
                envs,
            })
    }

    #[tokio::test]
    async fn test_config_file_default_profile() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = write_config(dir.path())?;
        let ctx = context(
            HashMap::from([(ORACLE_CONFIG_FILE.to_string(), config_path)]),
            None,
        );

        let cred = ConfigFileCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("credential must be loaded");
        assert_eq!(cred.key_id, "ocid1.tenancy.acme/ocid1.user.bob/aa:bb");
        assert_eq!(cred.region.as_deref(), Some("us-phoenix-1"));
        assert_eq!(cred.private_key, PKCS8);
        assert!(cred.passphrase.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_config_file_profile_from_env_and_builder() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = write_config(dir.path())?;

        let ctx = context(
            HashMap::from([
                (ORACLE_CONFIG_FILE.to_string(), config_path.clone()),
                (ORACLE_PROFILE.to_string(), "ADMIN".to_string()),
            ]),
            None,
        );
        let cred = ConfigFileCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("credential must be loaded");
        assert_eq!(cred.key_id, "ocid1.tenancy.acme/ocid1.user.alice/cc:dd");
        assert_eq!(cred.passphrase.as_deref(), Some("secret"));

        // Builder settings win over the environment.
        let cred = ConfigFileCredentialProvider::new()
            .with_config_file(config_path)
            .with_profile("DEFAULT")
            .provide_credential(&ctx)
            .await?
            .expect("credential must be loaded");
        assert_eq!(cred.key_id, "ocid1.tenancy.acme/ocid1.user.bob/aa:bb");
        Ok(())
    }

    #[tokio::test]
    async fn test_config_file_in_home_dir() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        std::fs::create_dir(home.path().join(".oci"))?;
        write_config(&home.path().join(".oci"))?;

        let ctx = context(HashMap::new(), Some(home.path()));
        let cred = ConfigFileCredentialProvider::new()
            .provide_credential(&ctx)
            .await?;
        assert!(cred.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_config_file_missing_or_incomplete() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = write_config(dir.path())?;
        let ctx = context(HashMap::new(), Some(dir.path()));

        let provider = ConfigFileCredentialProvider::new().with_config_file("/no/such/config");
        assert!(provider.provide_credential(&ctx).await?.is_none());

        let provider = ConfigFileCredentialProvider::new()
            .with_config_file(config_path.clone())
            .with_profile("MISSING");
        assert!(provider.provide_credential(&ctx).await?.is_none());

        let provider = ConfigFileCredentialProvider::new()
            .with_config_file(config_path)
            .with_profile("BROKEN");
        assert!(provider.provide_credential(&ctx).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_config_file_unreadable_key_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("config");
        std::fs::write(
            &config_path,
            "[DEFAULT]\nuser=u\nfingerprint=f\ntenancy=t\nkey_file=/no/such/key.pem\n",
        )?;

        let ctx = context(HashMap::new(), None);
        let err = ConfigFileCredentialProvider::new()
            .with_config_file(config_path.to_string_lossy())
            .provide_credential(&ctx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        Ok(())
    }
}
