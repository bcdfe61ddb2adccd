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

use crate::provide_credential::{ConfigFileCredentialProvider, EnvCredentialProvider};
use crate::Credential;
use async_trait::async_trait;
use nosqlsign_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// Default loader for Oracle Cloud Infrastructure user principals.
///
/// This loader will try to load credentials in the following order:
/// 1. From environment variables
/// 2. From the OCI config file (`~/.oci/config`)
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a new DefaultCredentialProvider.
    pub fn new() -> Self {
        Self::with_config_file_provider(ConfigFileCredentialProvider::new())
    }

    /// Create a new DefaultCredentialProvider with a customized config file provider.
    pub fn with_config_file_provider(provider: ConfigFileCredentialProvider) -> Self {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(provider);

        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use nosqlsign_core::StaticEnv;
    use nosqlsign_file_read_tokio::TokioFileRead;
    use std::collections::HashMap;

    const PKCS8: &str = include_str!("../../testdata/key_pkcs8.pem");

    #[tokio::test]
    async fn test_default_prefers_env() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let key_path = dir.path().join("key.pem");
        std::fs::write(&key_path, PKCS8)?;
        let config_path = dir.path().join("config");
        std::fs::write(
            &config_path,
            format!(
                "[DEFAULT]\n\
                 user=ocid1.user.file\n\
                 fingerprint=ff\n\
                 tenancy=ocid1.tenancy.file\n\
                 key_file={}\n",
                key_path.display()
            ),
        )?;

        let mut envs = HashMap::from([(
            ORACLE_CONFIG_FILE.to_string(),
            config_path.to_string_lossy().to_string(),
        )]);
        let ctx = Context::new()
            .with_file_read(TokioFileRead)
            .with_env(StaticEnv {
                home_dir: None,
                envs: envs.clone(),
            });
        let cred = DefaultCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .unwrap();
        assert_eq!(cred.key_id, "ocid1.tenancy.file/ocid1.user.file/ff");

        envs.extend([
            (ORACLE_TENANCY.to_string(), "ocid1.tenancy.env".to_string()),
            (ORACLE_USER.to_string(), "ocid1.user.env".to_string()),
            (ORACLE_FINGERPRINT.to_string(), "ee".to_string()),
            (
                ORACLE_KEY_FILE.to_string(),
                key_path.to_string_lossy().to_string(),
            ),
        ]);
        let ctx = ctx.with_env(StaticEnv {
            home_dir: None,
            envs,
        });
        let cred = DefaultCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .unwrap();
        assert_eq!(cred.key_id, "ocid1.tenancy.env/ocid1.user.env/ee");
        Ok(())
    }

    #[tokio::test]
    async fn test_default_without_any_source() -> anyhow::Result<()> {
        let ctx = Context::new().with_file_read(TokioFileRead).with_env(StaticEnv {
            home_dir: None,
            envs: HashMap::new(),
        });
        assert!(DefaultCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .is_none());
        Ok(())
    }
}
