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

use crate::{Credential, CredentialKind};
use async_trait::async_trait;
use nosqlsign_core::{Context, Error, ProvideCredential, Result};

#[derive(Debug, Clone)]
enum KeySource {
    Pem(String),
    File(String),
}

/// StaticCredentialProvider provides a user principal that is fixed at initialization time.
///
/// The private key is given either as PEM text or as a key file path that is read on every load.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    tenancy: String,
    user: String,
    fingerprint: String,
    key: KeySource,
    passphrase: Option<String>,
    region: Option<String>,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider with a private key in PEM format.
    pub fn new(tenancy: &str, user: &str, fingerprint: &str, private_key: &str) -> Self {
        Self {
            tenancy: tenancy.to_string(),
            user: user.to_string(),
            fingerprint: fingerprint.to_string(),
            key: KeySource::Pem(private_key.to_string()),
            passphrase: None,
            region: None,
        }
    }

    /// Create a new StaticCredentialProvider reading the private key from `key_file`.
    pub fn with_key_file(tenancy: &str, user: &str, fingerprint: &str, key_file: &str) -> Self {
        Self {
            key: KeySource::File(key_file.to_string()),
            ..Self::new(tenancy, user, fingerprint, "")
        }
    }

    /// Set the passphrase of the private key.
    pub fn with_passphrase(mut self, passphrase: &str) -> Self {
        self.passphrase = Some(passphrase.to_string());
        self
    }

    /// Set the region.
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let private_key = match &self.key {
            KeySource::Pem(pem) => pem.clone(),
            KeySource::File(path) => read_key_file(ctx, path).await?,
        };

        Ok(Some(Credential {
            kind: CredentialKind::User,
            key_id: Credential::user_key_id(&self.tenancy, &self.user, &self.fingerprint),
            private_key,
            passphrase: self.passphrase.clone(),
            tenancy: Some(self.tenancy.clone()),
            region: self.region.clone(),
            claims: Default::default(),
        }))
    }
}

/// Read a private key file, expanding a leading `~`.
pub(crate) async fn read_key_file(ctx: &Context, key_file: &str) -> Result<String> {
    let path = ctx
        .expand_home_dir(key_file)
        .ok_or_else(|| Error::unexpected("failed to expand home directory"))?;
    ctx.file_read_as_string(&path).await.map_err(|e| {
        Error::credential_invalid(format!("failed to read private key file {path}")).with_source(e)
    })
}
