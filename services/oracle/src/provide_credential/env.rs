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
use crate::{constants::*, Credential, CredentialKind};
use async_trait::async_trait;
use log::debug;
use nosqlsign_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads a user principal from environment variables.
///
/// This provider looks for the following environment variables:
/// - `OCI_TENANCY`: The tenancy OCID
/// - `OCI_USER`: The user OCID
/// - `OCI_FINGERPRINT`: The fingerprint of the key
/// - `OCI_KEY_FILE`: The path to the private key file
/// - `OCI_PASS_PHRASE`: The passphrase of the private key (optional)
/// - `OCI_REGION`: The region (optional)
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider {}

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        let (Some(tenancy), Some(user), Some(fingerprint), Some(key_file)) = (
            envs.get(ORACLE_TENANCY),
            envs.get(ORACLE_USER),
            envs.get(ORACLE_FINGERPRINT),
            envs.get(ORACLE_KEY_FILE),
        ) else {
            debug!("oracle user principal environment variables are not complete, skipping");
            return Ok(None);
        };

        let private_key = read_key_file(ctx, key_file).await?;
        debug!("loaded oracle user principal from environment variables");

        Ok(Some(Credential {
            kind: CredentialKind::User,
            key_id: Credential::user_key_id(tenancy, user, fingerprint),
            private_key,
            passphrase: envs.get(ORACLE_PASS_PHRASE).cloned(),
            tenancy: Some(tenancy.clone()),
            region: envs.get(ORACLE_REGION).cloned(),
            claims: Default::default(),
        }))
    }
}
