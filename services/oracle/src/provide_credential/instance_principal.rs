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

use crate::constants::SECURITY_TOKEN_KEY_ID_PREFIX;
use crate::{Credential, CredentialKind};
use async_trait::async_trait;
use log::debug;
use nosqlsign_core::utils::Redact;
use nosqlsign_core::{Context, Error, ProvideCredential, Result};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// SessionToken is a security token issued to a compute instance, with the ephemeral key
/// pair it is bound to.
#[derive(Clone, Default)]
pub struct SessionToken {
    /// The security token.
    pub token: String,
    /// PEM encoded private key of the session key pair.
    pub private_key: String,
    /// Passphrase of the private key, if it is encrypted.
    pub passphrase: Option<String>,
}

impl Debug for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("token", &Redact::from(&self.token))
            .field("private_key", &Redact::from(&self.private_key))
            .field("passphrase", &Redact::from(&self.passphrase))
            .finish()
    }
}

/// ProvideSessionToken is the federation client that exchanges the instance identity for
/// a session token.
///
/// Implementations are expected to cache the token and renew it before it expires, they
/// are called before every signature.
#[async_trait]
pub trait ProvideSessionToken: Debug + Send + Sync + 'static {
    /// Return the current session token.
    async fn provide_session_token(&self, ctx: &Context) -> Result<SessionToken>;
}

/// InstancePrincipalCredentialProvider signs as the compute instance it runs on.
#[derive(Debug, Clone)]
pub struct InstancePrincipalCredentialProvider {
    token_provider: Arc<dyn ProvideSessionToken>,
    region: Option<String>,
}

impl InstancePrincipalCredentialProvider {
    /// Create a new InstancePrincipalCredentialProvider on top of a federation client.
    pub fn new(token_provider: impl ProvideSessionToken) -> Self {
        Self {
            token_provider: Arc::new(token_provider),
            region: None,
        }
    }

    /// Set the region of the instance.
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }
}

#[async_trait]
impl ProvideCredential for InstancePrincipalCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let session = self.token_provider.provide_session_token(ctx).await?;
        if session.token.is_empty() {
            return Err(Error::credential_invalid(
                "federation client returned an empty session token",
            ));
        }
        debug!("loaded instance principal session token");

        Ok(Some(Credential {
            kind: CredentialKind::InstancePrincipal,
            key_id: format!("{SECURITY_TOKEN_KEY_ID_PREFIX}{}", session.token),
            private_key: session.private_key,
            passphrase: session.passphrase,
            tenancy: None,
            region: self.region.clone(),
            claims: Default::default(),
        }))
    }
}
