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

use crate::constants::*;
use crate::{Credential, CredentialKind};
use async_trait::async_trait;
use log::debug;
use nosqlsign_core::hash::base64_url_decode;
use nosqlsign_core::{Context, Error, ProvideCredential, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// ResourcePrincipalCredentialProvider loads a resource principal from the environment of
/// an OCI function or other resource.
///
/// It only acts when `OCI_RESOURCE_PRINCIPAL_VERSION` is set, and only version `2.2` is
/// understood:
/// - `OCI_RESOURCE_PRINCIPAL_RPST`: the session token, or an absolute path to a file holding it
/// - `OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM`: the private key, or an absolute path to it
/// - `OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM_PASSPHRASE`: the key passphrase or a path to it (optional)
/// - `OCI_RESOURCE_PRINCIPAL_REGION`: the region (optional)
///
/// Files are re-read on every load so that rotated tokens and keys are picked up.
#[derive(Debug, Default, Clone)]
pub struct ResourcePrincipalCredentialProvider {}

impl ResourcePrincipalCredentialProvider {
    /// Create a new ResourcePrincipalCredentialProvider.
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl ProvideCredential for ResourcePrincipalCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let Some(version) = ctx.env_var(RP_VERSION) else {
            debug!("{RP_VERSION} is not set, skipping resource principal");
            return Ok(None);
        };
        if version != RP_VERSION_2_2 {
            return Err(Error::unsupported(format!(
                "resource principal version {version} is not supported"
            )));
        }

        let rpst = required_env(ctx, RP_RPST)?;
        let private_pem = required_env(ctx, RP_PRIVATE_PEM)?;

        let token = read_value_or_file(ctx, &rpst).await?;
        let private_key = read_value_or_file(ctx, &private_pem).await?;
        let passphrase = match ctx.env_var(RP_PRIVATE_PEM_PASSPHRASE) {
            Some(v) => Some(read_value_or_file(ctx, &v).await?),
            None => None,
        };
        let claims = parse_token_claims(&token)?;
        debug!("loaded resource principal session token");

        Ok(Some(Credential {
            kind: CredentialKind::ResourcePrincipal,
            key_id: format!("{SECURITY_TOKEN_KEY_ID_PREFIX}{token}"),
            private_key,
            passphrase,
            tenancy: None,
            region: ctx.env_var(RP_REGION),
            claims,
        }))
    }
}

fn required_env(ctx: &Context, key: &str) -> Result<String> {
    ctx.env_var(key).ok_or_else(|| {
        Error::config_invalid(format!("{key} is required for resource principal"))
    })
}

/// Absolute paths are read from disk, anything else is the value itself.
async fn read_value_or_file(ctx: &Context, value: &str) -> Result<String> {
    if !Path::new(value).is_absolute() {
        return Ok(value.to_string());
    }

    let content = ctx.file_read_as_string(value).await.map_err(|e| {
        Error::credential_invalid(format!("failed to read resource principal file {value}"))
            .with_source(e)
    })?;
    Ok(content.trim().to_string())
}

/// Decode the claims of a JWT without verifying it.
///
/// Non-string claims are kept in their JSON text form.
fn parse_token_claims(token: &str) -> Result<HashMap<String, String>> {
    let mut parts = token.split('.');
    let (Some(_), Some(payload), Some(_), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::credential_invalid(
            "resource principal session token is not a valid JWT",
        ));
    };

    let payload = base64_url_decode(payload).map_err(|e| {
        Error::credential_invalid("failed to decode resource principal session token")
            .with_source(e)
    })?;
    let claims: HashMap<String, Value> = serde_json::from_slice(&payload).map_err(|e| {
        Error::credential_invalid("failed to parse resource principal session token claims")
            .with_source(e)
    })?;

    Ok(claims
        .into_iter()
        .map(|(k, v)| match v {
            Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect())
}
