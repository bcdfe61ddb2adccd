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

//! Resolve a credential through a chain of custom providers.
//!
//! ```shell
//! RUST_LOG=debug MY_KEY_ID=ocid1.tenancy.oc1..aaa/ocid1.user.oc1..bbb/aa:bb cargo run --example credential_chain
//! ```

use async_trait::async_trait;
use nosqlsign_core::{Context, OsEnv, ProvideCredential, ProvideCredentialChain, Result};
use nosqlsign_core::{Error, SigningCredential};

#[derive(Clone, Debug)]
struct MyCredential {
    key_id: String,
    source: &'static str,
}

impl SigningCredential for MyCredential {
    fn is_valid(&self) -> bool {
        !self.key_id.is_empty()
    }
}

/// Reads the key id from `MY_KEY_ID`.
#[derive(Debug)]
struct EnvProvider;

#[async_trait]
impl ProvideCredential for EnvProvider {
    type Credential = MyCredential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        Ok(ctx.env_var("MY_KEY_ID").map(|key_id| MyCredential {
            key_id,
            source: "environment",
        }))
    }
}

/// Always fails, the chain logs it and moves on.
#[derive(Debug)]
struct UnreachableProvider;

#[async_trait]
impl ProvideCredential for UnreachableProvider {
    type Credential = MyCredential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Err(Error::unexpected("credential service is unreachable"))
    }
}

/// Used when nothing else is configured.
#[derive(Debug)]
struct FallbackProvider;

#[async_trait]
impl ProvideCredential for FallbackProvider {
    type Credential = MyCredential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(MyCredential {
            key_id: "ocid1.tenancy.oc1..demo/ocid1.user.oc1..demo/00:00".to_string(),
            source: "fallback",
        }))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let ctx = Context::new().with_env(OsEnv);
    let chain = ProvideCredentialChain::new()
        .push(EnvProvider)
        .push(UnreachableProvider)
        .push(FallbackProvider);

    match chain.provide_credential(&ctx).await? {
        Some(cred) if cred.is_valid() => {
            println!("resolved key id {} from {}", cred.key_id, cred.source)
        }
        _ => println!("no credential resolved"),
    }
    Ok(())
}
