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

//! Integration tests for ProvideCredentialChain with Oracle NoSQL credentials

use async_trait::async_trait;
use nosqlsign_core::ProvideCredentialChain;
use nosqlsign_core::{Context, Error, ProvideCredential, Result, StaticEnv};
use nosqlsign_file_read_tokio::TokioFileRead;
use nosqlsign_oracle::{
    Credential, CredentialKind, DefaultCredentialProvider, EnvCredentialProvider,
    ResourcePrincipalCredentialProvider,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const PKCS8: &str = include_str!("../testdata/key_pkcs8.pem");
const RPST: &str = "eyJhbGciOiJSUzI1NiJ9.eyJyZXNfdGVuYW50Ijoib2NpZDEudGVuYW5jeS5vYzEuLnRlbmFudCJ9.c2ln";

/// Mock provider that tracks how many times it was called
#[derive(Debug)]
struct CountingProvider {
    name: String,
    outcome: Outcome,
    call_count: Arc<AtomicUsize>,
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Found,
    Missing,
    Broken,
}

impl CountingProvider {
    fn new(name: &str, outcome: Outcome) -> (Self, Arc<AtomicUsize>) {
        let call_count = Arc::new(AtomicUsize::new(0));
        let provider = Self {
            name: name.to_string(),
            outcome,
            call_count: call_count.clone(),
        };
        (provider, call_count)
    }
}

#[async_trait]
impl ProvideCredential for CountingProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _ctx: &Context) -> Result<Option<Self::Credential>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        match self.outcome {
            Outcome::Found => Ok(Some(Credential {
                key_id: Credential::user_key_id(
                    &format!("{}_tenancy", self.name),
                    &format!("{}_user", self.name),
                    "fingerprint",
                ),
                private_key: PKCS8.to_string(),
                tenancy: Some(format!("{}_tenancy", self.name)),
                ..Default::default()
            })),
            Outcome::Missing => Ok(None),
            Outcome::Broken => Err(Error::credential_invalid("broken provider")),
        }
    }
}

fn context(envs: &[(&str, &str)]) -> Context {
    Context::new()
        .with_file_read(TokioFileRead)
        .with_env(StaticEnv {
            home_dir: None,
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
}

#[tokio::test]
async fn test_chain_stops_at_first_success() {
    let ctx = context(&[]);

    let (p1, count1) = CountingProvider::new("provider1", Outcome::Missing);
    let (p2, count2) = CountingProvider::new("provider2", Outcome::Broken);
    let (p3, count3) = CountingProvider::new("provider3", Outcome::Found);
    let (p4, count4) = CountingProvider::new("provider4", Outcome::Found);
    let chain = ProvideCredentialChain::new()
        .push(p1)
        .push(p2)
        .push(p3)
        .push(p4);

    let cred = chain.provide_credential(&ctx).await.unwrap().unwrap();
    assert_eq!(cred.key_id, "provider3_tenancy/provider3_user/fingerprint");
    assert_eq!(cred.tenancy.as_deref(), Some("provider3_tenancy"));

    assert_eq!(count1.load(Ordering::SeqCst), 1);
    assert_eq!(count2.load(Ordering::SeqCst), 1);
    assert_eq!(count3.load(Ordering::SeqCst), 1);
    assert_eq!(count4.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chain_prefers_resource_principal() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = dir.path().join("key.pem");
    std::fs::write(&key_path, PKCS8).unwrap();
    let key_path = key_path.to_string_lossy().to_string();

    let user_envs = [
        ("OCI_TENANCY", "ocid1.tenancy.acme"),
        ("OCI_USER", "ocid1.user.bob"),
        ("OCI_FINGERPRINT", "aa:bb"),
        ("OCI_KEY_FILE", key_path.as_str()),
    ];
    let chain = ProvideCredentialChain::new()
        .push(ResourcePrincipalCredentialProvider::new())
        .push(EnvCredentialProvider::new());

    let cred = chain
        .provide_credential(&context(&user_envs))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cred.kind, CredentialKind::User);

    let mut all_envs = user_envs.to_vec();
    all_envs.extend([
        ("OCI_RESOURCE_PRINCIPAL_VERSION", "2.2"),
        ("OCI_RESOURCE_PRINCIPAL_RPST", RPST),
        ("OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM", PKCS8),
    ]);
    let cred = chain
        .provide_credential(&context(&all_envs))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cred.kind, CredentialKind::ResourcePrincipal);
    assert_eq!(
        cred.claims.get("res_tenant").map(String::as_str),
        Some("ocid1.tenancy.oc1..tenant")
    );
}

#[tokio::test]
async fn test_default_provider_without_sources_returns_none() {
    let ctx = context(&[]);
    let result = DefaultCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_chain_all_providers_return_none() {
    let ctx = context(&[]);

    let (p1, count1) = CountingProvider::new("provider1", Outcome::Missing);
    let (p2, count2) = CountingProvider::new("provider2", Outcome::Missing);
    let chain = ProvideCredentialChain::new().push(p1).push(p2);

    let result = chain.provide_credential(&ctx).await.unwrap();
    assert!(result.is_none());

    assert_eq!(count1.load(Ordering::SeqCst), 1);
    assert_eq!(count2.load(Ordering::SeqCst), 1);
}

