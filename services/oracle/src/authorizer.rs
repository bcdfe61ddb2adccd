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

use crate::cache::{ComputeSignature, SignatureCache};
use crate::constants::REQUEST_COMPARTMENT_ID;
use crate::key::KeyMaterial;
use crate::{Config, Credential, CredentialKind, RequestSigner, SignatureEntry};
use async_trait::async_trait;
use http::header::{AUTHORIZATION, DATE};
use http::{HeaderMap, HeaderName, HeaderValue};
use log::{debug, error};
use nosqlsign_core::{Context, Error, ErrorKind, ProvideCredential, Result, SigningCredential};
use rsa::RsaPrivateKey;
use std::sync::{Arc, Mutex};

/// Authorizer attaches the signature headers required by the Oracle NoSQL data endpoint.
///
/// All requests share one cached signature that is refreshed in the background before it
/// expires, see [`Config`] for the timing knobs. Cloning is cheap and clones share the cache.
///
/// ```no_run
/// use nosqlsign_core::Context;
/// use nosqlsign_oracle::{Authorizer, Config, DefaultCredentialProvider};
///
/// # async fn example(ctx: Context) -> nosqlsign_core::Result<()> {
/// let endpoint = "https://nosql.us-ashburn-1.oci.oraclecloud.com";
/// let config = Config::default().with_service_url(endpoint)?;
/// let authorizer = Authorizer::new(ctx, DefaultCredentialProvider::new(), config)?;
///
/// let (mut parts, _body) = http::Request::post(format!("{endpoint}/V0/nosql/data"))
///     .body(())
///     .unwrap()
///     .into_parts();
/// authorizer.sign(&mut parts, Some("ocid1.compartment.oc1..example")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Authorizer {
    source: Arc<SignatureSource>,
    cache: Arc<SignatureCache>,
}

#[derive(Debug)]
struct SignatureSource {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = Credential>>,
    credential: Mutex<Option<Credential>>,
    key: KeyMaterial,
    signer: Option<RequestSigner>,
}

impl Authorizer {
    /// Create a new authorizer.
    ///
    /// Returns a config error if the config is invalid. A missing service host is only
    /// reported when a signature is requested.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = Credential>,
        config: Config,
    ) -> Result<Self> {
        config.validate()?;

        let source = Arc::new(SignatureSource {
            ctx,
            loader: Arc::new(loader),
            credential: Mutex::new(None),
            key: KeyMaterial::new(),
            signer: config.service_host.map(RequestSigner::new),
        });
        let cache = SignatureCache::new(
            source.clone(),
            config.max_lifetime,
            config.refresh_lead_time,
        )?;

        Ok(Self {
            source,
            cache: Arc::new(cache),
        })
    }

    /// Returns the value of the `authorization` header.
    ///
    /// `Ok(None)` means the signature could not be computed this time and the request
    /// should be retried.
    pub async fn authorization_string(&self) -> Result<Option<String>> {
        Ok(self
            .signature()
            .await?
            .map(|entry| entry.header_value().to_string()))
    }

    /// Build the `authorization`, `date` and `x-nosql-compartment-id` headers.
    ///
    /// When `compartment` is `None`, user principals fall back to their tenancy. Other
    /// principals have no default and a config error is returned.
    pub async fn authorize(&self, compartment: Option<&str>) -> Result<Option<HeaderMap>> {
        let Some(entry) = self.signature().await? else {
            return Ok(None);
        };

        let compartment = match compartment {
            Some(v) => v.to_string(),
            None => self.default_compartment().ok_or_else(|| {
                Error::config_invalid("compartment is required for this kind of principal")
            })?,
        };

        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(entry.header_value())?);
        headers.insert(DATE, HeaderValue::from_str(entry.date())?);
        headers.insert(
            HeaderName::from_static(REQUEST_COMPARTMENT_ID),
            HeaderValue::from_str(&compartment)?,
        );
        Ok(Some(headers))
    }

    /// Sign the request in place.
    ///
    /// The request is left untouched when no signature is available this time.
    pub async fn sign(
        &self,
        req: &mut http::request::Parts,
        compartment: Option<&str>,
    ) -> Result<()> {
        match self.authorize(compartment).await? {
            Some(headers) => req.headers.extend(headers),
            None => debug!("no signature available, request is sent without authorization"),
        }
        Ok(())
    }

    /// Region of the loaded credential, if it has one.
    ///
    /// Credentials are loaded lazily, so this returns `None` until the first call to
    /// [`Authorizer::authorization_string`], [`Authorizer::authorize`] or
    /// [`Authorizer::sign`] has loaded one. For rotating principals it follows the most
    /// recently loaded credential.
    pub fn region(&self) -> Option<String> {
        self.source
            .credential
            .lock()
            .expect("lock poisoned")
            .as_ref()
            .and_then(|c| c.region.clone())
    }

    /// Returns a claim of the resource principal session token.
    ///
    /// Only resource principals carry claims, any other principal returns an unsupported error.
    pub async fn resource_principal_claim(&self, name: &str) -> Result<Option<String>> {
        let cred = match self.source.cached_credential() {
            Some(cred) => cred,
            None => self.source.load().await?.0,
        };
        if cred.kind != CredentialKind::ResourcePrincipal {
            return Err(Error::unsupported(format!(
                "{:?} credential has no resource principal claims",
                cred.kind
            )));
        }
        Ok(cred.claims.get(name).cloned())
    }

    /// Stop the background refresh and drop the cached signature.
    ///
    /// The authorizer can still be used afterwards, it signs on demand again.
    pub fn close(&self) {
        self.cache.close();
    }

    async fn signature(&self) -> Result<Option<Arc<SignatureEntry>>> {
        if self.source.signer.is_none() {
            return Err(Error::config_invalid("service host is not configured"));
        }
        accept_signing_failure(self.cache.get_or_compute().await)
    }

    fn default_compartment(&self) -> Option<String> {
        self.source
            .cached_credential()
            .and_then(|c| c.default_compartment().map(str::to_string))
    }
}

/// A failed signature is reported as "no signature" so that the caller can retry.
fn accept_signing_failure(
    result: Result<Arc<SignatureEntry>>,
) -> Result<Option<Arc<SignatureEntry>>> {
    match result {
        Ok(entry) => Ok(Some(entry)),
        Err(err) if err.kind() == ErrorKind::SigningFailed => {
            error!("failed to compute request signature: {err}");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

impl SignatureSource {
    fn cached_credential(&self) -> Option<Credential> {
        self.credential.lock().expect("lock poisoned").clone()
    }

    /// Load the credential and its private key.
    async fn load(&self) -> Result<(Credential, Arc<RsaPrivateKey>)> {
        let cred = self
            .loader
            .provide_credential(&self.ctx)
            .await?
            .ok_or_else(|| Error::credential_invalid("no valid credential found"))?;
        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "credential has no key id or private key",
            ));
        }

        let key = self.key.reload(&cred.private_key, cred.passphrase.as_deref())?;
        *self.credential.lock().expect("lock poisoned") = Some(cred.clone());
        Ok((cred, key))
    }

    /// Rotating principals are loaded again for every signature, user principals once.
    async fn credential_and_key(&self) -> Result<(Credential, Arc<RsaPrivateKey>)> {
        if let (Some(cred), Some(key)) = (self.cached_credential(), self.key.get()) {
            if !cred.kind.is_rotating() {
                return Ok((cred, key));
            }
        }
        self.load().await
    }
}

#[async_trait]
impl ComputeSignature for SignatureSource {
    async fn compute_signature(&self) -> Result<SignatureEntry> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| Error::config_invalid("service host is not configured"))?;

        let (cred, key) = self.credential_and_key().await?;
        debug!("computing request signature for {}", signer.service_host());
        signer.sign(&cred.key_id, &key)
    }
}
