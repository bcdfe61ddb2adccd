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
use log::debug;
use nosqlsign_core::hash::base64_encode;
use nosqlsign_core::time::{format_http_date, now, DateTime};
use nosqlsign_core::{Error, Result};
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::Sha256;
use std::fmt::Write;

/// SignatureEntry is one computed signature together with the date it covers.
///
/// Requests reuse both values verbatim while the entry is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEntry {
    header_value: String,
    date: String,
}

impl SignatureEntry {
    /// Create a new entry.
    pub fn new(header_value: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            header_value: header_value.into(),
            date: date.into(),
        }
    }

    /// Value of the `authorization` header.
    pub fn header_value(&self) -> &str {
        &self.header_value
    }

    /// Value of the `date` header, in IMF-fixdate format.
    pub fn date(&self) -> &str {
        &self.date
    }
}

/// RequestSigner computes the request signature for the NoSQL data endpoint.
///
/// - [Oracle Cloud Infrastructure API Signing](https://docs.oracle.com/en-us/iaas/Content/API/Concepts/signingrequests.htm)
///
/// Every data request is a `POST` to the same path on the same host, so the signature
/// only depends on the date and can be shared by all requests for a few minutes.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service_host: String,
}

impl RequestSigner {
    /// Create a new signer for a service host like `nosql.us-phoenix-1.oci.oraclecloud.com`.
    pub fn new(service_host: impl Into<String>) -> Self {
        Self {
            service_host: service_host.into(),
        }
    }

    /// The host covered by the signatures.
    pub fn service_host(&self) -> &str {
        &self.service_host
    }

    /// Build the string to sign for the given date.
    pub fn signing_content(&self, date: &str) -> String {
        let mut s = String::with_capacity(96 + self.service_host.len());
        s.push_str(REQUEST_TARGET);
        s.push_str(HEADER_DELIMITER);
        s.push_str("post /");
        s.push_str(NOSQL_DATA_PATH);
        s.push('\n');
        s.push_str("host");
        s.push_str(HEADER_DELIMITER);
        s.push_str(&self.service_host);
        s.push('\n');
        s.push_str("date");
        s.push_str(HEADER_DELIMITER);
        s.push_str(date);
        s
    }

    /// Sign with the current time.
    pub fn sign(&self, key_id: &str, private_key: &RsaPrivateKey) -> Result<SignatureEntry> {
        self.sign_at(key_id, private_key, now())
    }

    /// Sign as of `time`.
    pub fn sign_at(
        &self,
        key_id: &str,
        private_key: &RsaPrivateKey,
        time: DateTime,
    ) -> Result<SignatureEntry> {
        let date = format_http_date(time);
        let string_to_sign = self.signing_content(&date);
        debug!("string to sign: {}", &string_to_sign);

        let signing_key = SigningKey::<Sha256>::new(private_key.clone());
        let signature = signing_key
            .try_sign(string_to_sign.as_bytes())
            .map_err(|e| Error::signing_failed(format!("failed to sign request: {e}")))?;
        let encoded_signature = base64_encode(&signature.to_bytes());

        let mut auth_value = String::new();
        write!(auth_value, "Signature headers=\"{SIGNING_HEADERS}\",")?;
        write!(auth_value, "keyId=\"{key_id}\",")?;
        write!(auth_value, "algorithm=\"{SIGNATURE_ALGORITHM}\",")?;
        write!(auth_value, "signature=\"{encoded_signature}\",")?;
        write!(auth_value, "version=\"{SIGNATURE_VERSION}\"")?;

        Ok(SignatureEntry::new(auth_value, date))
    }
}
