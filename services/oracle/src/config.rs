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

use crate::constants::{DEFAULT_REFRESH_AHEAD, MAX_ENTRY_LIFETIME};
use nosqlsign_core::{Error, Result};
use std::time::Duration;

/// Config for signing requests to the Oracle NoSQL data endpoint.
#[derive(Debug, Clone)]
pub struct Config {
    /// How long one signature is reused, at most 300 seconds.
    pub max_lifetime: Duration,
    /// How long before expiry the cached signature is replaced in the background.
    ///
    /// Set it to `max_lifetime` or more to disable background refresh.
    pub refresh_lead_time: Duration,
    /// Host of the NoSQL service, like `nosql.us-ashburn-1.oci.oraclecloud.com`.
    pub service_host: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_lifetime: MAX_ENTRY_LIFETIME,
            refresh_lead_time: DEFAULT_REFRESH_AHEAD,
            service_host: None,
        }
    }
}

impl Config {
    /// Set the maximum lifetime of a cached signature.
    pub fn with_max_lifetime(mut self, max_lifetime: Duration) -> Self {
        self.max_lifetime = max_lifetime;
        self
    }

    /// Set the refresh lead time.
    pub fn with_refresh_lead_time(mut self, refresh_lead_time: Duration) -> Self {
        self.refresh_lead_time = refresh_lead_time;
        self
    }

    /// Set the service host.
    pub fn with_service_host(mut self, host: impl Into<String>) -> Self {
        self.service_host = Some(host.into());
        self
    }

    /// Take the service host from an endpoint url.
    ///
    /// `https://nosql.us-ashburn-1.oci.oraclecloud.com` gives `nosql.us-ashburn-1.oci.oraclecloud.com`.
    ///
    /// The port is never part of the signed host, so `http://localhost:8080` gives `localhost`.
    /// Use [`Config::with_service_host`] to sign a different host value.
    pub fn with_service_url(mut self, url: &str) -> Result<Self> {
        let uri: http::Uri = url.parse()?;
        let host = uri
            .host()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| Error::config_invalid(format!("service url {url} has no host")))?;

        self.service_host = Some(host.to_lowercase());
        Ok(self)
    }

    /// Check the config, returning a config error if it cannot be used.
    pub fn validate(&self) -> Result<()> {
        if self.max_lifetime > MAX_ENTRY_LIFETIME {
            return Err(Error::config_invalid(format!(
                "max_lifetime {:?} exceeds the limit of {:?}",
                self.max_lifetime, MAX_ENTRY_LIFETIME
            )));
        }
        if let Some(host) = &self.service_host {
            if host.is_empty() {
                return Err(Error::config_invalid("service_host must not be empty"));
            }
        }
        Ok(())
    }
}
