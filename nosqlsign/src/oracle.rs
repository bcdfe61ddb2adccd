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

//! Oracle NoSQL service support with convenience APIs
//!
//! This module re-exports the Oracle NoSQL signing types along with convenience
//! functions for common use cases.

pub use nosqlsign_oracle::*;

#[cfg(feature = "default-context")]
use crate::default_context;

/// Create an authorizer for the given NoSQL endpoint with standard configuration
///
/// This function creates an authorizer with:
/// - Default context (with Tokio file reader and OS environment)
/// - Default credential provider (reads from env vars, then `~/.oci/config`)
/// - Signatures cached for 300 seconds and refreshed 10 seconds ahead of expiry
///
/// Returns a config error if `service_url` has no host.
///
/// # Example
///
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> nosqlsign_core::Result<()> {
/// let authorizer =
///     nosqlsign::oracle::default_authorizer("https://nosql.us-phoenix-1.oci.oraclecloud.com")?;
///
/// let mut req = http::Request::builder()
///     .method("POST")
///     .uri("https://nosql.us-phoenix-1.oci.oraclecloud.com/V0/nosql/data")
///     .body(())
///     .unwrap()
///     .into_parts()
///     .0;
///
/// authorizer.sign(&mut req, Some("ocid1.compartment.oc1..example")).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Customization
///
/// Build the [`Authorizer`] directly to pick another credential provider:
///
/// ```no_run
/// # fn example() -> nosqlsign_core::Result<()> {
/// use nosqlsign::default_context;
/// use nosqlsign::oracle::{Authorizer, Config, ResourcePrincipalCredentialProvider};
///
/// let config = Config::default().with_service_url("https://nosql.us-phoenix-1.oci.oraclecloud.com")?;
/// let authorizer = Authorizer::new(
///     default_context(),
///     ResourcePrincipalCredentialProvider::new(),
///     config,
/// )?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn default_authorizer(service_url: &str) -> crate::Result<Authorizer> {
    let config = Config::default().with_service_url(service_url)?;
    Authorizer::new(default_context(), DefaultCredentialProvider::new(), config)
}

#[cfg(all(test, feature = "default-context"))]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_default_authorizer() {
        assert!(default_authorizer("https://nosql.us-phoenix-1.oci.oraclecloud.com").is_ok());

        let err = default_authorizer("/V0/nosql/data").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
