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

use std::time::Duration;

/// Default config path for oracle services.
pub const ORACLE_CONFIG_PATH: &str = "~/.oci/config";
/// Default profile name
pub const ORACLE_DEFAULT_PROFILE: &str = "DEFAULT";

// Environment variables for user principal credentials.
pub const ORACLE_USER: &str = "OCI_USER";
pub const ORACLE_TENANCY: &str = "OCI_TENANCY";
pub const ORACLE_REGION: &str = "OCI_REGION";
pub const ORACLE_KEY_FILE: &str = "OCI_KEY_FILE";
pub const ORACLE_FINGERPRINT: &str = "OCI_FINGERPRINT";
pub const ORACLE_PASS_PHRASE: &str = "OCI_PASS_PHRASE";
pub const ORACLE_CONFIG_FILE: &str = "OCI_CONFIG_FILE";
pub const ORACLE_PROFILE: &str = "OCI_PROFILE";

// Environment variables for resource principal credentials.
pub const RP_VERSION: &str = "OCI_RESOURCE_PRINCIPAL_VERSION";
pub const RP_RPST: &str = "OCI_RESOURCE_PRINCIPAL_RPST";
pub const RP_PRIVATE_PEM: &str = "OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM";
pub const RP_PRIVATE_PEM_PASSPHRASE: &str = "OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM_PASSPHRASE";
pub const RP_REGION: &str = "OCI_RESOURCE_PRINCIPAL_REGION";
/// The only resource principal version read from the environment.
pub const RP_VERSION_2_2: &str = "2.2";

/// Claim in the resource principal session token holding the resource compartment.
pub const COMPARTMENT_ID_CLAIM_KEY: &str = "res_compartment";
/// Claim in the resource principal session token holding the resource tenancy.
pub const TENANT_ID_CLAIM_KEY: &str = "res_tenant";

/// Key id prefix for session token based principals.
pub const SECURITY_TOKEN_KEY_ID_PREFIX: &str = "ST$";

/// Path that every data request is posted to.
pub const NOSQL_DATA_PATH: &str = "V0/nosql/data";
/// Header carrying the compartment of the request.
pub const REQUEST_COMPARTMENT_ID: &str = "x-nosql-compartment-id";

pub const SIGNING_HEADERS: &str = "(request-target) host date";
pub const REQUEST_TARGET: &str = "(request-target)";
pub const HEADER_DELIMITER: &str = ": ";
pub const SIGNATURE_ALGORITHM: &str = "rsa-sha256";
pub const SIGNATURE_VERSION: &str = "1";

/// Hard upper bound on how long one signature may be cached.
pub const MAX_ENTRY_LIFETIME: Duration = Duration::from_secs(300);
/// How long before expiry a cached signature is replaced.
pub const DEFAULT_REFRESH_AHEAD: Duration = Duration::from_secs(10);
