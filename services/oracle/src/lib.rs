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

//! Request signer for the Oracle NoSQL Database Cloud Service.
//!
//! Data requests are signed with the OCI HTTP signature scheme. One signature covers every
//! request for a few minutes, so it is computed once, cached, and refreshed in the
//! background by [`Authorizer`].

mod constants;
pub use constants::{
    COMPARTMENT_ID_CLAIM_KEY, DEFAULT_REFRESH_AHEAD, MAX_ENTRY_LIFETIME, REQUEST_COMPARTMENT_ID,
    TENANT_ID_CLAIM_KEY,
};

mod config;
pub use config::Config;

mod credential;
pub use credential::{Credential, CredentialKind};

mod key;
pub use key::{parse_private_key, KeyMaterial};

mod sign_request;
pub use sign_request::{RequestSigner, SignatureEntry};

mod cache;
pub use cache::{ComputeSignature, SignatureCache};

mod authorizer;
pub use authorizer::Authorizer;

mod provide_credential;
pub use provide_credential::*;
