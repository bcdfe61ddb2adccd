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

//! Cached request signatures for the Oracle NoSQL Database Cloud Service.
//!
//! This crate bundles [`nosqlsign_core`] and the [`oracle`] signer, plus a ready to use
//! [`default_context`] when the `default-context` feature is enabled (it is by default).
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> nosqlsign::Result<()> {
//! let authorizer =
//!     nosqlsign::oracle::default_authorizer("https://nosql.us-ashburn-1.oci.oraclecloud.com")?;
//!
//! let headers = authorizer.authorize(Some("ocid1.compartment.oc1..example")).await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use nosqlsign_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;

pub mod oracle;
