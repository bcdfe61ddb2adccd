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

//! Sign a NoSQL data request with the credentials found in the environment or `~/.oci/config`.
//!
//! ```shell
//! RUST_LOG=debug cargo run --example authorize_request -- https://nosql.us-ashburn-1.oci.oraclecloud.com ocid1.compartment.oc1..example
//! ```

use log::info;
use nosqlsign_core::{Context, OsEnv};
use nosqlsign_file_read_tokio::TokioFileRead;
use nosqlsign_oracle::{Authorizer, Config, DefaultCredentialProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let endpoint = args
        .next()
        .unwrap_or_else(|| "https://nosql.us-ashburn-1.oci.oraclecloud.com".to_string());
    let compartment = args.next();

    let ctx = Context::new().with_file_read(TokioFileRead).with_env(OsEnv);
    let config = Config::default().with_service_url(&endpoint)?;
    let authorizer = Authorizer::new(ctx, DefaultCredentialProvider::new(), config)?;

    let (mut parts, _body) = http::Request::post(format!("{endpoint}/V0/nosql/data"))
        .body(())?
        .into_parts();
    authorizer.sign(&mut parts, compartment.as_deref()).await?;

    info!("request signed for region {:?}", authorizer.region());
    for (name, value) in &parts.headers {
        println!("{name}: {}", value.to_str()?);
    }

    authorizer.close();
    Ok(())
}
