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

use nosqlsign_core::{Context, OsEnv};
use nosqlsign_file_read_tokio::TokioFileRead;

/// Create a context that reads files with tokio and takes the environment of the process.
pub fn default_context() -> Context {
    Context::new().with_file_read(TokioFileRead).with_env(OsEnv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_context_reads_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config");
        std::fs::write(&path, "[DEFAULT]\n")?;

        let ctx = default_context();
        let content = ctx.file_read_as_string(path.to_str().unwrap()).await?;
        assert_eq!(content, "[DEFAULT]\n");
        assert!(ctx.file_read("/definitely/not/here").await.is_err());
        Ok(())
    }
}
