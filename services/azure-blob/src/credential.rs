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

use blobstore_core::utils::Redact;
use blobstore_core::{Error, Result};
use std::fmt::{Debug, Formatter};

/// Shared Key credential: the storage account name and its Base64 account key.
///
/// A credential is validated once when it's created and never changes
/// afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    account_name: String,
    account_key: String,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("account_name", &Redact::from(&self.account_name))
            .field("account_key", &Redact::from(&self.account_key))
            .finish()
    }
}

impl Credential {
    /// Create a new shared key credential.
    ///
    /// Both values must be non-empty. Whether the key is valid Base64 is
    /// only known when the first request gets signed.
    pub fn new(account_name: impl Into<String>, account_key: impl Into<String>) -> Result<Self> {
        let account_name = account_name.into();
        let account_key = account_key.into();

        if account_name.trim().is_empty() {
            return Err(Error::credential_invalid("account name must not be empty"));
        }
        if account_key.trim().is_empty() {
            return Err(Error::credential_invalid("account key must not be empty")
                .with_context("account", account_name));
        }

        Ok(Self {
            account_name,
            account_key,
        })
    }

    /// Azure storage account name.
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Base64 encoded account key.
    pub fn account_key(&self) -> &str {
        &self.account_key
    }
}
