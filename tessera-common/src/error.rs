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

//! Error types for the Tessera query engine.

use thiserror::Error;

/// Result type for operations that could result in a [TesseraError].
pub type Result<T> = std::result::Result<T, TesseraError>;

/// Error type for all failures surfaced by the engine.
#[derive(Debug, Error)]
pub enum TesseraError {
    /// Error returned when the query plan is malformed or an operation is
    /// attempted on inputs it does not support.
    #[error("Plan error: {0}")]
    Plan(String),
    /// Error returned on a branch that we know it is possible only to reach
    /// because of a bug in our code. Carries the message of the failed
    /// internal invariant.
    #[error("Internal error: {0}. This was likely caused by a bug in Tessera's code and we would welcome that you file an bug report in our issue tracker")]
    Internal(String),
    /// Error returned when a feature is not yet implemented.
    #[error("This feature is not implemented: {0}")]
    NotImplemented(String),
}
