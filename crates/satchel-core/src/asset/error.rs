// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

/// Why a typed lookup into the registry did not produce an asset.
///
/// The first three variants are the causes a caller must be able to tell
/// apart. `TypeMismatch` only occurs if an entry was stored under a type tag
/// that does not match its payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No asset of the requested type has ever been registered.
    #[error("Could not find any assets of type \"{type_name}\"")]
    TypeNotRegistered {
        /// The requested type.
        type_name: &'static str,
    },
    /// The type is registered, but not under this name.
    #[error("Assets of type \"{type_name}\" do not contain \"{name}\"")]
    NameNotFound {
        /// The requested name.
        name: String,
        /// The requested type.
        type_name: &'static str,
    },
    /// The key is reserved, but its value is still null.
    #[error("Asset \"{name}\" of type \"{type_name}\" is registered but unpopulated")]
    Unpopulated {
        /// The requested name.
        name: String,
        /// The requested type.
        type_name: &'static str,
    },
    /// The stored payload is not of the requested concrete type.
    #[error("Asset \"{name}\" is stored as \"{type_name}\" but holds another type")]
    TypeMismatch {
        /// The requested name.
        name: String,
        /// The requested type.
        type_name: &'static str,
    },
}
