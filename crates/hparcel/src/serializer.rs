// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic object serializer, the last resort of value classification.
//!
//! Objects outside the registry's purview travel as a type name plus an
//! opaque blob (the SERIALIZABLE tag). The blob format belongs to the
//! [`ObjectSerializer`]; the parcel never looks inside it.

use crate::error::Result;
use crate::parcelable::RegistryScope;
use std::any::Any;

/// Payload of a SERIALIZABLE value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerializedObject {
    pub type_name: String,
    pub data: Vec<u8>,
}

impl SerializedObject {
    pub fn new(type_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            type_name: type_name.into(),
            data,
        }
    }
}

/// Turns otherwise unsupported objects into [`SerializedObject`]s and back.
pub trait ObjectSerializer: Send + Sync {
    /// `None` when this serializer does not handle `value`'s type.
    fn serialize(&self, value: &dyn Any) -> Option<Result<SerializedObject>>;

    fn deserialize(&self, obj: &SerializedObject, scope: &RegistryScope) -> Result<Box<dyn Any + Send>>;
}

#[cfg(feature = "serde")]
pub use json::JsonObjectSerializer;

#[cfg(feature = "serde")]
mod json {
    use super::{ObjectSerializer, SerializedObject};
    use crate::error::{Error, Result};
    use crate::parcelable::RegistryScope;
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use std::any::{Any, TypeId};
    use std::collections::HashMap;

    type SerializeFn = fn(&dyn Any) -> Option<serde_json::Result<Vec<u8>>>;
    type DeserializeFn = fn(&[u8]) -> serde_json::Result<Box<dyn Any + Send>>;

    struct Entry {
        type_name: String,
        serialize: SerializeFn,
    }

    /// JSON-backed [`ObjectSerializer`] for explicitly registered types.
    ///
    /// # Example
    ///
    /// ```
    /// use hparcel::{JsonObjectSerializer, ObjectSerializer, RegistryScope};
    ///
    /// #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
    /// struct Reading { celsius: f64 }
    ///
    /// let mut json = JsonObjectSerializer::new();
    /// json.register::<Reading>("demo.Reading");
    ///
    /// let obj = json
    ///     .serialize(&Reading { celsius: 21.5 })
    ///     .expect("Reading is registered")
    ///     .expect("Serialize should succeed");
    /// let back = json
    ///     .deserialize(&obj, &RegistryScope::default())
    ///     .expect("Deserialize should succeed");
    /// assert_eq!(back.downcast_ref::<Reading>(), Some(&Reading { celsius: 21.5 }));
    /// ```
    #[derive(Default)]
    pub struct JsonObjectSerializer {
        by_type: HashMap<TypeId, Entry>,
        by_name: HashMap<String, DeserializeFn>,
    }

    impl std::fmt::Debug for JsonObjectSerializer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let mut names: Vec<_> = self.by_name.keys().collect();
            names.sort();
            f.debug_struct("JsonObjectSerializer")
                .field("types", &names)
                .finish()
        }
    }

    impl JsonObjectSerializer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Handle `T` under `type_name`.
        pub fn register<T>(&mut self, type_name: &str)
        where
            T: Serialize + DeserializeOwned + Send + 'static,
        {
            fn serialize<T: Serialize + 'static>(value: &dyn Any) -> Option<serde_json::Result<Vec<u8>>> {
                value.downcast_ref::<T>().map(serde_json::to_vec)
            }

            fn deserialize<T: DeserializeOwned + Send + 'static>(
                data: &[u8],
            ) -> serde_json::Result<Box<dyn Any + Send>> {
                let value: T = serde_json::from_slice(data)?;
                Ok(Box::new(value))
            }

            log::debug!("[serializer] register '{}'", type_name);
            self.by_type.insert(
                TypeId::of::<T>(),
                Entry {
                    type_name: type_name.to_string(),
                    serialize: serialize::<T>,
                },
            );
            self.by_name
                .insert(type_name.to_string(), deserialize::<T>);
        }
    }

    impl ObjectSerializer for JsonObjectSerializer {
        fn serialize(&self, value: &dyn Any) -> Option<Result<SerializedObject>> {
            let entry = self.by_type.get(&value.type_id())?;
            let result = (entry.serialize)(value)?;
            Some(
                result
                    .map(|data| SerializedObject::new(entry.type_name.clone(), data))
                    .map_err(|e| Error::Serializer(e.to_string())),
            )
        }

        fn deserialize(&self, obj: &SerializedObject, _scope: &RegistryScope) -> Result<Box<dyn Any + Send>> {
            let deserialize = self.by_name.get(&obj.type_name).ok_or_else(|| {
                Error::Serializer(format!("no deserializer for '{}'", obj.type_name))
            })?;
            deserialize(&obj.data).map_err(|e| Error::Serializer(e.to_string()))
        }
    }
}
