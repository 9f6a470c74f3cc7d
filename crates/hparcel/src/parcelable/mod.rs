// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Polymorphic object protocol.
//!
//! A parcelable writes its type identifier, then its own payload. The
//! reader resolves a [`Creator`] for that identifier and hands the payload
//! back to it:
//!
//! ```text
//! parcelable        identifier:string16 (-1 = null) | payload
//! parcelable array  len:i32 | parcelable...
//! typed list        len:i32 | (present:i32, payload?)...
//! typed object      present:i32 | payload?
//! ```
//!
//! The typed forms carry no identifier: the caller already knows the type,
//! so the creator is resolved once for the whole list.

mod cache;
mod registry;

pub use cache::{CacheStats, CreatorCache};
pub use registry::{HashMapTypeRegistry, RegistryScope, ScopeId, TypeRegistry};

use crate::error::{Error, Result};
use crate::parcel::Parcel;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::ops::BitOr;
use std::sync::Arc;

/// Flags passed to [`Parcelable::write_to_parcel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WriteFlags(u32);

impl WriteFlags {
    pub const NONE: WriteFlags = WriteFlags(0);
    /// The object is being written as a call's return value.
    pub const PARCELABLE_WRITE_RETURN_VALUE: WriteFlags = WriteFlags(1);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: WriteFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for WriteFlags {
    type Output = WriteFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        WriteFlags(self.0 | rhs.0)
    }
}

/// A self-describing object.
///
/// `write_to_parcel` must produce exactly the bytes the matching creator
/// consumes.
pub trait Parcelable: fmt::Debug + Send + Sync {
    /// Globally unique name of the concrete type.
    fn type_identifier(&self) -> &str;

    fn write_to_parcel(&self, parcel: &mut Parcel, flags: WriteFlags) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    /// Same type identifier and same marshalled payload.
    fn content_eq(&self, other: &dyn Parcelable) -> bool {
        if self.type_identifier() != other.type_identifier() {
            return false;
        }
        let mut mine = Parcel::new();
        let mut theirs = Parcel::new();
        match (
            self.write_to_parcel(&mut mine, WriteFlags::NONE),
            other.write_to_parcel(&mut theirs, WriteFlags::NONE),
        ) {
            (Ok(()), Ok(())) => mine == theirs,
            _ => false,
        }
    }
}

/// Registry-facing factory for one parcelable type.
pub trait Creator: Send + Sync {
    /// Identifier of the type this creator builds.
    fn type_identifier(&self) -> &str;

    fn create_from_parcel(&self, parcel: &mut Parcel) -> Result<Arc<dyn Parcelable>>;

    /// Creators whose payload holds nested polymorphic fields expose the
    /// scope-aware entry point here.
    fn as_scoped(&self) -> Option<&dyn ScopedCreator> {
        None
    }
}

/// Creator that resolves nested polymorphic fields in the caller's scope.
pub trait ScopedCreator: Creator {
    fn create_from_parcel_scoped(
        &self,
        parcel: &mut Parcel,
        scope: &RegistryScope,
    ) -> Result<Arc<dyn Parcelable>>;
}

/// Static, typed counterpart of [`Creator`].
pub trait FromParcel: Sized {
    const TYPE_IDENTIFIER: &'static str;

    fn from_parcel(parcel: &mut Parcel) -> Result<Self>;
}

/// Adapts a [`FromParcel`] type into a registry [`Creator`].
pub struct TypedCreator<T>(PhantomData<fn() -> T>);

impl<T> TypedCreator<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for TypedCreator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypedCreator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedCreator")
            .field(&std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Creator for TypedCreator<T>
where
    T: FromParcel + Parcelable + 'static,
{
    fn type_identifier(&self) -> &str {
        T::TYPE_IDENTIFIER
    }

    fn create_from_parcel(&self, parcel: &mut Parcel) -> Result<Arc<dyn Parcelable>> {
        Ok(Arc::new(T::from_parcel(parcel)?))
    }
}

impl Parcel {
    /// Write `obj`'s type identifier, then let it write its payload.
    pub fn write_parcelable(&mut self, obj: Option<&dyn Parcelable>, flags: WriteFlags) -> Result<()> {
        let Some(obj) = obj else {
            return self.write_string(None);
        };
        self.write_string(Some(obj.type_identifier()))?;
        obj.write_to_parcel(self, flags)
    }

    pub fn read_parcelable(&mut self, scope: &RegistryScope) -> Result<Option<Arc<dyn Parcelable>>> {
        self.nested(|parcel| {
            let Some(identifier) = parcel.read_string()? else {
                return Ok(None);
            };
            let creator = scope.resolve(&identifier)?;
            parcel.create_with(creator.as_ref(), Some(scope)).map(Some)
        })
    }

    /// Read a parcelable whose type the caller knows statically.
    ///
    /// # Errors
    /// [`Error::BadPolymorphicType`] if the stored identifier names another
    /// type.
    pub fn read_typed_parcelable<T: FromParcel>(&mut self) -> Result<Option<T>> {
        self.nested(|parcel| {
            let Some(identifier) = parcel.read_string()? else {
                return Ok(None);
            };
            if identifier != T::TYPE_IDENTIFIER {
                return Err(Error::bad_type(
                    &identifier,
                    format!("expected '{}'", T::TYPE_IDENTIFIER),
                ));
            }
            T::from_parcel(parcel).map(Some)
        })
    }

    pub fn write_parcelable_array(
        &mut self,
        items: Option<&[Option<Arc<dyn Parcelable>>]>,
        flags: WriteFlags,
    ) -> Result<()> {
        let Some(items) = items else {
            return self.write_i32(crate::config::NULL_LENGTH);
        };
        self.write_len(items.len())?;
        for item in items {
            self.write_parcelable(item.as_deref(), flags)?;
        }
        Ok(())
    }

    pub fn read_parcelable_array(
        &mut self,
        scope: &RegistryScope,
    ) -> Result<Option<Vec<Option<Arc<dyn Parcelable>>>>> {
        let Some(count) = self.read_nullable_len(4)? else {
            return Ok(None);
        };
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.read_parcelable(scope)?);
        }
        Ok(Some(items))
    }

    /// Write a homogeneous list without per-element identifiers.
    pub fn write_typed_list<T: Parcelable>(&mut self, items: Option<&[Option<T>]>) -> Result<()> {
        let Some(items) = items else {
            return self.write_i32(crate::config::NULL_LENGTH);
        };
        self.write_len(items.len())?;
        for item in items {
            self.write_typed_object(item.as_ref(), WriteFlags::NONE)?;
        }
        Ok(())
    }

    pub fn read_typed_list<T: FromParcel>(&mut self) -> Result<Option<Vec<Option<T>>>> {
        let Some(count) = self.read_nullable_len(4)? else {
            return Ok(None);
        };
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.read_typed_object::<T>()?);
        }
        Ok(Some(items))
    }

    /// Read a typed list with a creator the caller already holds.
    pub fn read_typed_list_with(
        &mut self,
        creator: &dyn Creator,
    ) -> Result<Option<Vec<Option<Arc<dyn Parcelable>>>>> {
        self.read_typed_list_in(creator, None)
    }

    /// Resolve `identifier` once in `scope`, then read a typed list with it.
    pub fn read_typed_list_resolved(
        &mut self,
        scope: &RegistryScope,
        identifier: &str,
    ) -> Result<Option<Vec<Option<Arc<dyn Parcelable>>>>> {
        let creator = scope.resolve(identifier)?;
        self.read_typed_list_in(creator.as_ref(), Some(scope))
    }

    pub fn write_typed_object<T: Parcelable + ?Sized>(&mut self, obj: Option<&T>, flags: WriteFlags) -> Result<()> {
        match obj {
            Some(obj) => {
                self.write_i32(1)?;
                obj.write_to_parcel(self, flags)
            }
            None => self.write_i32(0),
        }
    }

    pub fn read_typed_object<T: FromParcel>(&mut self) -> Result<Option<T>> {
        if self.read_i32()? == 0 {
            return Ok(None);
        }
        self.nested(|parcel| T::from_parcel(parcel).map(Some))
    }

    fn read_typed_list_in(
        &mut self,
        creator: &dyn Creator,
        scope: Option<&RegistryScope>,
    ) -> Result<Option<Vec<Option<Arc<dyn Parcelable>>>>> {
        let Some(count) = self.read_nullable_len(4)? else {
            return Ok(None);
        };
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            if self.read_i32()? == 0 {
                items.push(None);
                continue;
            }
            let item = self.nested(|parcel| parcel.create_with(creator, scope))?;
            items.push(Some(item));
        }
        Ok(Some(items))
    }

    fn create_with(
        &mut self,
        creator: &dyn Creator,
        scope: Option<&RegistryScope>,
    ) -> Result<Arc<dyn Parcelable>> {
        match (creator.as_scoped(), scope) {
            (Some(scoped), Some(scope)) => scoped.create_from_parcel_scoped(self, scope),
            _ => creator.create_from_parcel(self),
        }
    }
}
