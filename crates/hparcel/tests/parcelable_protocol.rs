// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::too_many_lines)] // Example/test code

//! Polymorphic objects, registry scopes and the status channel.

use hparcel::{
    Bundle, Creator, Error, FromParcel, HashMapTypeRegistry, Parcel, Parcelable, RegistryScope,
    ScopeId, StatusKind, TypeRegistry, Value, WriteFlags,
};
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

impl Parcelable for Point {
    fn type_identifier(&self) -> &str {
        Self::TYPE_IDENTIFIER
    }

    fn write_to_parcel(&self, parcel: &mut Parcel, _flags: WriteFlags) -> hparcel::Result<()> {
        parcel.write_i32(self.x)?;
        parcel.write_i32(self.y)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl FromParcel for Point {
    const TYPE_IDENTIFIER: &'static str = "test.Point";

    fn from_parcel(parcel: &mut Parcel) -> hparcel::Result<Self> {
        Ok(Point {
            x: parcel.read_i32()?,
            y: parcel.read_i32()?,
        })
    }
}

/// Counts how often the cache falls through to the registry.
struct CountingRegistry {
    inner: HashMapTypeRegistry,
    calls: AtomicUsize,
}

impl CountingRegistry {
    fn with_point() -> Arc<Self> {
        let mut inner = HashMapTypeRegistry::new();
        inner.register::<Point>();
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TypeRegistry for CountingRegistry {
    fn resolve(&self, identifier: &str, scope: &ScopeId) -> Option<Arc<dyn Creator>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(identifier, scope)
    }
}

fn points(n: i32) -> Vec<Option<Point>> {
    (0..n).map(|i| Some(Point { x: i, y: -i })).collect()
}

#[test]
fn test_typed_list_resolves_once() {
    let registry = CountingRegistry::with_point();
    let scope = RegistryScope::new(registry.clone());

    let mut written = points(16);
    written[5] = None;

    let mut parcel = Parcel::new();
    parcel
        .write_typed_list(Some(written.as_slice()))
        .expect("Write should succeed");
    parcel.set_position(0).expect("Rewind should succeed");

    let items = parcel
        .read_typed_list_resolved(&scope, Point::TYPE_IDENTIFIER)
        .expect("Read should succeed")
        .expect("List should not be null");
    assert_eq!(registry.calls(), 1);
    assert_eq!(parcel.available(), 0);

    let back: Vec<Option<Point>> = items
        .iter()
        .map(|item| {
            item.as_ref().map(|p| {
                p.as_any()
                    .downcast_ref::<Point>()
                    .expect("Element should be a Point")
                    .clone()
            })
        })
        .collect();
    assert_eq!(back, written);
}

#[test]
fn test_typed_list_static_path() {
    let written = points(4);
    let mut parcel = Parcel::new();
    parcel
        .write_typed_list(Some(written.as_slice()))
        .expect("Write should succeed");
    parcel.write_typed_list::<Point>(None).expect("Write should succeed");
    parcel.set_position(0).expect("Rewind should succeed");

    assert_eq!(
        parcel.read_typed_list::<Point>().expect("Read should succeed"),
        Some(written)
    );
    assert_eq!(parcel.read_typed_list::<Point>().expect("Read should succeed"), None);
}

#[test]
fn test_parcelable_inside_list_value() {
    let registry = CountingRegistry::with_point();
    let scope = RegistryScope::new(registry.clone());

    let list: Vec<Value> = (0..8)
        .map(|i| Value::Parcelable(Arc::new(Point { x: i, y: i * i })))
        .collect();
    let mut parcel = Parcel::new();
    parcel.write_list(Some(&list[..])).expect("Write should succeed");
    parcel.set_position(0).expect("Rewind should succeed");

    let back = parcel
        .read_list(&scope)
        .expect("Read should succeed")
        .expect("List should not be null");
    assert_eq!(back, list);
    assert_eq!(back[3].downcast_parcelable::<Point>(), Some(&Point { x: 3, y: 9 }));

    // Eight lookups, one registry query.
    assert_eq!(registry.calls(), 1);
    let stats = scope.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 7);
}

#[test]
fn test_cache_is_per_scope() {
    let registry = CountingRegistry::with_point();
    let scope = RegistryScope::new(registry.clone());

    let mut parcel = Parcel::new();
    let point = Point { x: 1, y: 2 };
    for _ in 0..3 {
        parcel
            .write_parcelable(Some(&point), WriteFlags::NONE)
            .expect("Write should succeed");
    }
    parcel.set_position(0).expect("Rewind should succeed");

    parcel.read_parcelable(&scope).expect("Read should succeed");
    assert_eq!(scope.cache_stats().misses, 1);
    parcel.read_parcelable(&scope).expect("Read should succeed");
    assert_eq!(scope.cache_stats().hits, 1);
    assert_eq!(registry.calls(), 1);

    let child = scope.child();
    let back = parcel
        .read_parcelable(&child)
        .expect("Read should succeed")
        .expect("Object should not be null");
    assert_eq!(back.as_any().downcast_ref::<Point>(), Some(&point));
    assert_eq!(registry.calls(), 2, "a child scope resolves afresh");
    assert_eq!(child.cache_stats().entries, 2, "both scopes share one cache");

    scope.cache().evict_scope(scope.id());
    assert_eq!(scope.cache().len(), 1);
}

#[test]
fn test_concurrent_decodes_share_a_scope() {
    let registry = CountingRegistry::with_point();
    let scope = RegistryScope::new(registry.clone());

    let mut parcel = Parcel::new();
    parcel
        .write_parcelable(Some(&Point { x: 7, y: 8 }), WriteFlags::NONE)
        .expect("Write should succeed");
    let bytes = parcel.marshall().expect("Marshall should succeed");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let scope = scope.clone();
            let bytes = bytes.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    let mut parcel = Parcel::from_bytes(&bytes);
                    let back = parcel
                        .read_parcelable(&scope)
                        .expect("Read should succeed")
                        .expect("Object should not be null");
                    assert_eq!(back.type_identifier(), Point::TYPE_IDENTIFIER);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread should not panic");
    }

    let stats = scope.cache_stats();
    assert_eq!(stats.hits + stats.misses, 200);
    assert_eq!(stats.entries, 1);
    assert!(registry.calls() <= 8, "at most one resolution per racing thread");
}

#[test]
fn test_nested_parcelables_resolve_in_caller_scope() {
    let registry = CountingRegistry::with_point();
    let scope = RegistryScope::new(registry.clone());

    let mut inner = Bundle::new();
    inner.insert("origin", Value::Parcelable(Arc::new(Point { x: 0, y: 0 })));
    let mut outer = Bundle::new();
    outer.insert("inner", inner);

    let mut parcel = Parcel::new();
    parcel
        .write_parcelable(Some(&outer), WriteFlags::NONE)
        .expect("Write should succeed");
    parcel.set_position(0).expect("Rewind should succeed");

    let back = parcel
        .read_parcelable(&scope)
        .expect("Read should succeed")
        .expect("Object should not be null");
    let bundle = back
        .as_any()
        .downcast_ref::<Bundle>()
        .expect("Object should be a Bundle");
    assert_eq!(bundle, &outer);
    assert_eq!(registry.calls(), 2, "bundle and point resolved in the same scope");
}

#[test]
fn test_typed_parcelable_rejects_other_types() {
    let mut parcel = Parcel::new();
    parcel
        .write_parcelable(Some(&Bundle::new()), WriteFlags::NONE)
        .expect("Write should succeed");
    parcel.set_position(0).expect("Rewind should succeed");

    match parcel.read_typed_parcelable::<Point>() {
        Err(Error::BadPolymorphicType { identifier, .. }) => {
            assert_eq!(identifier, Bundle::TYPE_IDENTIFIER);
        }
        other => panic!("expected a bad type, got {:?}", other),
    }
}

// ============================================================================
// Call / reply
// ============================================================================

const DESCRIPTOR: &str = "test.IGeometry";

/// Server side of `translate(point, dx)`: echo the moved point, reject
/// negative offsets.
fn serve(request: &mut Parcel) -> hparcel::Result<Parcel> {
    let mut reply = Parcel::new();
    request.enforce_interface(DESCRIPTOR)?;
    let point = request.read_typed_object::<Point>()?;
    let dx = request.read_i32()?;

    match point {
        Some(point) if dx >= 0 => {
            reply.write_status_ok()?;
            reply.write_typed_object(
                Some(&Point {
                    x: point.x + dx,
                    y: point.y,
                }),
                WriteFlags::PARCELABLE_WRITE_RETURN_VALUE,
            )?;
        }
        Some(_) => reply.write_status(StatusKind::IllegalArgument, Some("bad input"))?,
        None => reply.write_status(StatusKind::NullPointer, None)?,
    }
    Ok(reply)
}

fn call(point: Option<&Point>, dx: i32) -> hparcel::Result<Option<Point>> {
    let mut request = Parcel::new();
    request.write_interface_token(DESCRIPTOR)?;
    request.write_typed_object(point, WriteFlags::NONE)?;
    request.write_i32(dx)?;
    request.set_position(0)?;

    let mut reply = serve(&mut request)?;
    reply.set_position(0)?;
    reply.read_status()?;
    reply.read_typed_object::<Point>()
}

#[test]
fn test_call_reply_success() {
    let moved = call(Some(&Point { x: 1, y: 5 }), 10).expect("Call should succeed");
    assert_eq!(moved, Some(Point { x: 11, y: 5 }));
}

#[test]
fn test_call_reply_illegal_argument() {
    match call(Some(&Point { x: 1, y: 5 }), -1) {
        Err(Error::Remote(e)) => {
            assert_eq!(e.kind(), StatusKind::IllegalArgument);
            assert_eq!(e.message(), Some("bad input"));
        }
        other => panic!("expected a remote exception, got {:?}", other),
    }
    match call(None, 1) {
        Err(Error::Remote(e)) => assert_eq!(e.kind(), StatusKind::NullPointer),
        other => panic!("expected a remote exception, got {:?}", other),
    }
}

#[test]
fn test_wrong_interface_is_refused() {
    let mut request = Parcel::new();
    request
        .write_interface_token("test.IOther")
        .expect("Write should succeed");
    request.set_position(0).expect("Rewind should succeed");

    match serve(&mut request) {
        Err(Error::InterfaceMismatch { expected, actual }) => {
            assert_eq!(expected, DESCRIPTOR);
            assert_eq!(actual, "test.IOther");
        }
        other => panic!("expected an interface mismatch, got {:?}", other.map(|_| ())),
    }
}
