use std::thread;
use std::time::Duration;

use kernsel_device::{CompileFuture, Error as DeviceError};

use crate::error::Error;
use crate::test::helpers::{MockProgram, ready};
use crate::variant::{KernelLibrary, VariantHandle};

#[test]
fn test_ready_handle_resolves_to_itself() {
    let program = MockProgram::new("k0");
    let mut handle = ready(&program);

    assert!(!handle.is_pending());
    assert_eq!(handle.kernel_name(), "k0");
    assert_eq!(handle.resolve().unwrap().name(), "k0");
}

#[test]
fn test_pending_handle_becomes_ready() {
    let (promise, future) = CompileFuture::pending("k1");
    let mut handle = VariantHandle::from(future);
    assert!(handle.is_pending());
    assert_eq!(handle.kernel_name(), "k1");

    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        promise.fulfil(Ok(MockProgram::new("k1")));
    });

    assert_eq!(handle.resolve().unwrap().name(), "k1");
    assert!(!handle.is_pending());
    worker.join().unwrap();
}

#[test]
fn test_failed_compilation_stays_pending() {
    let (promise, future) = CompileFuture::pending("k2");
    promise.fulfil(Err(DeviceError::Compilation { kernel: "k2".into(), reason: "out of registers".into() }));
    let mut handle = VariantHandle::Pending(future);

    for _ in 0..2 {
        let err = handle.resolve().unwrap_err();
        assert!(matches!(err, Error::VariantCompilation { ref kernel, .. } if kernel == "k2"));
        assert!(handle.is_pending());
    }
}

#[test]
fn test_cloned_pending_handles_share_compilation() {
    let (promise, future) = CompileFuture::pending("k3");
    let mut first = VariantHandle::Pending(future);
    let mut second = first.clone();

    promise.fulfil(Ok(MockProgram::new("k3")));

    let (a, b) = (first.resolve().unwrap(), second.resolve().unwrap());
    assert!(std::sync::Arc::ptr_eq(&a, &b));
}

#[test]
fn test_library_indexes_by_kernel_name() {
    let mut library = KernelLibrary::new();
    assert!(library.is_empty());

    assert!(library.insert(ready(&MockProgram::new("k0"))).is_none());
    let (_promise, future) = CompileFuture::pending("k1");
    assert!(library.insert(future).is_none());

    assert_eq!(library.len(), 2);
    assert!(library.contains("k0"));
    assert!(library.get("k1").is_some_and(VariantHandle::is_pending));
    assert!(library.get("k2").is_none());

    let replaced = library.insert(ready(&MockProgram::new("k1")));
    assert!(replaced.is_some_and(|handle| handle.is_pending()));
    assert_eq!(library.len(), 2);
}
