use crate::error::Error;
use crate::registry::{DispatcherRegistry, dispatcher_name};
use crate::types::{KernelSignature, RangePrefix, SubKernelCall};
use crate::wrapper::WrapperBuffer;

fn reduction_kernel(name: &str, args: &[&str], inside_reduction: bool) -> KernelSignature {
    args.iter()
        .fold(KernelSignature::new(name), |k, a| k.arg(*a, format!("{a}_val")))
        .range(RangePrefix::X, "s0")
        .range(RangePrefix::R, "1024")
        .with_inside_reduction(inside_reduction)
}

fn pair(first: &str, second: &str) -> Vec<KernelSignature> {
    vec![
        reduction_kernel(first, &["in_ptr0", "out_ptr0"], true),
        reduction_kernel(second, &["in_ptr0", "out_ptr0"], true),
    ]
}

#[test]
fn test_same_tuple_reuses_dispatcher() {
    let mut registry = DispatcherRegistry::new();
    let mut wrapper = WrapperBuffer::new();

    let first = registry.define_kernel(&pair("k1", "k2"), &mut wrapper).unwrap();
    let second = registry.define_kernel(&pair("k1", "k2"), &mut wrapper).unwrap();

    assert_eq!(first, "multi_kernel_k1");
    assert_eq!(first, second);
    assert_eq!(registry.len(), 1);
    assert_eq!(wrapper.dispatchers().len(), 1);
    assert_eq!(wrapper.header().matches("dispatcher multi_kernel_k1").count(), 1);
}

#[test]
fn test_reversed_tuple_is_a_distinct_group() {
    let mut registry = DispatcherRegistry::new();
    let mut wrapper = WrapperBuffer::new();

    let forward = registry.define_kernel(&pair("k1", "k2"), &mut wrapper).unwrap();
    let reversed = registry.define_kernel(&pair("k2", "k1"), &mut wrapper).unwrap();

    assert_eq!(forward, "multi_kernel_k1");
    assert_eq!(reversed, "multi_kernel_k2");
    assert_eq!(registry.len(), 2);
    assert_eq!(wrapper.dispatchers().len(), 2);
}

#[test]
fn test_name_collision_is_rejected() {
    let mut registry = DispatcherRegistry::new();
    let mut wrapper = WrapperBuffer::new();

    registry.define_kernel(&pair("k1", "k2"), &mut wrapper).unwrap();
    let err = registry.define_kernel(&pair("k1", "k3"), &mut wrapper).unwrap_err();

    match err {
        Error::DuplicateDispatcherName { name, kernels } => {
            assert_eq!(name, "multi_kernel_k1");
            assert_eq!(kernels, vec!["k1".to_string(), "k3".to_string()]);
        }
        other => panic!("expected DuplicateDispatcherName, got {other:?}"),
    }
    assert_eq!(registry.len(), 1);
    assert_eq!(wrapper.dispatchers().len(), 1);
}

#[test]
fn test_group_size_is_checked() {
    let mut registry = DispatcherRegistry::new();
    let mut wrapper = WrapperBuffer::new();

    let single = vec![reduction_kernel("k1", &["in_ptr0"], true)];
    assert!(matches!(registry.define_kernel(&single, &mut wrapper), Err(Error::InvalidGroupSize { count: 1 })));

    let empty: Vec<KernelSignature> = Vec::new();
    assert!(matches!(registry.define_kernel(&empty, &mut wrapper), Err(Error::InvalidGroupSize { count: 0 })));
    assert!(registry.is_empty());
}

#[test]
fn test_definition_binds_each_variant() {
    let mut registry = DispatcherRegistry::new();
    let mut wrapper = WrapperBuffer::new();

    let kernels = vec![
        reduction_kernel("k1", &["in_ptr0", "in_ptr1", "out_ptr0"], true),
        reduction_kernel("k2", &["in_ptr0", "out_ptr0", "ws_ptr0"], true),
    ];
    registry.define_kernel(&kernels, &mut wrapper).unwrap();

    let def = &wrapper.dispatchers()[0];
    assert_eq!(def.name, "multi_kernel_k1");
    assert_eq!(def.arg_names, vec!["in_ptr0", "in_ptr1", "out_ptr0", "ws_ptr0"]);
    assert_eq!(def.numel_names, vec!["xnumel", "rnumel"]);
    assert_eq!(def.arity(), 6);
    assert!(def.is_well_formed());
    assert_eq!(
        def.calls,
        vec![
            SubKernelCall { kernel_name: "k1".into(), arg_indices: vec![0, 1, 2], numel_indices: vec![0, 1] },
            SubKernelCall { kernel_name: "k2".into(), arg_indices: vec![0, 2, 3], numel_indices: vec![0, 1] },
        ]
    );

    let expected = "\
dispatcher multi_kernel_k1 [k1, k2]
  signature (in_ptr0, in_ptr1, out_ptr0, ws_ptr0 | xnumel, rnumel | grid, stream)
  call0 k1(in_ptr0, in_ptr1, out_ptr0 | xnumel, rnumel | grid, stream)
  call1 k2(in_ptr0, out_ptr0, ws_ptr0 | xnumel, rnumel | grid, stream)
";
    assert_eq!(wrapper.header(), expected);
}

#[test]
fn test_looped_variant_skips_reduction_size() {
    let mut registry = DispatcherRegistry::new();
    let mut wrapper = WrapperBuffer::new();

    let kernels = vec![
        reduction_kernel("persistent", &["in_ptr0", "out_ptr0"], true),
        reduction_kernel("looped", &["in_ptr0", "out_ptr0"], false),
    ];
    registry.define_kernel(&kernels, &mut wrapper).unwrap();

    let def = &wrapper.dispatchers()[0];
    assert_eq!(def.calls[0].numel_indices, vec![0, 1]);
    assert_eq!(def.calls[1].numel_indices, vec![0]);
}

#[test]
fn test_numel_mismatch_leaves_registry_untouched() {
    let mut registry = DispatcherRegistry::new();
    let mut wrapper = WrapperBuffer::new();

    let kernels = vec![
        KernelSignature::new("k1").arg("in_ptr0", "buf0").range(RangePrefix::X, "s0"),
        KernelSignature::new("k2").arg("in_ptr0", "buf0").range(RangePrefix::X, "s0").range(RangePrefix::Y, "s1"),
    ];

    match registry.define_kernel(&kernels, &mut wrapper) {
        Err(Error::NumelMismatch { kernel, numel, first }) => {
            assert_eq!(kernel, "k2");
            assert_eq!(numel, "ynumel");
            assert_eq!(first, "k1");
        }
        other => panic!("expected NumelMismatch, got {other:?}"),
    }
    assert!(registry.is_empty());
    assert!(!registry.is_used("multi_kernel_k1"));
    assert!(wrapper.dispatchers().is_empty());
}

#[test]
fn test_lookup_by_variant_names() {
    let mut registry = DispatcherRegistry::new();
    let mut wrapper = WrapperBuffer::new();
    registry.define_kernel(&pair("k1", "k2"), &mut wrapper).unwrap();

    assert_eq!(registry.lookup(&["k1".to_string(), "k2".to_string()]), Some("multi_kernel_k1"));
    assert_eq!(registry.lookup(&["k2".to_string(), "k1".to_string()]), None);
    assert!(registry.is_used(&dispatcher_name("k1")));
}
