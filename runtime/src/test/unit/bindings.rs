use spindle_device::DescriptorType;
use spindle_dtype::StorageClass;
use test_case::test_case;

use crate::{BindingKey, Error, ResourceBindings};

#[test_case(StorageClass::StorageBuffer, DescriptorType::StorageBuffer ; "storage buffer")]
#[test_case(StorageClass::Uniform, DescriptorType::UniformBuffer ; "uniform")]
fn buffer_storage_classes_map_to_descriptors(class: StorageClass, expected: DescriptorType) {
    let key = BindingKey::new(0, 0);
    let mut data = [0u8; 4];
    let mut bindings = ResourceBindings::new();
    bindings.insert_data(key, &mut data).set_storage_class(key, class);
    assert_eq!(bindings.descriptor_type(key).unwrap(), expected);
}

#[test_case(StorageClass::Workgroup ; "workgroup")]
#[test_case(StorageClass::PushConstant ; "push constant")]
#[test_case(StorageClass::Private ; "private")]
fn other_storage_classes_are_rejected(class: StorageClass) {
    let key = BindingKey::new(1, 4);
    let mut data = [0u8; 4];
    let mut bindings = ResourceBindings::new();
    bindings.insert_data(key, &mut data).set_storage_class(key, class);
    assert!(matches!(bindings.descriptor_type(key), Err(Error::UnsupportedStorageClass { class: c, .. }) if c == class));
}

#[test]
fn insert_defaults_to_storage_buffer() {
    let key = BindingKey::new(0, 1);
    let mut data = [0u8; 4];
    let mut bindings = ResourceBindings::new();
    bindings.insert(key, &mut data);
    assert_eq!(bindings.descriptor_type(key).unwrap(), DescriptorType::StorageBuffer);
}

#[test]
fn missing_storage_class() {
    let key = BindingKey::new(0, 0);
    let mut data = [0u8; 4];
    let mut bindings = ResourceBindings::new();
    bindings.insert_data(key, &mut data);
    let err = bindings.descriptor_type(key).unwrap_err();
    assert!(matches!(err, Error::MissingStorageClass { .. }));
    assert_eq!(err.to_string(), "no storage class recorded for resource at set 0, binding 0");
}

#[test]
fn footprint_sums_all_resources() {
    let (mut a, mut b) = ([0u8; 16], [0u8; 12]);
    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut a).insert(BindingKey::new(1, 0), &mut b);
    assert_eq!(bindings.footprint().unwrap(), 28);
    assert_eq!(bindings.len(), 2);
}

#[test]
fn footprint_rejects_empty_resource() {
    let (mut a, mut b) = ([0u8; 16], [0u8; 0]);
    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut a).insert(BindingKey::new(0, 5), &mut b);
    assert!(matches!(bindings.footprint(), Err(Error::ZeroSizedResource { key }) if key == BindingKey::new(0, 5)));
}

#[test]
fn sets_are_distinct_and_ascending() {
    let (mut a, mut b, mut c, mut d) = ([0u8; 1], [0u8; 1], [0u8; 1], [0u8; 1]);
    let mut bindings = ResourceBindings::new();
    bindings
        .insert(BindingKey::new(3, 0), &mut a)
        .insert(BindingKey::new(0, 2), &mut b)
        .insert(BindingKey::new(3, 1), &mut c)
        .insert(BindingKey::new(0, 0), &mut d);
    assert_eq!(bindings.sets().collect::<Vec<_>>(), [0, 3]);
    assert_eq!(
        bindings.keys().collect::<Vec<_>>(),
        [BindingKey::new(0, 0), BindingKey::new(0, 2), BindingKey::new(3, 0), BindingKey::new(3, 1)]
    );
}

#[test]
fn data_mut_writes_through_to_host() {
    let key = BindingKey::new(0, 0);
    let mut data = [0u8; 4];
    {
        let mut bindings = ResourceBindings::new();
        bindings.insert(key, &mut data);
        bindings.data_mut(key).unwrap().copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(bindings.data(key), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(bindings.data(BindingKey::new(0, 1)), None);
    }
    assert_eq!(data, [1, 2, 3, 4]);
}
