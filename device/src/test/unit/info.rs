use enumset::EnumSet;
use spindle_dtype::StorageClass;
use test_case::test_case;

use crate::{BufferUsage, DescriptorType, MemoryHeap, MemoryProperties, MemoryProperty, MemoryType, QueueFamilyProperties, QueueFlag};

fn family(flags: EnumSet<QueueFlag>) -> QueueFamilyProperties {
    QueueFamilyProperties { flags, queue_count: 1, timestamp_valid_bits: 0 }
}

#[test_case(QueueFlag::Compute.into(), true, true ; "compute only")]
#[test_case(QueueFlag::Compute | QueueFlag::Transfer, true, true ; "compute and transfer")]
#[test_case(QueueFlag::Compute | QueueFlag::Graphics, true, false ; "compute and graphics")]
#[test_case(QueueFlag::Graphics.into(), false, false ; "graphics")]
#[test_case(EnumSet::empty(), false, false ; "nothing")]
fn queue_family_predicates(flags: EnumSet<QueueFlag>, compute: bool, compute_only: bool) {
    let family = family(flags);
    assert_eq!(family.supports_compute(), compute);
    assert_eq!(family.is_compute_only(), compute_only);
}

#[test]
fn timestamps_need_valid_bits() {
    let mut family = family(QueueFlag::Compute.into());
    assert!(!family.supports_timestamps());
    family.timestamp_valid_bits = 64;
    assert!(family.supports_timestamps());
}

fn memory(types: &[(EnumSet<MemoryProperty>, u32)], heaps: &[u64]) -> MemoryProperties {
    MemoryProperties {
        types: types.iter().map(|&(properties, heap_index)| MemoryType { properties, heap_index }).collect(),
        heaps: heaps.iter().map(|&size| MemoryHeap { size }).collect(),
    }
}

#[test]
fn host_coherent_type_skips_device_local_only() {
    let coherent = MemoryProperty::HostVisible | MemoryProperty::HostCoherent;
    let props = memory(&[(MemoryProperty::DeviceLocal.into(), 0), (coherent, 1)], &[1 << 30, 1 << 20]);
    assert_eq!(props.host_coherent_type(16), Some(1));
}

#[test]
fn host_coherent_type_requires_both_bits() {
    let props = memory(&[(MemoryProperty::HostVisible.into(), 0), (MemoryProperty::HostCoherent.into(), 0)], &[1024]);
    assert_eq!(props.host_coherent_type(16), None);
}

#[test]
fn host_coherent_type_respects_heap_size() {
    let coherent = MemoryProperty::HostVisible | MemoryProperty::HostCoherent;
    let props = memory(&[(coherent, 0), (coherent | MemoryProperty::HostCached, 1)], &[64, 4096]);
    assert_eq!(props.host_coherent_type(64), Some(0));
    assert_eq!(props.host_coherent_type(65), Some(1));
    assert_eq!(props.host_coherent_type(4097), None);
}

#[test]
fn host_coherent_type_ignores_dangling_heap_index() {
    let coherent = MemoryProperty::HostVisible | MemoryProperty::HostCoherent;
    let props = memory(&[(coherent, 3)], &[4096]);
    assert_eq!(props.host_coherent_type(1), None);
}

#[test_case(StorageClass::StorageBuffer, Some((DescriptorType::StorageBuffer, BufferUsage::StorageBuffer)) ; "storage buffer")]
#[test_case(StorageClass::Uniform, Some((DescriptorType::UniformBuffer, BufferUsage::UniformBuffer)) ; "uniform")]
#[test_case(StorageClass::PushConstant, None ; "push constant")]
#[test_case(StorageClass::Workgroup, None ; "workgroup")]
fn descriptor_for_storage_class(class: StorageClass, expected: Option<(DescriptorType, BufferUsage)>) {
    let mapped = DescriptorType::from_storage_class(class).map(|ty| (ty, ty.buffer_usage()));
    assert_eq!(mapped, expected);
}
