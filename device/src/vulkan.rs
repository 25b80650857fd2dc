//! [`Driver`] over the system Vulkan loader, through `ash`.
//!
//! Handles crossing the seam are the raw Vulkan handle values. The driver keeps
//! the `ash` dispatch tables for instances and devices it created, keyed by
//! those values.

use std::collections::HashMap;
use std::ffi::CString;

use ash::vk::{self, Handle};
use enumset::EnumSet;
use snafu::ResultExt;

use crate::driver::{Driver, DriverResult};
use crate::error::{LoadingSnafu, Result};
use crate::handle::*;
use crate::info::*;
use crate::result::ResultCode;

const QUEUE_FLAGS: [(vk::QueueFlags, QueueFlag); 4] = [
    (vk::QueueFlags::GRAPHICS, QueueFlag::Graphics),
    (vk::QueueFlags::COMPUTE, QueueFlag::Compute),
    (vk::QueueFlags::TRANSFER, QueueFlag::Transfer),
    (vk::QueueFlags::SPARSE_BINDING, QueueFlag::SparseBinding),
];

const MEMORY_PROPERTIES: [(vk::MemoryPropertyFlags, MemoryProperty); 5] = [
    (vk::MemoryPropertyFlags::DEVICE_LOCAL, MemoryProperty::DeviceLocal),
    (vk::MemoryPropertyFlags::HOST_VISIBLE, MemoryProperty::HostVisible),
    (vk::MemoryPropertyFlags::HOST_COHERENT, MemoryProperty::HostCoherent),
    (vk::MemoryPropertyFlags::HOST_CACHED, MemoryProperty::HostCached),
    (vk::MemoryPropertyFlags::LAZILY_ALLOCATED, MemoryProperty::LazilyAllocated),
];

fn queue_flags(flags: vk::QueueFlags) -> EnumSet<QueueFlag> {
    QUEUE_FLAGS.into_iter().filter(|(bit, _)| flags.contains(*bit)).map(|(_, flag)| flag).collect()
}

fn memory_properties(flags: vk::MemoryPropertyFlags) -> EnumSet<MemoryProperty> {
    MEMORY_PROPERTIES.into_iter().filter(|(bit, _)| flags.contains(*bit)).map(|(_, prop)| prop).collect()
}

fn descriptor_type(ty: DescriptorType) -> vk::DescriptorType {
    match ty {
        DescriptorType::StorageBuffer => vk::DescriptorType::STORAGE_BUFFER,
        DescriptorType::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
    }
}

fn buffer_usage(usage: BufferUsage) -> vk::BufferUsageFlags {
    match usage {
        BufferUsage::StorageBuffer => vk::BufferUsageFlags::STORAGE_BUFFER,
        BufferUsage::UniformBuffer => vk::BufferUsageFlags::UNIFORM_BUFFER,
    }
}

fn pipeline_stage(stage: PipelineStage) -> vk::PipelineStageFlags {
    match stage {
        PipelineStage::ComputeShader => vk::PipelineStageFlags::COMPUTE_SHADER,
        PipelineStage::BottomOfPipe => vk::PipelineStageFlags::BOTTOM_OF_PIPE,
    }
}

fn c_string(text: &str) -> DriverResult<CString> {
    CString::new(text).map_err(|_| ResultCode::ERROR_INITIALIZATION_FAILED)
}

pub struct AshDriver {
    entry: ash::Entry,
    instances: HashMap<Instance, ash::Instance>,
    /// Physical devices are queried through the instance that enumerated them.
    physical_owners: HashMap<PhysicalDevice, Instance>,
    devices: HashMap<Device, ash::Device>,
}

impl AshDriver {
    /// Loads the system Vulkan library.
    pub fn new() -> Result<Self> {
        // SAFETY: the loader's initialisers run once here, before any other Vulkan call.
        let entry = unsafe { ash::Entry::load() }.context(LoadingSnafu)?;
        Ok(Self { entry, instances: HashMap::new(), physical_owners: HashMap::new(), devices: HashMap::new() })
    }

    fn instance_of(&self, physical: PhysicalDevice) -> Option<&ash::Instance> {
        self.physical_owners.get(&physical).and_then(|instance| self.instances.get(instance))
    }

    fn device(&self, device: Device) -> DriverResult<&ash::Device> {
        self.devices.get(&device).ok_or(ResultCode::ERROR_DEVICE_LOST)
    }

    /// Runs a call that cannot report failure; unknown devices are logged and skipped.
    fn with_device(&self, device: Device, call: &'static str, f: impl FnOnce(&ash::Device)) {
        match self.devices.get(&device) {
            Some(dev) => f(dev),
            None => tracing::warn!(%device, call, "call on unknown device skipped"),
        }
    }
}

impl Driver for AshDriver {
    fn create_instance(&mut self, application_name: &str) -> DriverResult<Instance> {
        let name = c_string(application_name)?;
        let app = vk::ApplicationInfo::default()
            .application_name(&name)
            .engine_name(c"spindle")
            .api_version(vk::API_VERSION_1_0);
        let info = vk::InstanceCreateInfo::default().application_info(&app);
        // SAFETY: `info` and everything it points to outlive the call.
        let instance = unsafe { self.entry.create_instance(&info, None) }?;
        let handle = Instance(instance.handle().as_raw());
        self.instances.insert(handle, instance);
        Ok(handle)
    }

    fn destroy_instance(&mut self, instance: Instance) {
        self.physical_owners.retain(|_, owner| *owner != instance);
        if let Some(raw) = self.instances.remove(&instance) {
            // SAFETY: every device created from this instance has been destroyed by the caller.
            unsafe { raw.destroy_instance(None) };
        }
    }

    fn enumerate_physical_devices(&mut self, instance: Instance) -> DriverResult<Vec<PhysicalDevice>> {
        let raw = self.instances.get(&instance).ok_or(ResultCode::ERROR_INITIALIZATION_FAILED)?;
        // SAFETY: `raw` is a live instance.
        let physical: Vec<_> =
            unsafe { raw.enumerate_physical_devices() }?.iter().map(|pd| PhysicalDevice(pd.as_raw())).collect();
        for &handle in &physical {
            self.physical_owners.insert(handle, instance);
        }
        Ok(physical)
    }

    fn queue_family_properties(&mut self, physical: PhysicalDevice) -> Vec<QueueFamilyProperties> {
        let Some(instance) = self.instance_of(physical) else { return Vec::new() };
        // SAFETY: the physical device was enumerated from this live instance.
        let families =
            unsafe { instance.get_physical_device_queue_family_properties(vk::PhysicalDevice::from_raw(physical.0)) };
        families
            .iter()
            .map(|family| QueueFamilyProperties {
                flags: queue_flags(family.queue_flags),
                queue_count: family.queue_count,
                timestamp_valid_bits: family.timestamp_valid_bits,
            })
            .collect()
    }

    fn memory_properties(&mut self, physical: PhysicalDevice) -> MemoryProperties {
        let Some(instance) = self.instance_of(physical) else { return MemoryProperties::default() };
        // SAFETY: as above.
        let props = unsafe { instance.get_physical_device_memory_properties(vk::PhysicalDevice::from_raw(physical.0)) };
        let types = props.memory_types[..props.memory_type_count as usize]
            .iter()
            .map(|ty| MemoryType { properties: memory_properties(ty.property_flags), heap_index: ty.heap_index })
            .collect();
        let heaps =
            props.memory_heaps[..props.memory_heap_count as usize].iter().map(|heap| MemoryHeap { size: heap.size }).collect();
        MemoryProperties { types, heaps }
    }

    fn device_properties(&mut self, physical: PhysicalDevice) -> DeviceProperties {
        let Some(instance) = self.instance_of(physical) else { return DeviceProperties::default() };
        // SAFETY: as above.
        let props = unsafe { instance.get_physical_device_properties(vk::PhysicalDevice::from_raw(physical.0)) };
        let name = props.device_name_as_c_str().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
        DeviceProperties { name, timestamp_period: props.limits.timestamp_period }
    }

    fn create_device(&mut self, physical: PhysicalDevice, queue_family: u32) -> DriverResult<Device> {
        let instance = self.instance_of(physical).ok_or(ResultCode::ERROR_INITIALIZATION_FAILED)?;
        let priorities = [1.0_f32];
        let queue = vk::DeviceQueueCreateInfo::default().queue_family_index(queue_family).queue_priorities(&priorities);
        let info = vk::DeviceCreateInfo::default().queue_create_infos(std::slice::from_ref(&queue));
        // SAFETY: `info` outlives the call and the physical device belongs to `instance`.
        let device = unsafe { instance.create_device(vk::PhysicalDevice::from_raw(physical.0), &info, None) }?;
        let handle = Device(device.handle().as_raw());
        self.devices.insert(handle, device);
        Ok(handle)
    }

    fn destroy_device(&mut self, device: Device) {
        if let Some(raw) = self.devices.remove(&device) {
            // SAFETY: the caller released every child object first.
            unsafe { raw.destroy_device(None) };
        }
    }

    fn device_wait_idle(&mut self, device: Device) -> DriverResult<()> {
        let dev = self.device(device)?;
        // SAFETY: `dev` is live.
        Ok(unsafe { dev.device_wait_idle() }?)
    }

    fn get_device_queue(&mut self, device: Device, queue_family: u32, index: u32) -> Queue {
        self.devices
            .get(&device)
            // SAFETY: the device was created with a queue from `queue_family`.
            .map(|dev| Queue(unsafe { dev.get_device_queue(queue_family, index) }.as_raw()))
            .unwrap_or(Queue::NULL)
    }

    fn allocate_memory(&mut self, device: Device, size: u64, memory_type: u32) -> DriverResult<DeviceMemory> {
        let dev = self.device(device)?;
        let info = vk::MemoryAllocateInfo::default().allocation_size(size).memory_type_index(memory_type);
        // SAFETY: `info` outlives the call.
        let memory = unsafe { dev.allocate_memory(&info, None) }?;
        Ok(DeviceMemory(memory.as_raw()))
    }

    fn free_memory(&mut self, device: Device, memory: DeviceMemory) {
        self.with_device(device, "vkFreeMemory", |dev| {
            // SAFETY: nothing bound to this memory is still in use.
            unsafe { dev.free_memory(vk::DeviceMemory::from_raw(memory.0), None) }
        });
    }

    fn write_memory(&mut self, device: Device, memory: DeviceMemory, data: &[u8]) -> DriverResult<()> {
        let dev = self.device(device)?;
        let memory = vk::DeviceMemory::from_raw(memory.0);
        // SAFETY: the mapping spans `data.len()` bytes of host-visible memory and is
        // released before returning.
        unsafe {
            let mapped = dev.map_memory(memory, 0, data.len() as u64, vk::MemoryMapFlags::empty())?;
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped.cast::<u8>(), data.len());
            dev.unmap_memory(memory);
        }
        Ok(())
    }

    fn read_memory(&mut self, device: Device, memory: DeviceMemory, out: &mut [u8]) -> DriverResult<()> {
        let dev = self.device(device)?;
        let memory = vk::DeviceMemory::from_raw(memory.0);
        // SAFETY: as in `write_memory`; the device is idle so nothing writes concurrently.
        unsafe {
            let mapped = dev.map_memory(memory, 0, out.len() as u64, vk::MemoryMapFlags::empty())?;
            std::ptr::copy_nonoverlapping(mapped.cast::<u8>(), out.as_mut_ptr(), out.len());
            dev.unmap_memory(memory);
        }
        Ok(())
    }

    fn create_buffer(
        &mut self,
        device: Device,
        size: u64,
        usage: BufferUsage,
        queue_family: u32,
    ) -> DriverResult<Buffer> {
        let dev = self.device(device)?;
        let families = [queue_family];
        let info = vk::BufferCreateInfo::default()
            .size(size)
            .usage(buffer_usage(usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .queue_family_indices(&families);
        // SAFETY: `info` outlives the call.
        let buffer = unsafe { dev.create_buffer(&info, None) }?;
        Ok(Buffer(buffer.as_raw()))
    }

    fn bind_buffer_memory(&mut self, device: Device, buffer: Buffer, memory: DeviceMemory) -> DriverResult<()> {
        let dev = self.device(device)?;
        // SAFETY: both objects belong to `dev` and the memory is at least as large as the buffer.
        Ok(unsafe { dev.bind_buffer_memory(vk::Buffer::from_raw(buffer.0), vk::DeviceMemory::from_raw(memory.0), 0) }?)
    }

    fn destroy_buffer(&mut self, device: Device, buffer: Buffer) {
        self.with_device(device, "vkDestroyBuffer", |dev| {
            // SAFETY: no pending command references the buffer.
            unsafe { dev.destroy_buffer(vk::Buffer::from_raw(buffer.0), None) }
        });
    }

    fn create_shader_module(&mut self, device: Device, code: &[u32]) -> DriverResult<ShaderModule> {
        let dev = self.device(device)?;
        let info = vk::ShaderModuleCreateInfo::default().code(code);
        // SAFETY: `info` outlives the call.
        let module = unsafe { dev.create_shader_module(&info, None) }?;
        Ok(ShaderModule(module.as_raw()))
    }

    fn destroy_shader_module(&mut self, device: Device, module: ShaderModule) {
        self.with_device(device, "vkDestroyShaderModule", |dev| {
            // SAFETY: pipelines keep their own copy of the code.
            unsafe { dev.destroy_shader_module(vk::ShaderModule::from_raw(module.0), None) }
        });
    }

    fn create_descriptor_set_layout(
        &mut self,
        device: Device,
        bindings: &[LayoutBinding],
    ) -> DriverResult<DescriptorSetLayout> {
        let dev = self.device(device)?;
        let bindings: Vec<_> = bindings
            .iter()
            .map(|binding| {
                vk::DescriptorSetLayoutBinding::default()
                    .binding(binding.binding)
                    .descriptor_type(descriptor_type(binding.descriptor_type))
                    .descriptor_count(binding.count)
                    .stage_flags(vk::ShaderStageFlags::COMPUTE)
            })
            .collect();
        let info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);
        // SAFETY: `info` outlives the call.
        let layout = unsafe { dev.create_descriptor_set_layout(&info, None) }?;
        Ok(DescriptorSetLayout(layout.as_raw()))
    }

    fn destroy_descriptor_set_layout(&mut self, device: Device, layout: DescriptorSetLayout) {
        self.with_device(device, "vkDestroyDescriptorSetLayout", |dev| {
            // SAFETY: sets allocated with this layout were freed first.
            unsafe { dev.destroy_descriptor_set_layout(vk::DescriptorSetLayout::from_raw(layout.0), None) }
        });
    }

    fn create_pipeline_layout(
        &mut self,
        device: Device,
        set_layouts: &[DescriptorSetLayout],
    ) -> DriverResult<PipelineLayout> {
        let dev = self.device(device)?;
        let layouts: Vec<_> = set_layouts.iter().map(|layout| vk::DescriptorSetLayout::from_raw(layout.0)).collect();
        let info = vk::PipelineLayoutCreateInfo::default().set_layouts(&layouts);
        // SAFETY: `info` outlives the call.
        let layout = unsafe { dev.create_pipeline_layout(&info, None) }?;
        Ok(PipelineLayout(layout.as_raw()))
    }

    fn destroy_pipeline_layout(&mut self, device: Device, layout: PipelineLayout) {
        self.with_device(device, "vkDestroyPipelineLayout", |dev| {
            // SAFETY: the pipeline built on this layout was destroyed first.
            unsafe { dev.destroy_pipeline_layout(vk::PipelineLayout::from_raw(layout.0), None) }
        });
    }

    fn create_compute_pipeline(
        &mut self,
        device: Device,
        layout: PipelineLayout,
        module: ShaderModule,
        entry_point: &str,
    ) -> DriverResult<Pipeline> {
        let dev = self.device(device)?;
        let entry = c_string(entry_point)?;
        let stage = vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::COMPUTE)
            .module(vk::ShaderModule::from_raw(module.0))
            .name(&entry);
        let info = vk::ComputePipelineCreateInfo::default().stage(stage).layout(vk::PipelineLayout::from_raw(layout.0));
        // SAFETY: `info` and the entry point name outlive the call.
        let pipelines =
            unsafe { dev.create_compute_pipelines(vk::PipelineCache::null(), std::slice::from_ref(&info), None) }
                .map_err(|(_, err)| err)?;
        pipelines.first().map(|pipeline| Pipeline(pipeline.as_raw())).ok_or(ResultCode::ERROR_UNKNOWN)
    }

    fn destroy_pipeline(&mut self, device: Device, pipeline: Pipeline) {
        self.with_device(device, "vkDestroyPipeline", |dev| {
            // SAFETY: the device is idle.
            unsafe { dev.destroy_pipeline(vk::Pipeline::from_raw(pipeline.0), None) }
        });
    }

    fn create_descriptor_pool(
        &mut self,
        device: Device,
        max_sets: u32,
        sizes: &[DescriptorPoolSize],
    ) -> DriverResult<DescriptorPool> {
        let dev = self.device(device)?;
        let sizes: Vec<_> = sizes
            .iter()
            .map(|size| {
                vk::DescriptorPoolSize::default().ty(descriptor_type(size.descriptor_type)).descriptor_count(size.count)
            })
            .collect();
        // Sets are freed individually on teardown.
        let info = vk::DescriptorPoolCreateInfo::default()
            .flags(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
            .max_sets(max_sets)
            .pool_sizes(&sizes);
        // SAFETY: `info` outlives the call.
        let pool = unsafe { dev.create_descriptor_pool(&info, None) }?;
        Ok(DescriptorPool(pool.as_raw()))
    }

    fn destroy_descriptor_pool(&mut self, device: Device, pool: DescriptorPool) {
        self.with_device(device, "vkDestroyDescriptorPool", |dev| {
            // SAFETY: the device is idle.
            unsafe { dev.destroy_descriptor_pool(vk::DescriptorPool::from_raw(pool.0), None) }
        });
    }

    fn allocate_descriptor_sets(
        &mut self,
        device: Device,
        pool: DescriptorPool,
        layouts: &[DescriptorSetLayout],
    ) -> DriverResult<Vec<DescriptorSet>> {
        let dev = self.device(device)?;
        let layouts: Vec<_> = layouts.iter().map(|layout| vk::DescriptorSetLayout::from_raw(layout.0)).collect();
        let info =
            vk::DescriptorSetAllocateInfo::default().descriptor_pool(vk::DescriptorPool::from_raw(pool.0)).set_layouts(&layouts);
        // SAFETY: `info` outlives the call.
        let sets = unsafe { dev.allocate_descriptor_sets(&info) }?;
        Ok(sets.iter().map(|set| DescriptorSet(set.as_raw())).collect())
    }

    fn free_descriptor_sets(&mut self, device: Device, pool: DescriptorPool, sets: &[DescriptorSet]) -> DriverResult<()> {
        let dev = self.device(device)?;
        let sets: Vec<_> = sets.iter().map(|set| vk::DescriptorSet::from_raw(set.0)).collect();
        // SAFETY: the pool was created with FREE_DESCRIPTOR_SET and the sets came from it.
        Ok(unsafe { dev.free_descriptor_sets(vk::DescriptorPool::from_raw(pool.0), &sets) }?)
    }

    fn update_descriptor_sets(&mut self, device: Device, writes: &[BufferWrite]) {
        let infos: Vec<_> = writes
            .iter()
            .map(|write| {
                vk::DescriptorBufferInfo::default()
                    .buffer(vk::Buffer::from_raw(write.buffer.0))
                    .offset(0)
                    .range(vk::WHOLE_SIZE)
            })
            .collect();
        let writes: Vec<_> = writes
            .iter()
            .zip(&infos)
            .map(|(write, info)| {
                vk::WriteDescriptorSet::default()
                    .dst_set(vk::DescriptorSet::from_raw(write.set.0))
                    .dst_binding(write.binding)
                    .descriptor_type(descriptor_type(write.descriptor_type))
                    .buffer_info(std::slice::from_ref(info))
            })
            .collect();
        self.with_device(device, "vkUpdateDescriptorSets", |dev| {
            // SAFETY: `writes` and the buffer infos they point to outlive the call.
            unsafe { dev.update_descriptor_sets(&writes, &[]) }
        });
    }

    fn create_command_pool(&mut self, device: Device, queue_family: u32) -> DriverResult<CommandPool> {
        let dev = self.device(device)?;
        let info = vk::CommandPoolCreateInfo::default().queue_family_index(queue_family);
        // SAFETY: `info` outlives the call.
        let pool = unsafe { dev.create_command_pool(&info, None) }?;
        Ok(CommandPool(pool.as_raw()))
    }

    fn destroy_command_pool(&mut self, device: Device, pool: CommandPool) {
        self.with_device(device, "vkDestroyCommandPool", |dev| {
            // SAFETY: the device is idle.
            unsafe { dev.destroy_command_pool(vk::CommandPool::from_raw(pool.0), None) }
        });
    }

    fn allocate_command_buffer(&mut self, device: Device, pool: CommandPool) -> DriverResult<CommandBuffer> {
        let dev = self.device(device)?;
        let info = vk::CommandBufferAllocateInfo::default()
            .command_pool(vk::CommandPool::from_raw(pool.0))
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        // SAFETY: `info` outlives the call.
        let buffers = unsafe { dev.allocate_command_buffers(&info) }?;
        buffers.first().map(|buffer| CommandBuffer(buffer.as_raw())).ok_or(ResultCode::ERROR_UNKNOWN)
    }

    fn free_command_buffers(&mut self, device: Device, pool: CommandPool, buffers: &[CommandBuffer]) {
        let buffers: Vec<_> = buffers.iter().map(|buffer| vk::CommandBuffer::from_raw(buffer.0)).collect();
        self.with_device(device, "vkFreeCommandBuffers", |dev| {
            // SAFETY: no buffer is pending execution.
            unsafe { dev.free_command_buffers(vk::CommandPool::from_raw(pool.0), &buffers) }
        });
    }

    fn begin_command_buffer(&mut self, device: Device, buffer: CommandBuffer) -> DriverResult<()> {
        let dev = self.device(device)?;
        let info = vk::CommandBufferBeginInfo::default().flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        // SAFETY: the buffer is in the initial state.
        Ok(unsafe { dev.begin_command_buffer(vk::CommandBuffer::from_raw(buffer.0), &info) }?)
    }

    fn end_command_buffer(&mut self, device: Device, buffer: CommandBuffer) -> DriverResult<()> {
        let dev = self.device(device)?;
        // SAFETY: the buffer is recording.
        Ok(unsafe { dev.end_command_buffer(vk::CommandBuffer::from_raw(buffer.0)) }?)
    }

    fn cmd_reset_query_pool(&mut self, device: Device, buffer: CommandBuffer, pool: QueryPool, first: u32, count: u32) {
        self.with_device(device, "vkCmdResetQueryPool", |dev| {
            // SAFETY: the buffer is recording.
            unsafe {
                dev.cmd_reset_query_pool(vk::CommandBuffer::from_raw(buffer.0), vk::QueryPool::from_raw(pool.0), first, count)
            }
        });
    }

    fn cmd_bind_pipeline(&mut self, device: Device, buffer: CommandBuffer, pipeline: Pipeline) {
        self.with_device(device, "vkCmdBindPipeline", |dev| {
            // SAFETY: the buffer is recording.
            unsafe {
                dev.cmd_bind_pipeline(
                    vk::CommandBuffer::from_raw(buffer.0),
                    vk::PipelineBindPoint::COMPUTE,
                    vk::Pipeline::from_raw(pipeline.0),
                )
            }
        });
    }

    fn cmd_bind_descriptor_sets(
        &mut self,
        device: Device,
        buffer: CommandBuffer,
        layout: PipelineLayout,
        sets: &[DescriptorSet],
    ) {
        let sets: Vec<_> = sets.iter().map(|set| vk::DescriptorSet::from_raw(set.0)).collect();
        self.with_device(device, "vkCmdBindDescriptorSets", |dev| {
            // SAFETY: the buffer is recording and the sets match the layout.
            unsafe {
                dev.cmd_bind_descriptor_sets(
                    vk::CommandBuffer::from_raw(buffer.0),
                    vk::PipelineBindPoint::COMPUTE,
                    vk::PipelineLayout::from_raw(layout.0),
                    0,
                    &sets,
                    &[],
                )
            }
        });
    }

    fn cmd_write_timestamp(
        &mut self,
        device: Device,
        buffer: CommandBuffer,
        stage: PipelineStage,
        pool: QueryPool,
        query: u32,
    ) {
        self.with_device(device, "vkCmdWriteTimestamp", |dev| {
            // SAFETY: the buffer is recording and the query was reset in it.
            unsafe {
                dev.cmd_write_timestamp(
                    vk::CommandBuffer::from_raw(buffer.0),
                    pipeline_stage(stage),
                    vk::QueryPool::from_raw(pool.0),
                    query,
                )
            }
        });
    }

    fn cmd_dispatch(&mut self, device: Device, buffer: CommandBuffer, [x, y, z]: [u32; 3]) {
        self.with_device(device, "vkCmdDispatch", |dev| {
            // SAFETY: the buffer is recording with a compute pipeline bound.
            unsafe { dev.cmd_dispatch(vk::CommandBuffer::from_raw(buffer.0), x, y, z) }
        });
    }

    fn create_query_pool(&mut self, device: Device, count: u32) -> DriverResult<QueryPool> {
        let dev = self.device(device)?;
        let info = vk::QueryPoolCreateInfo::default().query_type(vk::QueryType::TIMESTAMP).query_count(count);
        // SAFETY: `info` outlives the call.
        let pool = unsafe { dev.create_query_pool(&info, None) }?;
        Ok(QueryPool(pool.as_raw()))
    }

    fn destroy_query_pool(&mut self, device: Device, pool: QueryPool) {
        self.with_device(device, "vkDestroyQueryPool", |dev| {
            // SAFETY: the device is idle.
            unsafe { dev.destroy_query_pool(vk::QueryPool::from_raw(pool.0), None) }
        });
    }

    fn query_timestamps(&mut self, device: Device, pool: QueryPool, count: u32) -> DriverResult<Vec<u64>> {
        let dev = self.device(device)?;
        let mut timestamps = vec![0u64; count as usize];
        // SAFETY: `timestamps` holds one 64-bit slot per query.
        unsafe {
            dev.get_query_pool_results(
                vk::QueryPool::from_raw(pool.0),
                0,
                &mut timestamps,
                vk::QueryResultFlags::TYPE_64 | vk::QueryResultFlags::WAIT,
            )
        }?;
        Ok(timestamps)
    }

    fn queue_submit(&mut self, device: Device, queue: Queue, buffers: &[CommandBuffer]) -> DriverResult<()> {
        let dev = self.device(device)?;
        let buffers: Vec<_> = buffers.iter().map(|buffer| vk::CommandBuffer::from_raw(buffer.0)).collect();
        let submit = vk::SubmitInfo::default().command_buffers(&buffers);
        // SAFETY: every buffer is fully recorded and `submit` outlives the call.
        Ok(unsafe { dev.queue_submit(vk::Queue::from_raw(queue.0), std::slice::from_ref(&submit), vk::Fence::null()) }?)
    }

    fn queue_wait_idle(&mut self, device: Device, queue: Queue) -> DriverResult<()> {
        let dev = self.device(device)?;
        // SAFETY: the queue belongs to `dev`.
        Ok(unsafe { dev.queue_wait_idle(vk::Queue::from_raw(queue.0)) }?)
    }
}

impl Drop for AshDriver {
    fn drop(&mut self) {
        if self.devices.is_empty() && self.instances.is_empty() {
            return;
        }
        tracing::warn!(devices = self.devices.len(), instances = self.instances.len(), "destroying leaked API objects");
        for (_, device) in self.devices.drain() {
            // SAFETY: the driver is going away; nothing can use the device afterwards.
            unsafe { device.destroy_device(None) };
        }
        for (_, instance) in self.instances.drain() {
            // SAFETY: its devices were destroyed above.
            unsafe { instance.destroy_instance(None) };
        }
    }
}
