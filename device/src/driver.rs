//! The call surface a device session drives.
//!
//! Each method corresponds to one compute API entry point. Creation calls
//! return the new handle or the raw status the API reported; destroy and
//! record calls cannot fail at the API level and return nothing.

use crate::handle::*;
use crate::info::{
    BufferUsage, BufferWrite, DescriptorPoolSize, DeviceProperties, LayoutBinding, MemoryProperties, PipelineStage,
    QueueFamilyProperties,
};
use crate::result::ResultCode;

pub type DriverResult<T> = std::result::Result<T, ResultCode>;

pub trait Driver {
    fn create_instance(&mut self, application_name: &str) -> DriverResult<Instance>;
    fn destroy_instance(&mut self, instance: Instance);

    fn enumerate_physical_devices(&mut self, instance: Instance) -> DriverResult<Vec<PhysicalDevice>>;
    fn queue_family_properties(&mut self, physical: PhysicalDevice) -> Vec<QueueFamilyProperties>;
    fn memory_properties(&mut self, physical: PhysicalDevice) -> MemoryProperties;
    fn device_properties(&mut self, physical: PhysicalDevice) -> DeviceProperties;

    /// Creates a logical device with one queue from `queue_family`.
    fn create_device(&mut self, physical: PhysicalDevice, queue_family: u32) -> DriverResult<Device>;
    fn destroy_device(&mut self, device: Device);
    fn device_wait_idle(&mut self, device: Device) -> DriverResult<()>;
    fn get_device_queue(&mut self, device: Device, queue_family: u32, index: u32) -> Queue;

    fn allocate_memory(&mut self, device: Device, size: u64, memory_type: u32) -> DriverResult<DeviceMemory>;
    fn free_memory(&mut self, device: Device, memory: DeviceMemory);
    /// Maps `memory`, copies `data` to its start and unmaps it again.
    fn write_memory(&mut self, device: Device, memory: DeviceMemory, data: &[u8]) -> DriverResult<()>;
    /// Maps `memory`, fills `out` from its start and unmaps it again.
    fn read_memory(&mut self, device: Device, memory: DeviceMemory, out: &mut [u8]) -> DriverResult<()>;

    fn create_buffer(&mut self, device: Device, size: u64, usage: BufferUsage, queue_family: u32)
    -> DriverResult<Buffer>;
    fn bind_buffer_memory(&mut self, device: Device, buffer: Buffer, memory: DeviceMemory) -> DriverResult<()>;
    fn destroy_buffer(&mut self, device: Device, buffer: Buffer);

    fn create_shader_module(&mut self, device: Device, code: &[u32]) -> DriverResult<ShaderModule>;
    fn destroy_shader_module(&mut self, device: Device, module: ShaderModule);

    fn create_descriptor_set_layout(
        &mut self,
        device: Device,
        bindings: &[LayoutBinding],
    ) -> DriverResult<DescriptorSetLayout>;
    fn destroy_descriptor_set_layout(&mut self, device: Device, layout: DescriptorSetLayout);

    fn create_pipeline_layout(&mut self, device: Device, set_layouts: &[DescriptorSetLayout])
    -> DriverResult<PipelineLayout>;
    fn destroy_pipeline_layout(&mut self, device: Device, layout: PipelineLayout);

    fn create_compute_pipeline(
        &mut self,
        device: Device,
        layout: PipelineLayout,
        module: ShaderModule,
        entry_point: &str,
    ) -> DriverResult<Pipeline>;
    fn destroy_pipeline(&mut self, device: Device, pipeline: Pipeline);

    fn create_descriptor_pool(
        &mut self,
        device: Device,
        max_sets: u32,
        sizes: &[DescriptorPoolSize],
    ) -> DriverResult<DescriptorPool>;
    fn destroy_descriptor_pool(&mut self, device: Device, pool: DescriptorPool);
    fn allocate_descriptor_sets(
        &mut self,
        device: Device,
        pool: DescriptorPool,
        layouts: &[DescriptorSetLayout],
    ) -> DriverResult<Vec<DescriptorSet>>;
    fn free_descriptor_sets(&mut self, device: Device, pool: DescriptorPool, sets: &[DescriptorSet])
    -> DriverResult<()>;
    fn update_descriptor_sets(&mut self, device: Device, writes: &[BufferWrite]);

    fn create_command_pool(&mut self, device: Device, queue_family: u32) -> DriverResult<CommandPool>;
    fn destroy_command_pool(&mut self, device: Device, pool: CommandPool);
    fn allocate_command_buffer(&mut self, device: Device, pool: CommandPool) -> DriverResult<CommandBuffer>;
    fn free_command_buffers(&mut self, device: Device, pool: CommandPool, buffers: &[CommandBuffer]);

    /// Starts recording for a single submission.
    fn begin_command_buffer(&mut self, device: Device, buffer: CommandBuffer) -> DriverResult<()>;
    fn end_command_buffer(&mut self, device: Device, buffer: CommandBuffer) -> DriverResult<()>;
    fn cmd_reset_query_pool(&mut self, device: Device, buffer: CommandBuffer, pool: QueryPool, first: u32, count: u32);
    fn cmd_bind_pipeline(&mut self, device: Device, buffer: CommandBuffer, pipeline: Pipeline);
    /// Binds `sets` to consecutive set numbers starting at zero.
    fn cmd_bind_descriptor_sets(
        &mut self,
        device: Device,
        buffer: CommandBuffer,
        layout: PipelineLayout,
        sets: &[DescriptorSet],
    );
    fn cmd_write_timestamp(
        &mut self,
        device: Device,
        buffer: CommandBuffer,
        stage: PipelineStage,
        pool: QueryPool,
        query: u32,
    );
    fn cmd_dispatch(&mut self, device: Device, buffer: CommandBuffer, groups: [u32; 3]);

    fn create_query_pool(&mut self, device: Device, count: u32) -> DriverResult<QueryPool>;
    fn destroy_query_pool(&mut self, device: Device, pool: QueryPool);
    /// Waits for and returns `count` 64-bit timestamps starting at query zero.
    fn query_timestamps(&mut self, device: Device, pool: QueryPool, count: u32) -> DriverResult<Vec<u64>>;

    fn queue_submit(&mut self, device: Device, queue: Queue, buffers: &[CommandBuffer]) -> DriverResult<()>;
    fn queue_wait_idle(&mut self, device: Device, queue: Queue) -> DriverResult<()>;
}

/// Reinterprets a shader binary as the native-endian words drivers consume.
pub fn shader_words(binary: &[u8]) -> crate::Result<Vec<u32>> {
    snafu::ensure!(binary.len() % 4 == 0, crate::error::MisalignedShaderSnafu { len: binary.len() });
    Ok(binary.chunks_exact(4).map(|word| u32::from_ne_bytes([word[0], word[1], word[2], word[3]])).collect())
}
