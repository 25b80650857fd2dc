//! Ownership-ordered record of every API object a session acquired.
//!
//! Objects are pushed as they are created and released strictly in reverse,
//! so a session that failed halfway releases exactly what it holds.

use spindle_device::{
    Buffer, CommandBuffer, CommandPool, DescriptorPool, DescriptorSet, DescriptorSetLayout, Device, DeviceMemory, Driver,
    Instance, Pipeline, PipelineLayout, QueryPool, ShaderModule,
};

/// One acquired API object, with whatever its release call needs besides the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Instance(Instance),
    Device(Device),
    Memory(DeviceMemory),
    Buffer(Buffer),
    ShaderModule(ShaderModule),
    SetLayout(DescriptorSetLayout),
    PipelineLayout(PipelineLayout),
    Pipeline(Pipeline),
    DescriptorPool(DescriptorPool),
    DescriptorSets { pool: DescriptorPool, sets: Vec<DescriptorSet> },
    CommandPool(CommandPool),
    QueryPool(QueryPool),
    CommandBuffer { pool: CommandPool, buffer: CommandBuffer },
}

#[derive(Debug, Default)]
pub struct ResourceArena {
    resources: Vec<Resource>,
}

impl ResourceArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, resource: Resource) {
        tracing::trace!(?resource, "acquired");
        self.resources.push(resource);
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// The logical device, once one was acquired.
    pub fn device(&self) -> Option<Device> {
        self.resources.iter().find_map(|resource| match resource {
            Resource::Device(device) => Some(*device),
            _ => None,
        })
    }

    /// Releases everything in reverse acquisition order, leaving the arena empty.
    ///
    /// Release calls that can fail are logged and skipped so that the rest of
    /// the arena is still released.
    pub fn release(&mut self, driver: &mut impl Driver) {
        let device = self.device().unwrap_or(Device::NULL);
        while let Some(resource) = self.resources.pop() {
            tracing::trace!(?resource, "releasing");
            match resource {
                Resource::Instance(instance) => driver.destroy_instance(instance),
                Resource::Device(device) => driver.destroy_device(device),
                Resource::Memory(memory) => driver.free_memory(device, memory),
                Resource::Buffer(buffer) => driver.destroy_buffer(device, buffer),
                Resource::ShaderModule(module) => driver.destroy_shader_module(device, module),
                Resource::SetLayout(layout) => driver.destroy_descriptor_set_layout(device, layout),
                Resource::PipelineLayout(layout) => driver.destroy_pipeline_layout(device, layout),
                Resource::Pipeline(pipeline) => driver.destroy_pipeline(device, pipeline),
                Resource::DescriptorPool(pool) => driver.destroy_descriptor_pool(device, pool),
                Resource::DescriptorSets { pool, sets } => {
                    if let Err(code) = driver.free_descriptor_sets(device, pool, &sets) {
                        tracing::warn!(%code, count = sets.len(), "failed to free descriptor sets");
                    }
                }
                Resource::CommandPool(pool) => driver.destroy_command_pool(device, pool),
                Resource::QueryPool(pool) => driver.destroy_query_pool(device, pool),
                Resource::CommandBuffer { pool, buffer } => driver.free_command_buffers(device, pool, &[buffer]),
            }
        }
    }
}
