//! A device session: one shader dispatch over host buffers.
//!
//! The session is a forward-only state machine. Each public step moves it
//! from the [`Stage`] directly before the step's target to that target, or
//! fails without moving. After a failed step the only valid call is
//! [`Session::destroy`], which releases exactly the objects acquired so far
//! (see [`ResourceArena`]).
//!
//! ```text
//! Uninitialized → InstanceCreated → DeviceReady → BuffersAllocated
//!   → ShaderLoaded → LayoutsBuilt → PipelineReady → DescriptorsBound
//!   → CommandsRecorded → Submitted → Idle → ReadBack → Destroyed
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use snafu::{OptionExt, ResultExt, ensure};
use spindle_device::{
    Buffer, BufferWrite, CommandBuffer, CommandPool, DescriptorPoolSize, DescriptorSet, DescriptorSetLayout,
    DescriptorType, Device, DeviceMemory, Driver, Instance, LayoutBinding, Pipeline, PipelineLayout, PipelineStage,
    QueryPool, Queue, ShaderModule, shader_words,
};
use strum::VariantArray;

use crate::arena::{Resource, ResourceArena};
use crate::bindings::{BindingKey, ResourceBindings};
use crate::config::RuntimeConfig;
use crate::error::*;
use crate::select::{QueueSelection, select_compute_queue};

/// Queries bracketing the dispatch: before and after.
const TIMESTAMP_QUERIES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(strum::Display, strum::VariantArray)]
pub enum Stage {
    Uninitialized,
    InstanceCreated,
    /// Physical and logical device chosen, memory type selected.
    DeviceReady,
    /// One device buffer per binding, host data copied in.
    BuffersAllocated,
    ShaderLoaded,
    /// Descriptor set layouts and the pipeline layout.
    LayoutsBuilt,
    PipelineReady,
    /// Pool and sets allocated, sets pointing at the buffers.
    DescriptorsBound,
    CommandsRecorded,
    Submitted,
    /// Queue drained, timestamps read.
    Idle,
    /// Host buffers updated from device memory.
    ReadBack,
    Destroyed,
}

impl Stage {
    /// Stage a session has to be in for a step to reach `self`.
    pub fn previous(self) -> Option<Self> {
        let index = Self::VARIANTS.iter().position(|stage| *stage == self)?;
        index.checked_sub(1).map(|previous| Self::VARIANTS[previous])
    }
}

/// Host and device timings of one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timings {
    /// Time spent in the submit call.
    pub submit: Duration,
    /// Time from the end of submission to the queue going idle.
    pub wait_idle: Duration,
    /// Shader execution as measured by device timestamps, when the queue supports them.
    pub shader: Option<Duration>,
}

impl Timings {
    /// Converts a pair of timestamp ticks to wall time.
    pub fn ticks_to_duration(begin: u64, end: u64, period_ns: f32) -> Duration {
        Duration::from_nanos((end.saturating_sub(begin) as f64 * f64::from(period_ns)) as u64)
    }
}

impl fmt::Display for Timings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "submit {}us, wait idle {}us", self.submit.as_micros(), self.wait_idle.as_micros())?;
        if let Some(shader) = self.shader {
            write!(f, ", shader {:.3}us", shader.as_secs_f64() * 1e6)?;
        }
        Ok(())
    }
}

/// Pool sizes covering every descriptor, one entry per descriptor type.
pub fn descriptor_pool_sizes(types: impl IntoIterator<Item = DescriptorType>) -> Vec<DescriptorPoolSize> {
    let mut counts = BTreeMap::new();
    for descriptor_type in types {
        *counts.entry(descriptor_type).or_insert(0u32) += 1;
    }
    counts.into_iter().map(|(descriptor_type, count)| DescriptorPoolSize { descriptor_type, count }).collect()
}

#[derive(Debug, Clone, Copy)]
struct DeviceBuffer {
    memory: DeviceMemory,
    buffer: Buffer,
    descriptor_type: DescriptorType,
}

pub struct Session<'a, D: Driver> {
    driver: D,
    config: RuntimeConfig,
    bindings: ResourceBindings<'a>,
    shader: Vec<u32>,
    footprint: u64,

    stage: Stage,
    aborted: bool,
    /// Set when the idle wait before teardown failed; drop will not retry it.
    teardown_failed: bool,
    arena: ResourceArena,

    instance: Instance,
    selection: Option<QueueSelection>,
    device: Device,
    memory_type: u32,
    buffers: BTreeMap<BindingKey, DeviceBuffer>,
    shader_module: ShaderModule,
    /// Layouts in ascending set order, which is also the binding order.
    set_layouts: Vec<(u32, DescriptorSetLayout)>,
    pipeline_layout: PipelineLayout,
    pipeline: Pipeline,
    descriptor_sets: Vec<DescriptorSet>,
    command_pool: CommandPool,
    query_pool: Option<QueryPool>,
    timestamp_period: f32,
    command_buffer: CommandBuffer,
    queue: Queue,
    submitted_at: Option<Instant>,
    timings: Timings,
}

impl<'a, D: Driver> Session<'a, D> {
    /// Validates the configuration; no driver call is made yet.
    pub fn new(driver: D, config: RuntimeConfig, bindings: ResourceBindings<'a>) -> Result<Self> {
        ensure!(!bindings.is_empty(), NoResourcesSnafu);
        ensure!(!config.shader.is_empty(), EmptyShaderSnafu);
        let shader = shader_words(&config.shader).context(ShaderSnafu)?;
        let footprint = bindings.footprint()?;

        Ok(Self {
            driver,
            config,
            bindings,
            shader,
            footprint,
            stage: Stage::Uninitialized,
            aborted: false,
            teardown_failed: false,
            arena: ResourceArena::new(),
            instance: Instance::NULL,
            selection: None,
            device: Device::NULL,
            memory_type: 0,
            buffers: BTreeMap::new(),
            shader_module: ShaderModule::NULL,
            set_layouts: Vec::new(),
            pipeline_layout: PipelineLayout::NULL,
            pipeline: Pipeline::NULL,
            descriptor_sets: Vec::new(),
            command_pool: CommandPool::NULL,
            query_pool: None,
            timestamp_period: 0.0,
            command_buffer: CommandBuffer::NULL,
            queue: Queue::NULL,
            submitted_at: None,
            timings: Timings::default(),
        })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn arena(&self) -> &ResourceArena {
        &self.arena
    }

    /// Device and queue family chosen by [`create_device`](Self::create_device).
    pub fn selection(&self) -> Option<QueueSelection> {
        self.selection
    }

    pub fn memory_type(&self) -> u32 {
        self.memory_type
    }

    /// Total byte size of all resources.
    pub fn footprint(&self) -> u64 {
        self.footprint
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    /// Runs every step from [`Stage::Uninitialized`] through [`Stage::ReadBack`].
    ///
    /// Teardown is left to [`destroy`](Self::destroy), or to drop.
    pub fn run(&mut self) -> Result<Timings> {
        self.create_instance()?;
        self.create_device()?;
        self.allocate_buffers()?;
        self.load_shader()?;
        self.build_layouts()?;
        self.create_pipeline()?;
        self.bind_descriptors()?;
        self.record_commands()?;
        self.submit()?;
        self.wait_idle()?;
        self.read_back()?;
        Ok(self.timings)
    }

    fn step(&mut self, target: Stage, body: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        ensure!(!self.aborted, AbortedSnafu { stage: self.stage });
        let expected = target.previous().unwrap_or(target);
        ensure!(self.stage == expected, InvalidStageSnafu { expected, actual: self.stage });

        let _span = tracing::debug_span!("session_step", stage = %target).entered();
        match body(self) {
            Ok(()) => {
                tracing::debug!(held = self.arena.len(), "stage reached");
                self.stage = target;
                Ok(())
            }
            Err(err) => {
                tracing::debug!(%err, "step failed");
                self.aborted = true;
                Err(err)
            }
        }
    }

    fn queue_family(&self) -> u32 {
        self.selection.map_or(0, |selection| selection.family)
    }

    pub fn create_instance(&mut self) -> Result<()> {
        self.step(Stage::InstanceCreated, |s| {
            let instance = s
                .driver
                .create_instance(&s.config.application_name)
                .context(DeviceCallSnafu { call: "vkCreateInstance" })?;
            s.arena.push(Resource::Instance(instance));
            s.instance = instance;
            Ok(())
        })
    }

    /// Picks the physical device and queue family, creates the logical device
    /// and selects the memory type for all resources.
    pub fn create_device(&mut self) -> Result<()> {
        self.step(Stage::DeviceReady, |s| {
            let physical = s
                .driver
                .enumerate_physical_devices(s.instance)
                .context(DeviceCallSnafu { call: "vkEnumeratePhysicalDevices" })?;
            ensure!(!physical.is_empty(), NoPhysicalDeviceSnafu);

            let candidates: Vec<_> =
                physical.iter().map(|&device| (device, s.driver.queue_family_properties(device))).collect();
            let selection = select_compute_queue(&candidates).context(NoComputeQueueSnafu)?;
            tracing::debug!(physical = %selection.physical, family = selection.family, "selected compute queue");

            let device = s
                .driver
                .create_device(selection.physical, selection.family)
                .context(DeviceCallSnafu { call: "vkCreateDevice" })?;
            s.arena.push(Resource::Device(device));
            s.device = device;
            s.selection = Some(selection);

            let footprint = s.footprint;
            s.memory_type = s
                .driver
                .memory_properties(selection.physical)
                .host_coherent_type(footprint)
                .context(NoSuitableMemoryTypeSnafu { footprint })?;
            tracing::debug!(memory_type = s.memory_type, footprint, "selected memory type");
            Ok(())
        })
    }

    /// Creates one buffer and memory block per resource and uploads its host data.
    pub fn allocate_buffers(&mut self) -> Result<()> {
        self.step(Stage::BuffersAllocated, |s| {
            let (device, family) = (s.device, s.queue_family());
            for key in s.bindings.keys().collect::<Vec<_>>() {
                let descriptor_type = s.bindings.descriptor_type(key)?;
                let data = s.bindings.data(key).unwrap_or_default();
                let size = data.len() as u64;

                let memory = s
                    .driver
                    .allocate_memory(device, size, s.memory_type)
                    .context(DeviceCallSnafu { call: "vkAllocateMemory" })?;
                s.arena.push(Resource::Memory(memory));
                s.driver.write_memory(device, memory, data).context(DeviceCallSnafu { call: "vkMapMemory" })?;

                let buffer = s
                    .driver
                    .create_buffer(device, size, descriptor_type.buffer_usage(), family)
                    .context(DeviceCallSnafu { call: "vkCreateBuffer" })?;
                s.arena.push(Resource::Buffer(buffer));
                s.driver
                    .bind_buffer_memory(device, buffer, memory)
                    .context(DeviceCallSnafu { call: "vkBindBufferMemory" })?;

                tracing::debug!(%key, size, %descriptor_type, "uploaded resource");
                s.buffers.insert(key, DeviceBuffer { memory, buffer, descriptor_type });
            }
            Ok(())
        })
    }

    pub fn load_shader(&mut self) -> Result<()> {
        self.step(Stage::ShaderLoaded, |s| {
            let module = s
                .driver
                .create_shader_module(s.device, &s.shader)
                .context(DeviceCallSnafu { call: "vkCreateShaderModule" })?;
            s.arena.push(Resource::ShaderModule(module));
            s.shader_module = module;
            Ok(())
        })
    }

    /// One descriptor set layout per set, then the pipeline layout over all of them.
    pub fn build_layouts(&mut self) -> Result<()> {
        self.step(Stage::LayoutsBuilt, |s| {
            for set in s.bindings.sets().collect::<Vec<_>>() {
                let bindings: Vec<_> = s
                    .buffers
                    .iter()
                    .filter(|(key, _)| key.set == set)
                    .map(|(key, buffer)| LayoutBinding {
                        binding: key.binding,
                        descriptor_type: buffer.descriptor_type,
                        count: 1,
                    })
                    .collect();
                let layout = s
                    .driver
                    .create_descriptor_set_layout(s.device, &bindings)
                    .context(DeviceCallSnafu { call: "vkCreateDescriptorSetLayout" })?;
                s.arena.push(Resource::SetLayout(layout));
                s.set_layouts.push((set, layout));
            }

            let layouts: Vec<_> = s.set_layouts.iter().map(|&(_, layout)| layout).collect();
            let pipeline_layout = s
                .driver
                .create_pipeline_layout(s.device, &layouts)
                .context(DeviceCallSnafu { call: "vkCreatePipelineLayout" })?;
            s.arena.push(Resource::PipelineLayout(pipeline_layout));
            s.pipeline_layout = pipeline_layout;
            Ok(())
        })
    }

    pub fn create_pipeline(&mut self) -> Result<()> {
        self.step(Stage::PipelineReady, |s| {
            let pipeline = s
                .driver
                .create_compute_pipeline(s.device, s.pipeline_layout, s.shader_module, &s.config.entry_point)
                .context(DeviceCallSnafu { call: "vkCreateComputePipelines" })?;
            s.arena.push(Resource::Pipeline(pipeline));
            s.pipeline = pipeline;
            Ok(())
        })
    }

    /// Allocates one descriptor set per layout and points every binding at its buffer.
    pub fn bind_descriptors(&mut self) -> Result<()> {
        self.step(Stage::DescriptorsBound, |s| {
            let device = s.device;
            let sizes = descriptor_pool_sizes(s.buffers.values().map(|buffer| buffer.descriptor_type));
            let max_sets = s.set_layouts.len() as u32;
            let pool = s
                .driver
                .create_descriptor_pool(device, max_sets, &sizes)
                .context(DeviceCallSnafu { call: "vkCreateDescriptorPool" })?;
            s.arena.push(Resource::DescriptorPool(pool));

            let layouts: Vec<_> = s.set_layouts.iter().map(|&(_, layout)| layout).collect();
            let sets = s
                .driver
                .allocate_descriptor_sets(device, pool, &layouts)
                .context(DeviceCallSnafu { call: "vkAllocateDescriptorSets" })?;
            s.arena.push(Resource::DescriptorSets { pool, sets: sets.clone() });
            ensure!(sets.len() == layouts.len(), DescriptorSetMismatchSnafu { expected: layouts.len(), actual: sets.len() });

            let writes: Vec<_> = s
                .set_layouts
                .iter()
                .zip(&sets)
                .flat_map(|(&(index, _), &set)| {
                    s.buffers.range(BindingKey::new(index, 0)..=BindingKey::new(index, u32::MAX)).map(
                        move |(key, buffer)| BufferWrite {
                            set,
                            binding: key.binding,
                            descriptor_type: buffer.descriptor_type,
                            buffer: buffer.buffer,
                        },
                    )
                })
                .collect();
            s.driver.update_descriptor_sets(device, &writes);
            s.descriptor_sets = sets;
            Ok(())
        })
    }

    /// Records the single command buffer: bind, optional timestamps around the dispatch.
    pub fn record_commands(&mut self) -> Result<()> {
        self.step(Stage::CommandsRecorded, |s| {
            let (device, family) = (s.device, s.queue_family());
            let pool =
                s.driver.create_command_pool(device, family).context(DeviceCallSnafu { call: "vkCreateCommandPool" })?;
            s.arena.push(Resource::CommandPool(pool));
            s.command_pool = pool;

            if let Some(selection) = s.selection.filter(|selection| selection.properties.supports_timestamps()) {
                s.timestamp_period = s.driver.device_properties(selection.physical).timestamp_period;
                let query_pool = s
                    .driver
                    .create_query_pool(device, TIMESTAMP_QUERIES)
                    .context(DeviceCallSnafu { call: "vkCreateQueryPool" })?;
                s.arena.push(Resource::QueryPool(query_pool));
                s.query_pool = Some(query_pool);
            }

            let buffer = s
                .driver
                .allocate_command_buffer(device, pool)
                .context(DeviceCallSnafu { call: "vkAllocateCommandBuffers" })?;
            s.arena.push(Resource::CommandBuffer { pool, buffer });
            s.command_buffer = buffer;

            s.driver.begin_command_buffer(device, buffer).context(DeviceCallSnafu { call: "vkBeginCommandBuffer" })?;
            if let Some(query_pool) = s.query_pool {
                s.driver.cmd_reset_query_pool(device, buffer, query_pool, 0, TIMESTAMP_QUERIES);
            }
            s.driver.cmd_bind_pipeline(device, buffer, s.pipeline);
            s.driver.cmd_bind_descriptor_sets(device, buffer, s.pipeline_layout, &s.descriptor_sets);
            if let Some(query_pool) = s.query_pool {
                s.driver.cmd_write_timestamp(device, buffer, PipelineStage::ComputeShader, query_pool, 0);
            }
            s.driver.cmd_dispatch(device, buffer, s.config.work_groups.as_array());
            if let Some(query_pool) = s.query_pool {
                s.driver.cmd_write_timestamp(device, buffer, PipelineStage::BottomOfPipe, query_pool, 1);
            }
            s.driver.end_command_buffer(device, buffer).context(DeviceCallSnafu { call: "vkEndCommandBuffer" })?;
            tracing::debug!(work_groups = %s.config.work_groups, timestamps = s.query_pool.is_some(), "recorded dispatch");
            Ok(())
        })
    }

    pub fn submit(&mut self) -> Result<()> {
        self.step(Stage::Submitted, |s| {
            let (device, family) = (s.device, s.queue_family());
            s.queue = s.driver.get_device_queue(device, family, 0);

            let start = Instant::now();
            s.driver.queue_submit(device, s.queue, &[s.command_buffer]).context(DeviceCallSnafu { call: "vkQueueSubmit" })?;
            s.timings.submit = start.elapsed();
            s.submitted_at = Some(Instant::now());
            Ok(())
        })
    }

    /// Blocks until the queue drains, then reads the device timestamps if any.
    pub fn wait_idle(&mut self) -> Result<()> {
        self.step(Stage::Idle, |s| {
            let device = s.device;
            let start = s.submitted_at.unwrap_or_else(Instant::now);
            s.driver.queue_wait_idle(device, s.queue).context(DeviceCallSnafu { call: "vkQueueWaitIdle" })?;
            s.timings.wait_idle = start.elapsed();

            if let Some(query_pool) = s.query_pool {
                let ticks = s
                    .driver
                    .query_timestamps(device, query_pool, TIMESTAMP_QUERIES)
                    .context(DeviceCallSnafu { call: "vkGetQueryPoolResults" })?;
                if let [begin, end] = ticks[..] {
                    s.timings.shader = Some(Timings::ticks_to_duration(begin, end, s.timestamp_period));
                }
            }

            let timings = s.timings;
            tracing::info!(
                submit_us = timings.submit.as_micros() as u64,
                wait_idle_us = timings.wait_idle.as_micros() as u64,
                shader_us = timings.shader.map(|shader| shader.as_secs_f64() * 1e6),
                "dispatch finished"
            );
            Ok(())
        })
    }

    /// Copies every device buffer back into the host slice it was uploaded from.
    pub fn read_back(&mut self) -> Result<()> {
        self.step(Stage::ReadBack, |s| {
            let device = s.device;
            for (key, buffer) in &s.buffers {
                let Some(out) = s.bindings.data_mut(*key) else { continue };
                s.driver.read_memory(device, buffer.memory, out).context(DeviceCallSnafu { call: "vkMapMemory" })?;
            }
            tracing::debug!(bytes = s.footprint, "read back resources");
            Ok(())
        })
    }

    /// Waits for the device to go idle, then releases every acquired object in
    /// reverse acquisition order. Valid from any stage.
    ///
    /// A failed idle wait aborts teardown with nothing released, and dropping
    /// the session afterwards leaks the objects instead of waiting again.
    pub fn destroy(&mut self) -> Result<()> {
        if self.stage == Stage::Destroyed {
            return Ok(());
        }
        if let Some(device) = self.arena.device() {
            if let Err(err) = self.driver.device_wait_idle(device).context(DeviceCallSnafu { call: "vkDeviceWaitIdle" }) {
                self.teardown_failed = true;
                return Err(err);
            }
        }
        tracing::debug!(from = %self.stage, held = self.arena.len(), "tearing down session");
        self.arena.release(&mut self.driver);
        self.stage = Stage::Destroyed;
        Ok(())
    }
}

impl<D: Driver> Drop for Session<'_, D> {
    fn drop(&mut self) {
        if self.stage == Stage::Destroyed || self.arena.is_empty() {
            return;
        }
        if self.teardown_failed {
            tracing::warn!(stage = %self.stage, held = self.arena.len(), "idle wait failed earlier, device objects leaked");
            return;
        }
        tracing::warn!(stage = %self.stage, held = self.arena.len(), "session dropped without destroy");
        if let Err(err) = self.destroy() {
            tracing::warn!(%err, "teardown on drop failed, device objects leaked");
        }
    }
}
