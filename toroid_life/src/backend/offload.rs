//! GPU evolve/compare kernels.
//!
//! The device context, both shader modules and their compute pipelines are acquired
//! in [`OffloadBackend::new`] and live exactly as long as the backend; dropping
//! it (end of run, or an error path) releases them. Every dispatch runs inside
//! a validation error scope so device failures come back as
//! [`LifeError::Device`] instead of aborting the process.

use bytemuck::{Pod, Zeroable};
use tracing::{debug, error, info};
use wgpu::util::DeviceExt;

use super::{Backend, BackendKind, TILE};
use crate::error::{LifeError, Result};
use crate::grid::{Cell, Dimensions};

/// Uniform block shared by both kernels, padded to 16 bytes.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Params {
    width: u32,
    height: u32,
    _pad: [u32; 2],
}

struct GpuContext {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GpuContext {
    fn new() -> Result<Self> {
        pollster::block_on(Self::new_async())
    }

    async fn new_async() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or_else(|| LifeError::Device("no compute adapter found".into()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("toroid-life"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| LifeError::Device(format!("device request failed: {e}")))?;

        device.on_uncaptured_error(Box::new(|e| error!("uncaptured device error: {e}")));

        Ok(Self { adapter, device, queue })
    }

    fn scoped<T>(&self, operation: &str, f: impl FnOnce() -> T) -> Result<T> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f();
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(e) => Err(LifeError::Device(format!("{operation}: {e}"))),
            None => Ok(value),
        }
    }

    fn storage(&self, label: &str, contents: &[u32], writable: bool) -> wgpu::Buffer {
        let mut usage = wgpu::BufferUsages::STORAGE;
        if writable {
            usage |= wgpu::BufferUsages::COPY_SRC;
        }
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(contents),
            usage,
        })
    }

    /// Records a copy of `source` into a fresh mappable staging buffer.
    fn read_back(&self, encoder: &mut wgpu::CommandEncoder, source: &wgpu::Buffer) -> wgpu::Buffer {
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging_buffer"),
            size: source.size(),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        encoder.copy_buffer_to_buffer(source, 0, &staging, 0, source.size());
        staging
    }

    fn map_u32(&self, staging: &wgpu::Buffer) -> Result<Vec<u32>> {
        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| LifeError::Device(format!("map callback dropped: {e}")))?
            .map_err(|e| LifeError::Device(format!("buffer map failed: {e}")))?;

        let words = {
            let data = slice.get_mapped_range();
            data.chunks_exact(4)
                .map(|b| u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
                .collect()
        };
        staging.unmap();
        Ok(words)
    }
}

/// Data-parallel backend executing on a wgpu compute device.
///
/// Produces exactly the same `future` as the scalar backend. Only valid for
/// geometries whose sides are multiples of [`TILE`].
pub struct OffloadBackend {
    ctx: GpuContext,
    dims: Dimensions,
    params: wgpu::Buffer,
    evolve_layout: wgpu::BindGroupLayout,
    compare_layout: wgpu::BindGroupLayout,
    evolve_pipeline: wgpu::ComputePipeline,
    compare_pipeline: wgpu::ComputePipeline,
}

impl OffloadBackend {
    pub fn new(dims: Dimensions) -> Result<Self> {
        if !dims.divisible_by(TILE) {
            return Err(LifeError::Device(format!(
                "grid {}x{} is not a multiple of the {TILE}x{TILE} work-group",
                dims.height, dims.width
            )));
        }
        let ctx = GpuContext::new()?;
        info!(adapter = ?ctx.adapter.get_info().name, "offload device acquired");

        let (params, evolve_layout, compare_layout, evolve_pipeline, compare_pipeline) =
            ctx.scoped("pipeline setup", || {
                let device = &ctx.device;
                let evolve_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some("evolve_shader"),
                    source: wgpu::ShaderSource::Wgsl(EVOLVE_SHADER.into()),
                });
                let compare_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some("compare_shader"),
                    source: wgpu::ShaderSource::Wgsl(COMPARE_SHADER.into()),
                });

                let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("life_params"),
                    contents: bytemuck::cast_slice(&[Params {
                        width: dims.width as u32,
                        height: dims.height as u32,
                        _pad: [0; 2],
                    }]),
                    usage: wgpu::BufferUsages::UNIFORM,
                });

                let evolve_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("evolve_layout"),
                    entries: &[uniform_entry(0), storage_entry(1, true), storage_entry(2, false)],
                });
                let compare_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("compare_layout"),
                    entries: &[
                        uniform_entry(0),
                        storage_entry(1, true),
                        storage_entry(2, true),
                        storage_entry(3, true),
                        storage_entry(4, false),
                    ],
                });

                let evolve_pipeline = pipeline(device, &evolve_shader, &evolve_layout, "evolve");
                let compare_pipeline = pipeline(device, &compare_shader, &compare_layout, "compare");
                (params, evolve_layout, compare_layout, evolve_pipeline, compare_pipeline)
            })?;

        Ok(Self { ctx, dims, params, evolve_layout, compare_layout, evolve_pipeline, compare_pipeline })
    }

    fn workgroups(&self) -> (u32, u32) {
        ((self.dims.width / TILE) as u32, (self.dims.height / TILE) as u32)
    }

    fn dispatch(
        &self,
        label: &str,
        pipeline: &wgpu::ComputePipeline,
        bind_group: &wgpu::BindGroup,
        output: &wgpu::Buffer,
    ) -> Result<Vec<u32>> {
        let (groups_x, groups_y) = self.workgroups();
        let staging = self.ctx.scoped(label, || {
            let mut encoder = self
                .ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });
            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some(label),
                    timestamp_writes: None,
                });
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                pass.dispatch_workgroups(groups_x, groups_y, 1);
            }
            let staging = self.ctx.read_back(&mut encoder, output);
            self.ctx.queue.submit(Some(encoder.finish()));
            staging
        })?;
        self.ctx.map_u32(&staging)
    }
}

impl Backend for OffloadBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Offload
    }

    fn advance(&mut self, dims: Dimensions, present: &[Cell], future: &mut [Cell]) -> Result<()> {
        if dims != self.dims {
            return Err(LifeError::Device("grid geometry changed after device setup".into()));
        }
        let input = widen(present);
        let present_buf = self.ctx.storage("present", &input, false);
        let future_buf = self.ctx.storage("future", &vec![0; input.len()], true);

        let bind_group = self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("evolve_bind_group"),
            layout: &self.evolve_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: self.params.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: present_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: future_buf.as_entire_binding() },
            ],
        });

        let next = self.dispatch("evolve", &self.evolve_pipeline, &bind_group, &future_buf)?;
        for (dst, &src) in future.iter_mut().zip(&next) {
            *dst = src as Cell;
        }
        debug!(cells = next.len(), "offload evolve done");
        Ok(())
    }

    fn check_stable(&mut self, past: &[Cell], present: &[Cell], future: &[Cell]) -> Result<bool> {
        let past_buf = self.ctx.storage("past", &widen(past), false);
        let present_buf = self.ctx.storage("present", &widen(present), false);
        let future_buf = self.ctx.storage("future", &widen(future), false);
        // [0]: present differs from future, [1]: past differs from future
        let mismatch_buf = self.ctx.storage("mismatch", &[0, 0], true);

        let bind_group = self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("compare_bind_group"),
            layout: &self.compare_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: self.params.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: past_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: present_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: future_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 4, resource: mismatch_buf.as_entire_binding() },
            ],
        });

        let mismatch = self.dispatch("compare", &self.compare_pipeline, &bind_group, &mismatch_buf)?;
        Ok(mismatch.first() == Some(&0) || mismatch.get(1) == Some(&0))
    }
}

fn widen(cells: &[Cell]) -> Vec<u32> {
    cells.iter().map(|&c| c as u32).collect()
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::BindGroupLayout,
    entry_point: &str,
) -> wgpu::ComputePipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(entry_point),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(entry_point),
        layout: Some(&pipeline_layout),
        module: shader,
        entry_point: Some(entry_point),
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        cache: None,
    })
}

// Cells are widened to u32 on upload; WGSL storage has no 8-bit integers.
const EVOLVE_SHADER: &str = r#"
struct Params {
    width: u32,
    height: u32,
    pad0: u32,
    pad1: u32,
}

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> present: array<u32>;
@group(0) @binding(2) var<storage, read_write> future: array<u32>;

// Euclidean wrap: WGSL % truncates toward zero
fn wrap(v: i32, n: i32) -> i32 {
    return ((v % n) + n) % n;
}

fn cell(x: i32, y: i32) -> u32 {
    let w = i32(params.width);
    let h = i32(params.height);
    return present[u32(wrap(y, h) * w + wrap(x, w))];
}

@compute @workgroup_size(10, 10)
fn evolve(@builtin(global_invocation_id) id: vec3<u32>) {
    if (id.x >= params.width || id.y >= params.height) {
        return;
    }
    let x = i32(id.x);
    let y = i32(id.y);

    var n = 0u;
    for (var dy = -1; dy <= 1; dy++) {
        for (var dx = -1; dx <= 1; dx++) {
            if (dx == 0 && dy == 0) {
                continue;
            }
            n += cell(x + dx, y + dy);
        }
    }

    let idx = id.y * params.width + id.x;
    let alive = present[idx] == 1u;
    var next = 0u;
    if ((alive && (n == 2u || n == 3u)) || (!alive && n == 3u)) {
        next = 1u;
    }
    future[idx] = next;
}
"#;

const COMPARE_SHADER: &str = r#"
struct Params {
    width: u32,
    height: u32,
    pad0: u32,
    pad1: u32,
}

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read> past: array<u32>;
@group(0) @binding(2) var<storage, read> present: array<u32>;
@group(0) @binding(3) var<storage, read> future: array<u32>;
@group(0) @binding(4) var<storage, read_write> mismatch: array<atomic<u32>, 2>;

@compute @workgroup_size(10, 10)
fn compare(@builtin(global_invocation_id) id: vec3<u32>) {
    if (id.x >= params.width || id.y >= params.height) {
        return;
    }
    let idx = id.y * params.width + id.x;
    if (present[idx] != future[idx]) {
        atomicOr(&mismatch[0], 1u);
    }
    if (past[idx] != future[idx]) {
        atomicOr(&mismatch[1], 1u);
    }
}
"#;
