use std::sync::Arc;

use log::{debug, info, warn};
use pollster::block_on;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use super::Presenter;
use crate::buffer::FrameView;
use crate::error::{RenderError, Result};

/// Presents frames onto a winit window through wgpu.
///
/// The pixel plane is uploaded into a staging texture whose texel layout
/// matches `0x00RRGGBB` on little-endian hosts (`Bgra8Unorm`) and drawn to the
/// window with a single full-screen triangle.
pub struct WgpuPresenter {
    vsync: bool,
    binding: Option<Binding>,
}

/// Everything acquired by one bind. Fields drop top to bottom, the reverse of
/// acquisition order: pipeline objects, staging texture, device, surface.
struct Binding {
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    staging: wgpu::Texture,
    config: wgpu::SurfaceConfiguration,
    queue: wgpu::Queue,
    device: wgpu::Device,
    surface: wgpu::Surface<'static>,
    window_id: WindowId,
    width: u32,
    height: u32,
}

impl WgpuPresenter {
    pub fn new(vsync: bool) -> Self {
        Self {
            vsync,
            binding: None,
        }
    }

    fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

impl Default for WgpuPresenter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Presenter for WgpuPresenter {
    type Window = Arc<Window>;

    fn bind(&mut self, window: &Arc<Window>, width: u32, height: u32) -> Result<()> {
        if self.binding.is_some() {
            return Err(RenderError::invalid_state("bind a surface", "already bound"));
        }
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidGeometry { width, height });
        }
        let binding = Binding::acquire(window, width, height, self.present_mode())?;
        info!(
            "bound {width}x{height} frame to window {:?} ({:?})",
            binding.window_id, binding.config.format
        );
        self.binding = Some(binding);
        Ok(())
    }

    fn present(&mut self, window: &Arc<Window>, frame: FrameView<'_>) -> Result<()> {
        let binding = self
            .binding
            .as_mut()
            .ok_or_else(|| RenderError::invalid_state("present", "unbound"))?;
        if frame.size() != (binding.width, binding.height) {
            return Err(RenderError::FrameSizeMismatch {
                expected: (binding.width, binding.height),
                actual: frame.size(),
            });
        }
        if window.id() != binding.window_id {
            return Err(RenderError::Present(format!(
                "surface is bound to window {:?}, not {:?}",
                binding.window_id,
                window.id()
            )));
        }
        binding.present(window, frame)
    }

    fn unbind(&mut self) {
        if let Some(binding) = self.binding.take() {
            debug!("releasing surface for window {:?}", binding.window_id);
            drop(binding);
        }
    }

    fn is_bound(&self) -> bool {
        self.binding.is_some()
    }
}

impl Binding {
    fn acquire(
        window: &Arc<Window>,
        width: u32,
        height: u32,
        present_mode: wgpu::PresentMode,
    ) -> Result<Self> {
        let size = window.inner_size();
        if !has_area(size) {
            return Err(RenderError::Surface("window has zero area".into()));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(Arc::clone(window))
            .map_err(|err| RenderError::Surface(format!("surface creation failed: {err}")))?;
        debug!("acquired window surface");

        let adapter = block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| RenderError::Surface(format!("no compatible GPU adapter: {err}")))?;

        let (device, queue) = block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("softrender-device"),
            ..Default::default()
        }))
        .map_err(|err| RenderError::Surface(format!("failed to create GPU device: {err}")))?;
        debug!("acquired device on {}", adapter.get_info().name);

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats)
            .ok_or_else(|| RenderError::Surface("surface reports no formats".into()))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            desired_maximum_frame_latency: 2,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let staging = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("frame-staging"),
            size: frame_extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: staging_format(format),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        debug!("acquired {width}x{height} staging texture");

        let (pipeline, bind_group) = create_blit(&device, &staging, format);

        Ok(Self {
            bind_group,
            pipeline,
            staging,
            config,
            queue,
            device,
            surface,
            window_id: window.id(),
            width,
            height,
        })
    }

    fn present(&mut self, window: &Window, frame: FrameView<'_>) -> Result<()> {
        let size = window.inner_size();
        if !has_area(size) {
            debug!("window {:?} is minimized; skipping frame", self.window_id);
            return Ok(());
        }
        if size.width != self.config.width || size.height != self.config.height {
            self.config.width = size.width;
            self.config.height = size.height;
            self.surface.configure(&self.device, &self.config);
        }

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.staging,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(frame.pixels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * frame.width),
                rows_per_image: Some(frame.height),
            },
            frame_extent(frame.width, frame.height),
        );

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                warn!("surface lost; reconfigured, frame dropped");
                return Err(RenderError::Present("surface was lost".into()));
            }
            Err(err) => return Err(RenderError::Present(err.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("present-encoder"),
            });
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("present-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
        drop(pass);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Minimized windows report a zero inner size on some platforms.
fn has_area(size: PhysicalSize<u32>) -> bool {
    size.width > 0 && size.height > 0
}

fn frame_extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

/// Prefers a linear 8-bit format so packed colors reach the screen unchanged.
fn choose_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    let preferred = [
        wgpu::TextureFormat::Bgra8Unorm,
        wgpu::TextureFormat::Rgba8Unorm,
    ];
    preferred
        .into_iter()
        .find(|format| formats.contains(format))
        .or_else(|| formats.iter().copied().find(|format| !format.is_srgb()))
        .or_else(|| formats.first().copied())
}

/// An sRGB surface re-encodes on write, so sample through the matching sRGB
/// view to cancel it out.
fn staging_format(surface: wgpu::TextureFormat) -> wgpu::TextureFormat {
    if surface.is_srgb() {
        wgpu::TextureFormat::Bgra8UnormSrgb
    } else {
        wgpu::TextureFormat::Bgra8Unorm
    }
}

fn create_blit(
    device: &wgpu::Device,
    staging: &wgpu::Texture,
    target: wgpu::TextureFormat,
) -> (wgpu::RenderPipeline, wgpu::BindGroup) {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("blit-shader"),
        source: wgpu::ShaderSource::Wgsl(BLIT_SHADER.into()),
    });

    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("blit-bind-layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let view = staging.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("blit-sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("blit-bind-group"),
        layout: &layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("blit-pipeline-layout"),
        bind_group_layouts: &[&layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("blit-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: target,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
        cache: None,
    });

    (pipeline, bind_group)
}

// The top byte of each pixel is unused, so alpha is forced to one.
const BLIT_SHADER: &str = r#"
@group(0) @binding(0)
var frame: texture_2d<f32>;

@group(0) @binding(1)
var frame_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    var out: VertexOutput;
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    out.position = vec4<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(frame, frame_sampler, input.uv).rgb, 1.0);
}
"#;
