//! Shader loading and render pipeline construction.
//!
//! The vertex and pixel programs are separate WGSL modules. Both are compiled,
//! validated and linked into a single render pipeline once, at initialization.
//! A compilation or validation failure is fatal; there is no fallback program.

use std::borrow::Cow;

use wgpu::*;

use crate::error::{RenderError, Result};
use crate::gfx::device::GraphicsDevice;
use crate::wgpu_utils::uniform_entry;

/// One shader program: WGSL source plus the entry point to run.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub label: Cow<'static, str>,
    pub source: Cow<'static, str>,
    pub entry_point: Cow<'static, str>,
}

impl ShaderProgram {
    pub fn wgsl(
        label: impl Into<Cow<'static, str>>,
        source: impl Into<Cow<'static, str>>,
        entry_point: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
            entry_point: entry_point.into(),
        }
    }
}

/// The vertex/pixel program pair consumed at initialization.
#[derive(Debug, Clone)]
pub struct ShaderAssets {
    pub vertex: ShaderProgram,
    pub pixel: ShaderProgram,
}

impl ShaderAssets {
    pub fn orbit_cube() -> Self {
        Self {
            vertex: ShaderProgram::wgsl(
                "orbit_cube.vs",
                include_str!("shaders/orbit_cube.vs.wgsl"),
                "vs_main",
            ),
            pixel: ShaderProgram::wgsl(
                "orbit_cube.fs",
                include_str!("shaders/orbit_cube.fs.wgsl"),
                "fs_main",
            ),
        }
    }

    pub fn mini_cube() -> Self {
        Self {
            vertex: ShaderProgram::wgsl(
                "mini_cube.vs",
                include_str!("shaders/mini_cube.vs.wgsl"),
                "vs_main",
            ),
            pixel: ShaderProgram::wgsl(
                "mini_cube.fs",
                include_str!("shaders/mini_cube.fs.wgsl"),
                "fs_main",
            ),
        }
    }
}

/// Render state for the cube pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub color_format: TextureFormat,
    pub depth_format: Option<TextureFormat>,
    pub front_face: FrontFace,
    pub cull_mode: Option<Face>,
    pub blend: Option<BlendState>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Cube Pipeline".to_string(),
            color_format: TextureFormat::Bgra8Unorm,
            depth_format: None,
            // Cube meshes are wound clockwise for a left-handed view space.
            front_face: FrontFace::Cw,
            cull_mode: Some(Face::Back),
            blend: Some(BlendState::REPLACE),
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.color_format = format;
        self
    }

    /// Enables depth testing against a buffer of `format`.
    pub fn with_depth_format(mut self, format: Option<TextureFormat>) -> Self {
        self.depth_format = format;
        self
    }
}

/// Compiled programs, uniform layout and the render pipeline linking them.
pub struct ShaderPipeline {
    pipeline: RenderPipeline,
    transform_layout: BindGroupLayout,
    pixel_module: ShaderModule,
    vertex_module: ShaderModule,
    config: PipelineConfig,
}

impl ShaderPipeline {
    /// Compiles both programs and builds the pipeline for `vertex_layout`.
    ///
    /// # Errors
    /// [`RenderError::ShaderBuild`] if either program fails to compile or the
    /// pipeline fails validation (for example an input layout that does not
    /// match the vertex program's inputs).
    pub fn load(
        gpu: &GraphicsDevice,
        assets: &ShaderAssets,
        config: PipelineConfig,
        vertex_layout: VertexBufferLayout<'static>,
    ) -> Result<Self> {
        let vertex_module = Self::compile(gpu, &assets.vertex)?;
        let pixel_module = Self::compile(gpu, &assets.pixel)?;
        let device = gpu.device();

        let transform_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Transform Bind Group Layout"),
            entries: &[uniform_entry(0, ShaderStages::VERTEX)],
        });

        let (pipeline, error) = gpu.capture_errors(|| {
            let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(&format!("{} Layout", config.label)),
                bind_group_layouts: &[&transform_layout],
                push_constant_ranges: &[],
            });

            let depth_stencil = config.depth_format.map(|format| DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            });

            device.create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(&config.label),
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: &vertex_module,
                    entry_point: Some(&*assets.vertex.entry_point),
                    buffers: &[vertex_layout],
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment: Some(FragmentState {
                    module: &pixel_module,
                    entry_point: Some(&*assets.pixel.entry_point),
                    targets: &[Some(ColorTargetState {
                        format: config.color_format,
                        blend: config.blend,
                        write_mask: ColorWrites::ALL,
                    })],
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                primitive: PrimitiveState {
                    topology: PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: config.front_face,
                    cull_mode: config.cull_mode,
                    polygon_mode: PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        });

        if let Some(error) = error {
            return Err(RenderError::ShaderBuild {
                label: config.label.clone(),
                message: error.to_string(),
            });
        }

        log::debug!(
            "built pipeline '{}' from {} + {} (depth: {:?})",
            config.label,
            assets.vertex.label,
            assets.pixel.label,
            config.depth_format
        );

        Ok(Self {
            pipeline,
            transform_layout,
            pixel_module,
            vertex_module,
            config,
        })
    }

    fn compile(gpu: &GraphicsDevice, program: &ShaderProgram) -> Result<ShaderModule> {
        let (module, error) = gpu.capture_errors(|| {
            gpu.device().create_shader_module(ShaderModuleDescriptor {
                label: Some(&*program.label),
                source: ShaderSource::Wgsl(program.source.clone()),
            })
        });

        match error {
            Some(error) => Err(RenderError::ShaderBuild {
                label: program.label.to_string(),
                message: error.to_string(),
            }),
            None => Ok(module),
        }
    }

    /// Binds the pipeline for the pass. Called once per frame's render pass.
    pub fn bind(&self, pass: &mut RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
    }

    /// Layout of the transform uniform at group 0.
    pub fn transform_layout(&self) -> &BindGroupLayout {
        &self.transform_layout
    }

    pub fn release(self) {
        let Self {
            pipeline,
            transform_layout,
            pixel_module,
            vertex_module,
            config,
        } = self;
        drop(pipeline);
        drop(transform_layout);
        drop(pixel_module);
        drop(vertex_module);
        log::debug!("released pipeline '{}'", config.label);
    }
}
