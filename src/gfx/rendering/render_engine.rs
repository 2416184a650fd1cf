//! Frame rendering into the host's shared surface.
//!
//! Two cube engines share one frame loop, [`CubeEngine`], and differ only in
//! the data supplied by their [`CubeVariant`]:
//!
//! - [`OrbitCube`]: indexed 8-vertex cube seen through a fixed scene view,
//!   with the orbit camera's view-projection applied on top
//! - [`MiniCube`]: 36 face-colored vertices, fixed camera, one combined matrix
//!
//! Hosts drive either through the object-safe [`RenderEngine`] trait.

use std::marker::PhantomData;
use std::time::Instant;

use cgmath::{Matrix4, Vector3, Zero};

use crate::config::{EngineConfig, EngineVariant};
use crate::error::Result;
use crate::gfx::camera::camera_utils::convert_matrix4_to_array;
use crate::gfx::camera::{look_at_lh, OrbitCamera, ProjectionParams};
use crate::gfx::device::GraphicsDevice;
use crate::gfx::geometry::{generate_face_colored_cube, generate_indexed_cube, CubeMesh};
use crate::gfx::resources::{
    DepthTarget, GeometryBuffers, SharedSurfaceHandle, SharedSurfaceOpener, SurfaceBinder,
};

use super::animation::SpinProfile;
use super::frame_state::{FrameSnapshot, FrameState, ViewSource};
use super::shader_pipeline::{PipelineConfig, ShaderAssets, ShaderPipeline};
use super::vertex::{ColorVertex, HomogeneousColorVertex};

/// A cube renderer bound to one device for the lifetime of a session.
pub trait RenderEngine {
    fn variant(&self) -> EngineVariant;

    /// Renders one frame into the bound surface.
    ///
    /// With `is_new_surface` the target is first rebound to `handle`;
    /// otherwise `handle` is ignored and the previously bound surface is used.
    fn render(
        &mut self,
        handle: SharedSurfaceHandle,
        is_new_surface: bool,
    ) -> Result<FrameSnapshot>;

    /// The orbit camera, or `None` for engines with a fixed view.
    fn camera(&self) -> Option<&OrbitCamera>;

    fn camera_mut(&mut self) -> Option<&mut OrbitCamera>;

    fn last_frame(&self) -> Option<&FrameSnapshot>;

    /// Full constant buffer uploads so far; one per rendered frame.
    fn constant_writes(&self) -> u64;

    fn surface(&self) -> &SurfaceBinder;

    fn gpu(&self) -> &GraphicsDevice;

    /// Waits for the GPU, then releases every resource in reverse acquisition order.
    fn shutdown(self: Box<Self>);
}

/// Three matrices applied in order by the vertex program:
/// `projection * view * world`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub world: [[f32; 4]; 4],
    /// Fixed scene view.
    pub view: [[f32; 4]; 4],
    /// Camera view-projection.
    pub projection: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn from_frame(frame: &FrameSnapshot, scene_view: Matrix4<f32>) -> Self {
        Self {
            world: convert_matrix4_to_array(frame.world),
            view: convert_matrix4_to_array(scene_view),
            projection: convert_matrix4_to_array(frame.view_projection()),
        }
    }
}

/// Premultiplied `projection * view * world`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CombinedTransformUniform {
    pub world_view_projection: [[f32; 4]; 4],
}

impl CombinedTransformUniform {
    pub fn from_frame(frame: &FrameSnapshot) -> Self {
        Self {
            world_view_projection: convert_matrix4_to_array(frame.world_view_projection()),
        }
    }
}

/// Static description of one cube engine.
pub trait CubeVariant: 'static {
    const VARIANT: EngineVariant;
    const LABEL: &'static str;

    type Vertex: bytemuck::Pod;
    type Uniform: bytemuck::Pod;

    fn mesh() -> CubeMesh<Self::Vertex>;
    fn vertex_layout() -> wgpu::VertexBufferLayout<'static>;
    fn shader_assets() -> ShaderAssets;
    fn projection_params() -> ProjectionParams;
    fn spin() -> SpinProfile;
    fn view_source() -> ViewSource;
    fn clear_color() -> wgpu::Color;
    fn uniform(frame: &FrameSnapshot) -> Self::Uniform;
}

pub struct OrbitCube;

impl OrbitCube {
    pub const SCENE_EYE: Vector3<f32> = Vector3::new(0.0, 1.0, -5.0);
    pub const SCENE_TARGET: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

    /// View of the scene before the orbit camera is applied.
    pub fn scene_view() -> Matrix4<f32> {
        look_at_lh(Self::SCENE_EYE, Self::SCENE_TARGET, Vector3::unit_y())
    }
}

impl CubeVariant for OrbitCube {
    const VARIANT: EngineVariant = EngineVariant::Orbit;
    const LABEL: &'static str = "Orbit Cube";

    type Vertex = ColorVertex;
    type Uniform = TransformUniform;

    fn mesh() -> CubeMesh<ColorVertex> {
        generate_indexed_cube()
    }

    fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        ColorVertex::desc()
    }

    fn shader_assets() -> ShaderAssets {
        ShaderAssets::orbit_cube()
    }

    fn projection_params() -> ProjectionParams {
        ProjectionParams::ORBIT
    }

    fn spin() -> SpinProfile {
        SpinProfile::TwoAxis
    }

    fn view_source() -> ViewSource {
        ViewSource::Orbit(OrbitCamera::new())
    }

    fn clear_color() -> wgpu::Color {
        wgpu::Color::TRANSPARENT
    }

    fn uniform(frame: &FrameSnapshot) -> TransformUniform {
        TransformUniform::from_frame(frame, Self::scene_view())
    }
}

pub struct MiniCube;

impl MiniCube {
    pub const EYE: Vector3<f32> = Vector3::new(0.0, 0.0, -5.0);
}

impl CubeVariant for MiniCube {
    const VARIANT: EngineVariant = EngineVariant::Mini;
    const LABEL: &'static str = "Mini Cube";

    type Vertex = HomogeneousColorVertex;
    type Uniform = CombinedTransformUniform;

    fn mesh() -> CubeMesh<HomogeneousColorVertex> {
        generate_face_colored_cube()
    }

    fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        HomogeneousColorVertex::desc()
    }

    fn shader_assets() -> ShaderAssets {
        ShaderAssets::mini_cube()
    }

    fn projection_params() -> ProjectionParams {
        ProjectionParams::MINI
    }

    fn spin() -> SpinProfile {
        SpinProfile::ThreeAxis
    }

    fn view_source() -> ViewSource {
        ViewSource::fixed_look_at(Self::EYE, Vector3::zero())
    }

    fn clear_color() -> wgpu::Color {
        wgpu::Color::BLUE
    }

    fn uniform(frame: &FrameSnapshot) -> CombinedTransformUniform {
        CombinedTransformUniform::from_frame(frame)
    }
}

/// The frame loop shared by both variants.
pub struct CubeEngine<V: CubeVariant> {
    gpu: GraphicsDevice,
    pipeline: ShaderPipeline,
    geometry: GeometryBuffers<V::Uniform>,
    surface: SurfaceBinder,
    frame: FrameState,
    opener: Box<dyn SharedSurfaceOpener>,
    clear_color: wgpu::Color,
    wait_for_gpu: bool,
    variant: PhantomData<V>,
}

impl<V: CubeVariant> CubeEngine<V> {
    /// Negotiates a device, builds the pipeline and uploads the cube.
    ///
    /// No surface is bound yet; the first render must pass `is_new_surface`.
    pub fn new(config: &EngineConfig, opener: Box<dyn SharedSurfaceOpener>) -> Result<Self> {
        let gpu = GraphicsDevice::initialize(config)?;
        let depth_format = config.depth_buffer.then_some(DepthTarget::DEPTH_FORMAT);

        let pipeline_config = PipelineConfig::default()
            .with_label(V::LABEL)
            .with_color_format(config.color_format)
            .with_depth_format(depth_format);
        let pipeline = match ShaderPipeline::load(
            &gpu,
            &V::shader_assets(),
            pipeline_config,
            V::vertex_layout(),
        ) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                gpu.release();
                return Err(e);
            }
        };

        let geometry =
            GeometryBuffers::create(gpu.device(), &V::mesh(), pipeline.transform_layout());
        let surface = SurfaceBinder::new(
            V::projection_params(),
            config.color_format,
            depth_format,
        );

        log::info!(
            "{} engine ready ({:?} targets)",
            V::LABEL,
            config.color_format
        );

        Ok(Self {
            gpu,
            pipeline,
            geometry,
            surface,
            frame: FrameState::new(V::spin(), V::view_source()),
            opener,
            clear_color: config.clear_color.unwrap_or_else(V::clear_color),
            wait_for_gpu: config.wait_for_gpu,
            variant: PhantomData,
        })
    }
}

impl<V: CubeVariant> RenderEngine for CubeEngine<V> {
    fn variant(&self) -> EngineVariant {
        V::VARIANT
    }

    fn render(
        &mut self,
        handle: SharedSurfaceHandle,
        is_new_surface: bool,
    ) -> Result<FrameSnapshot> {
        if is_new_surface {
            self.surface.bind(self.gpu.device(), &*self.opener, handle)?;
        }

        let target = self.surface.target()?;
        let projection = self.surface.projection();
        let snapshot = self.frame.advance(Instant::now(), projection);
        let uniform = V::uniform(&snapshot);
        let viewport = self.surface.viewport();

        let gpu = &self.gpu;
        let pipeline = &self.pipeline;
        let geometry = &mut self.geometry;
        let clear_color = self.clear_color;

        let (command_buffer, error) = gpu.capture_errors(|| {
            geometry.update_constants(gpu.queue(), &uniform);

            let mut encoder = gpu
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Cube Frame Encoder"),
                });

            {
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Cube Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target.view(),
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(clear_color),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: target.depth().map(DepthTarget::attachment),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

                viewport.apply(&mut render_pass);
                pipeline.bind(&mut render_pass);
                geometry.draw(&mut render_pass);
            }

            encoder.finish()
        });

        if let Some(error) = error {
            return Err(error.into());
        }

        self.gpu.flush(command_buffer, self.wait_for_gpu)?;

        log::trace!(
            "frame {} at {:.3}s into surface {}",
            snapshot.index,
            snapshot.elapsed,
            target.handle()
        );
        Ok(snapshot)
    }

    fn camera(&self) -> Option<&OrbitCamera> {
        self.frame.camera()
    }

    fn camera_mut(&mut self) -> Option<&mut OrbitCamera> {
        self.frame.camera_mut()
    }

    fn last_frame(&self) -> Option<&FrameSnapshot> {
        self.frame.last_frame()
    }

    fn constant_writes(&self) -> u64 {
        self.geometry.constant_writes()
    }

    fn surface(&self) -> &SurfaceBinder {
        &self.surface
    }

    fn gpu(&self) -> &GraphicsDevice {
        &self.gpu
    }

    fn shutdown(self: Box<Self>) {
        let Self {
            gpu,
            pipeline,
            geometry,
            surface,
            frame,
            opener,
            ..
        } = *self;

        if let Err(e) = gpu.wait_idle() {
            log::warn!("GPU did not go idle before shutdown: {}", e);
        }

        let frames = frame.frame_count();
        drop(opener);
        surface.release();
        geometry.release();
        pipeline.release();
        gpu.release();

        log::info!("{} engine shut down after {} frames", V::LABEL, frames);
    }
}

/// Builds the engine selected by `config.variant`.
pub fn create_engine(
    config: &EngineConfig,
    opener: Box<dyn SharedSurfaceOpener>,
) -> Result<Box<dyn RenderEngine>> {
    Ok(match config.variant {
        EngineVariant::Orbit => Box::new(CubeEngine::<OrbitCube>::new(config, opener)?),
        EngineVariant::Mini => Box::new(CubeEngine::<MiniCube>::new(config, opener)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};

    fn snapshot() -> FrameSnapshot {
        FrameSnapshot {
            index: 3,
            elapsed: 0.5,
            world: SpinProfile::TwoAxis.world_at(0.5),
            view: Matrix4::from_translation(Vector3::new(0.0, 0.0, 4.0)),
            projection: ProjectionParams::ORBIT.matrix(800, 600),
        }
    }

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<TransformUniform>(), 192);
        assert_eq!(std::mem::size_of::<CombinedTransformUniform>(), 64);
    }

    #[test]
    fn test_orbit_uniform_layers_scene_view_under_camera() {
        let frame = snapshot();
        let uniform = TransformUniform::from_frame(&frame, OrbitCube::scene_view());
        assert_eq!(uniform.world, convert_matrix4_to_array(frame.world));
        assert_eq!(
            uniform.view,
            convert_matrix4_to_array(OrbitCube::scene_view())
        );
        assert_eq!(
            uniform.projection,
            convert_matrix4_to_array(frame.projection * frame.view)
        );
    }

    #[test]
    fn test_default_orbit_camera_frames_the_cube() {
        let mut camera = OrbitCamera::new();
        camera.update();
        let frame = FrameSnapshot {
            index: 0,
            elapsed: 0.0,
            world: Matrix4::identity(),
            view: camera.view(),
            projection: ProjectionParams::ORBIT.matrix(800, 600),
        };

        let uniform = OrbitCube::uniform(&frame);
        let to_clip = Matrix4::from(uniform.projection)
            * Matrix4::from(uniform.view)
            * Matrix4::from(uniform.world);

        // Center of the face nearest the scene eye.
        let clip = to_clip * Vector4::new(0.0, 0.0, -1.0, 1.0);
        assert!(clip.w > 0.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1.0);
        assert!(ndc.y.abs() < 1.0);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_combined_uniform_premultiplies() {
        let frame = snapshot();
        let uniform = CombinedTransformUniform::from_frame(&frame);
        let expected = frame.projection * frame.view * frame.world;
        assert_eq!(
            uniform.world_view_projection,
            convert_matrix4_to_array(expected)
        );
    }

    #[test]
    fn test_variant_descriptions() {
        assert_eq!(OrbitCube::mesh().draw_count(), 36);
        assert!(OrbitCube::mesh().indices.is_some());
        assert_eq!(MiniCube::mesh().draw_count(), 36);
        assert!(MiniCube::mesh().indices.is_none());

        assert_eq!(OrbitCube::clear_color(), wgpu::Color::TRANSPARENT);
        assert_eq!(MiniCube::clear_color(), wgpu::Color::BLUE);
        assert!(matches!(OrbitCube::view_source(), ViewSource::Orbit(_)));
        assert!(matches!(MiniCube::view_source(), ViewSource::Fixed(_)));
    }

    #[test]
    fn test_mini_camera_looks_at_origin() {
        let ViewSource::Fixed(view) = MiniCube::view_source() else {
            panic!("mini cube must use a fixed view");
        };
        assert_ne!(view, Matrix4::identity());
        let origin = view * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.z - 5.0).abs() < 1e-5);
    }
}
