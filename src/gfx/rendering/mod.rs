//! Frame rendering: shaders, vertex records, per-frame state and the engines.

pub mod animation;
pub mod frame_state;
pub mod render_engine;
pub mod shader_pipeline;
pub mod vertex;

pub use animation::{AnimationClock, SpinProfile};
pub use frame_state::{FrameSnapshot, FrameState, ViewSource};
pub use render_engine::{
    create_engine, CombinedTransformUniform, CubeEngine, CubeVariant, MiniCube, OrbitCube,
    RenderEngine, TransformUniform,
};
pub use shader_pipeline::{PipelineConfig, ShaderAssets, ShaderPipeline, ShaderProgram};
pub use vertex::{ColorVertex, HomogeneousColorVertex};
