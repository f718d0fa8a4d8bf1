pub mod batch;
pub mod camera;
pub mod frame_mesh;
pub mod gpu_context;
pub mod sprite_pipeline;
pub mod texture;
pub mod texture_cache;
pub mod vertex;

pub use batch::{DrawCall, DrawTexture, FrameBatch};
pub use camera::{Camera2D, CameraUniform};
pub use frame_mesh::FrameMesh;
pub use gpu_context::GpuContext;
pub use sprite_pipeline::SpritePipeline;
pub use texture::{texture_format_for, Texture};
pub use texture_cache::{GpuSpriteTexture, GpuTextureLoader, TextureCache};
pub use vertex::SpriteVertex;
