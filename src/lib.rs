//! Grid ray caster: renders a first-person view of a two-grid wall map by
//! casting one ray per screen column into a caller-owned RGBA buffer.

pub mod camera;
pub mod config;
pub mod error;
pub mod fps;
pub mod framebuffer;
pub mod raycaster;
pub mod scaler;
pub mod tables;
pub mod texture;
pub mod world;

pub use camera::CameraPose;
pub use config::RenderConfig;
pub use error::RenderError;
pub use framebuffer::{PixelBuffer, Rgba};
pub use raycaster::{ColumnHit, FrameStats, RayCaster, RayHit};
pub use tables::{AngleTables, realmod};
pub use texture::TextureSampler;
pub use world::{GridMap, WallKind};
