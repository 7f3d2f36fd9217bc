pub mod builder;
pub mod colliders;
pub mod configuration;
pub mod definition;
pub mod editing;
pub mod joints;
pub mod mass;
pub mod sampler;
