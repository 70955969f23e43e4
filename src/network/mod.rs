pub mod metadata;
pub mod network;
pub mod spec;

pub use metadata::{ModelMetadata, ModelRole};
pub use network::{Network, ForwardTrace, Gradients};
pub use spec::{NetworkSpec, LayerSpec};
