use serde::{Deserialize, Serialize};

use crate::math::ImageShape;

/// Which side of the adversarial pair a saved network plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRole {
    /// Latent vector in, image out.
    Generator,
    /// Image in, real-probability out.
    Discriminator,
}

/// Optional annotations attached to a saved network.
/// All fields are Option<> so bare networks deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    pub description: Option<String>,
    pub role: Option<ModelRole>,
    /// Length of the generator's latent input.
    pub latent_dim: Option<usize>,
    /// Shape of the images produced (generator) or consumed (discriminator).
    pub image: Option<ImageShape>,
    /// Number of training epochs completed when the model was saved.
    pub epochs_trained: Option<usize>,
}
