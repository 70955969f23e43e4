//! The two parameter updates of adversarial training.
//!
//! Each function takes exactly one network mutably. The generator update
//! reads the discriminator through a shared reference, so the discriminator
//! cannot change while the generator learns from it.

use crate::data::Image;
use crate::error::{GanError, Result};
use crate::gan::{Discriminator, Generator};
use crate::loss::BceLoss;
use crate::network::Gradients;
use crate::optim::Optimizer;

pub const REAL_LABEL: f64 = 1.0;
pub const FAKE_LABEL: f64 = 0.0;

/// Loss and accuracy of one update, measured in its forward pass (before the
/// parameters change).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchOutcome {
    pub loss: f64,
    pub accuracy: f64,
}

/// One gradient step of the discriminator on `images`, all carrying `label`.
pub fn discriminator_update(
    discriminator: &mut Discriminator,
    optimizer: &mut dyn Optimizer,
    images: &[&Image],
    label: f64,
) -> Result<BatchOutcome> {
    if images.is_empty() {
        return Err(GanError::Config("discriminator update needs at least one image".into()));
    }

    let network = discriminator.network();
    let mut acc_grads = Gradients::zeros_for(network);
    let mut predictions = Vec::with_capacity(images.len());

    for image in images {
        if image.shape() != discriminator.image_shape() {
            return Err(GanError::Shape {
                expected: discriminator.image_shape().len(),
                actual: image.pixels().len(),
            });
        }
        let trace = network.forward_trace(image.pixels())?;
        let p = trace.output()[0];
        let (grads, _) = network.backward(&trace, &BceLoss::derivative(&[p], &[label]));
        acc_grads.accumulate(&grads);
        predictions.push(p);
    }

    let expected = vec![label; predictions.len()];
    let outcome = BatchOutcome {
        loss: BceLoss::loss(&predictions, &expected),
        accuracy: BceLoss::accuracy(&predictions, &expected),
    };

    acc_grads.scale(1.0 / images.len() as f64);
    optimizer.step(discriminator.network_mut(), &acc_grads);
    Ok(outcome)
}

/// One gradient step of the generator through `discriminate(generate(z))`
/// against the "real" label. Returns the generator loss.
pub fn generator_update(
    generator: &mut Generator,
    optimizer: &mut dyn Optimizer,
    discriminator: &Discriminator,
    latents: &[Vec<f64>],
) -> Result<f64> {
    if latents.is_empty() {
        return Err(GanError::Config("generator update needs at least one latent vector".into()));
    }
    if generator.image_shape() != discriminator.image_shape() {
        return Err(GanError::Architecture(format!(
            "generator produces {} images but discriminator reads {}",
            generator.image_shape(), discriminator.image_shape()
        )));
    }

    let gen_net = generator.network();
    let disc_net = discriminator.network();
    let mut acc_grads = Gradients::zeros_for(gen_net);
    let mut predictions = Vec::with_capacity(latents.len());

    for z in latents {
        let gen_trace = gen_net.forward_trace(z)?;
        let disc_trace = disc_net.forward_trace(gen_trace.output())?;
        let p = disc_trace.output()[0];

        // Discriminator gradients are discarded; only ∂L/∂image flows back.
        let (_, image_delta) = disc_net.backward(&disc_trace, &BceLoss::derivative(&[p], &[REAL_LABEL]));
        let (grads, _) = gen_net.backward(&gen_trace, &image_delta);
        acc_grads.accumulate(&grads);
        predictions.push(p);
    }

    let loss = BceLoss::loss(&predictions, &vec![REAL_LABEL; predictions.len()]);
    acc_grads.scale(1.0 / latents.len() as f64);
    optimizer.step(generator.network_mut(), &acc_grads);
    Ok(loss)
}
