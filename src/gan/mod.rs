pub mod architecture;
pub mod discriminator;
pub mod generator;

use rand::Rng;

use crate::math::sample_standard_normal;

pub use architecture::ArchitectureConfig;
pub use discriminator::Discriminator;
pub use generator::Generator;

/// Draws one latent vector from the standard normal distribution.
pub fn sample_latent<R: Rng + ?Sized>(rng: &mut R, latent_dim: usize) -> Vec<f64> {
    (0..latent_dim).map(|_| sample_standard_normal(rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Image;
    use crate::math::ImageShape;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tiny_pair(latent_dim: usize) -> (Generator, Discriminator) {
        let arch = ArchitectureConfig { generator_channels: [3, 2], discriminator_channels: [2, 3], leaky_alpha: 0.2 };
        let image = ImageShape::new(1, 8, 8);
        let mut rng = StdRng::seed_from_u64(9);
        let g = Generator::from_spec(&arch.generator_spec(latent_dim, image).unwrap(), latent_dim, image, &mut rng).unwrap();
        let d = Discriminator::from_spec(&arch.discriminator_spec(image).unwrap(), image, &mut rng).unwrap();
        (g, d)
    }

    #[test]
    fn generate_is_deterministic_and_bounded() {
        let (g, _) = tiny_pair(5);
        let z = sample_latent(&mut StdRng::seed_from_u64(1), 5);
        let a = g.generate(&z).unwrap();
        let b = g.generate(&z).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.shape(), ImageShape::new(1, 8, 8));
        assert!(a.pixels().iter().all(|x| (-1.0..=1.0).contains(x)));
    }

    #[test]
    fn generate_rejects_wrong_latent_length() {
        let (g, _) = tiny_pair(5);
        assert!(g.generate(&[0.0; 4]).is_err());
    }

    #[test]
    fn discriminate_scores_a_probability() {
        let (g, d) = tiny_pair(2);
        let fake = g.generate(&[0.3, -1.2]).unwrap();
        let score = d.discriminate(&fake).unwrap();
        assert!((0.0..=1.0).contains(&score));

        let wrong = Image::new(ImageShape::new(1, 4, 4), vec![0.0; 16]).unwrap();
        assert!(d.discriminate(&wrong).is_err());
    }

    #[test]
    fn latent_draws_look_standard_normal() {
        let z = sample_latent(&mut StdRng::seed_from_u64(3), 20_000);
        let mean = z.iter().sum::<f64>() / z.len() as f64;
        let var = z.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / z.len() as f64;
        assert!(mean.abs() < 0.05);
        assert!((var - 1.0).abs() < 0.05);
    }
}
