use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use ferrite_gan::{ArchitectureConfig, Discriminator, Generator, Image, ImageShape};

fn pair() -> (Generator, Discriminator) {
    let arch = ArchitectureConfig {
        generator_channels: [3, 2],
        discriminator_channels: [2, 3],
        leaky_alpha: 0.2,
    };
    let image = ImageShape::new(1, 8, 8);
    let mut rng = StdRng::seed_from_u64(21);
    let g = Generator::from_spec(&arch.generator_spec(6, image).unwrap(), 6, image, &mut rng).unwrap();
    let d = Discriminator::from_spec(&arch.discriminator_spec(image).unwrap(), image, &mut rng).unwrap();
    (g, d)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_pixels_stay_in_tanh_range(z in prop::collection::vec(-4.0f64..4.0, 6)) {
        let (g, _) = pair();
        let img = g.generate(&z).unwrap();
        prop_assert_eq!(img.pixels().len(), 64);
        prop_assert!(img.pixels().iter().all(|p| (-1.0..=1.0).contains(p)));
        prop_assert_eq!(g.generate(&z).unwrap(), img);
    }

    #[test]
    fn discriminator_scores_are_probabilities(pixels in prop::collection::vec(-1.0f64..=1.0, 64)) {
        let (_, d) = pair();
        let img = Image::new(ImageShape::new(1, 8, 8), pixels).unwrap();
        let score = d.discriminate(&img).unwrap();
        prop_assert!((0.0..=1.0).contains(&score));
    }
}
