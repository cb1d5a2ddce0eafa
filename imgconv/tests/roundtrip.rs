mod common;

use image::ImageFormat;
use imgconv::{decode, encode, OutputFormat};
use proptest::prelude::*;

fn output_format() -> impl Strategy<Value = OutputFormat> {
    prop::sample::select(OutputFormat::iter().collect::<Vec<_>>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn dimensions_survive_any_target(
        width in 1u32..48,
        height in 1u32..48,
        alpha in any::<bool>(),
        format in output_format(),
    ) {
        let img = if alpha {
            common::rgba_gradient(width, height)
        } else {
            common::rgb_gradient(width, height)
        };
        let decoded = decode(&common::to_bytes(&img, ImageFormat::Png), None).unwrap();

        let bytes = encode(&decoded, format).unwrap();
        prop_assert!(!bytes.is_empty());

        let back = decode(&bytes, None).unwrap();
        prop_assert_eq!(back.dimensions(), (width, height));
        if !format.supports_alpha() {
            prop_assert!(!back.has_alpha());
        }
    }
}
