use image::GrayImage;

use super::morphology::{StructuringElement, close, open};

/// Close, open, then close again with the same elliptical element
pub fn post_process(mask: &GrayImage, se_size: u32) -> GrayImage {
    let se = StructuringElement::disk(se_size);
    let closed = close(mask, &se);
    let opened = open(&closed, &se);
    close(&opened, &se)
}
