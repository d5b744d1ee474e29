use crate::error::PipelineError;
use crate::image_source::ImageSource;
use crate::tensor::{Tensor, TensorLedger};

const CHANNELS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub start_y: usize,
    pub start_x: usize,
    pub size: usize,
}

/// Largest square inside a `height` x `width` image, centered.
pub fn crop_window(height: usize, width: usize) -> CropWindow {
    let size = height.min(width);
    CropWindow {
        start_y: (height - size) / 2,
        start_x: (width - size) / 2,
        size,
    }
}

fn tensor<T>(
    shape: Vec<usize>,
    data: Vec<T>,
    ledger: &TensorLedger,
) -> Result<Tensor<T>, PipelineError> {
    Tensor::from_shape_vec(shape, data, ledger).map_err(PipelineError::Tensor)
}

fn decode(image: &ImageSource, ledger: &TensorLedger) -> Result<Tensor<u8>, PipelineError> {
    tensor(
        vec![image.height(), image.width(), CHANNELS],
        image.pixels.as_raw().clone(),
        ledger,
    )
}

fn crop(
    source: &Tensor<u8>,
    window: CropWindow,
    ledger: &TensorLedger,
) -> Result<Tensor<u8>, PipelineError> {
    let width = source.shape()[1];
    let row_len = window.size * CHANNELS;
    let data = source.as_slice();

    let mut cropped = Vec::with_capacity(window.size * row_len);
    for y in window.start_y..window.start_y + window.size {
        let offset = (y * width + window.start_x) * CHANNELS;
        cropped.extend_from_slice(&data[offset..offset + row_len]);
    }

    tensor(vec![window.size, window.size, CHANNELS], cropped, ledger)
}

fn nearest_index(dst: usize, in_size: usize, out_size: usize) -> usize {
    (dst * in_size / out_size).min(in_size - 1)
}

fn resize_nearest(
    source: &Tensor<u8>,
    size: usize,
    ledger: &TensorLedger,
) -> Result<Tensor<u8>, PipelineError> {
    let (in_height, in_width) = (source.shape()[0], source.shape()[1]);
    let data = source.as_slice();

    let mut resized = Vec::with_capacity(size * size * CHANNELS);
    for y in 0..size {
        let src_y = nearest_index(y, in_height, size);
        for x in 0..size {
            let src_x = nearest_index(x, in_width, size);
            let offset = (src_y * in_width + src_x) * CHANNELS;
            resized.extend_from_slice(&data[offset..offset + CHANNELS]);
        }
    }

    tensor(vec![size, size, CHANNELS], resized, ledger)
}

/// Scales to [0, 1] and adds the leading batch dimension.
fn normalize(source: &Tensor<u8>, ledger: &TensorLedger) -> Result<Tensor<f32>, PipelineError> {
    let mut shape = vec![1];
    shape.extend_from_slice(source.shape());

    let data = source
        .as_slice()
        .iter()
        .map(|&value| value as f32 / 255.0)
        .collect();

    tensor(shape, data, ledger)
}

/// Turns an image of any size into a `[1, input_size, input_size, 3]` tensor:
/// centered square crop, nearest-neighbour resize, scaling to [0, 1].
///
/// Each intermediate tensor is dropped as soon as the next one exists, so on
/// success only the returned tensor is still live.
pub fn preprocess(
    image: &ImageSource,
    input_size: u32,
    ledger: &TensorLedger,
) -> Result<Tensor<f32>, PipelineError> {
    let original = decode(image, ledger)?;
    let (height, width) = (original.shape()[0], original.shape()[1]);
    if height == 0 || width == 0 {
        return Err(PipelineError::EmptyImage { height, width });
    }

    let cropped = crop(&original, crop_window(height, width), ledger)?;
    drop(original);

    let resized = resize_nearest(&cropped, input_size as usize, ledger)?;
    drop(cropped);

    let normalized = normalize(&resized, ledger)?;
    drop(resized);

    Ok(normalized)
}
