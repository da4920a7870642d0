use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::compose::types::ComposedImage;
use crate::image_pipeline::normalize::types::NormalizedChannel;

const RGB_CHANNELS: usize = 3;

/// Build a raster from independently normalized channels.
///
/// With three or more channels the first three become red, green and blue and
/// the rest are ignored. With fewer, the first channel is used as grayscale.
pub fn compose(channels: Vec<NormalizedChannel>) -> Result<ComposedImage> {
    let Some(first) = channels.first() else {
        return Err(ConversionError::NoChannels);
    };
    let (width, height) = (first.width, first.height);

    let used = if channels.len() >= RGB_CHANNELS { RGB_CHANNELS } else { 1 };
    for (index, channel) in channels.iter().enumerate().take(used) {
        if channel.width != width
            || channel.height != height
            || channel.values.len() != width * height
        {
            return Err(ConversionError::DimensionMismatch {
                channel: index,
                width: channel.width,
                height: channel.height,
                expected_width: width,
                expected_height: height,
            });
        }
    }

    let mut channels = channels.into_iter();
    let image = match (channels.next(), channels.next(), channels.next()) {
        (Some(red), Some(green), Some(blue)) => ComposedImage::Rgb { red, green, blue },
        (Some(gray), _, _) => ComposedImage::Grayscale(gray),
        (None, _, _) => return Err(ConversionError::NoChannels),
    };

    debug!(
        "Composed {}x{} {} image",
        width,
        height,
        if image.is_rgb() { "RGB" } else { "grayscale" }
    );
    Ok(image)
}
