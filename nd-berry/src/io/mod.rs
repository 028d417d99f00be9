//! 灰度图像的读写.
//!
//! `Array2<u8>` 的第 0 轴为图像宽度 (x), 第 1 轴为高度 (y), 线性布局与
//! [`image::GrayImage`] 的行优先布局一致, 因此编解码只需搬运底层缓冲区.
//! 读入的数组分辨率为默认值 `1.0`, 写出时分辨率被忽略.

use std::io::Cursor;
use std::path::Path;

use image::{GrayImage, ImageFormat};

use crate::array::Spatial;
use crate::Array2;

/// 编解码失败.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// 底层 `image` 库报告的错误 (格式不支持, 数据损坏, IO 错误等).
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// 图像宽或高为 0.
    #[error("图像为空")]
    EmptyImage,

    /// 数组尺寸超出图像格式所能表示的范围.
    #[error("尺寸 {width} x {height} 超出 u32 范围")]
    TooLarge {
        /// 宽度.
        width: usize,
        /// 高度.
        height: usize,
    },
}

/// 支持的灰度图像格式.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrayFormat {
    /// PNG (无损).
    Png,
    /// BMP.
    Bmp,
    /// JPEG (有损).
    Jpeg,
    /// TIFF.
    Tiff,
}

impl From<GrayFormat> for ImageFormat {
    fn from(value: GrayFormat) -> Self {
        match value {
            GrayFormat::Png => ImageFormat::Png,
            GrayFormat::Bmp => ImageFormat::Bmp,
            GrayFormat::Jpeg => ImageFormat::Jpeg,
            GrayFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

fn into_array(img: GrayImage) -> Result<Array2<u8>, CodecError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(CodecError::EmptyImage);
    }
    // 尺寸与缓冲区长度由 `GrayImage` 保证一致.
    let arr = Array2::from_vec([width as usize, height as usize], img.into_raw())
        .expect("GrayImage 的缓冲区长度应为 width * height");
    Ok(arr)
}

fn to_image(arr: &Array2<u8>) -> Result<GrayImage, CodecError> {
    let [width, height] = arr.shape();
    if arr.is_empty() {
        return Err(CodecError::EmptyImage);
    }
    let too_large = || CodecError::TooLarge { width, height };
    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;
    GrayImage::from_raw(w, h, arr.as_slice().to_vec()).ok_or_else(too_large)
}

/// 从内存中解码灰度图像, 彩色图像会被转为灰度. 格式由内容自动推断.
pub fn decode_gray(bytes: &[u8]) -> Result<Array2<u8>, CodecError> {
    let img = image::load_from_memory(bytes)?;
    into_array(img.to_luma8())
}

/// 把数组按 `format` 编码到内存.
pub fn encode_gray(arr: &Array2<u8>, format: GrayFormat) -> Result<Vec<u8>, CodecError> {
    let img = to_image(arr)?;
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::from(format))?;
    Ok(buf.into_inner())
}

/// 读取 `path` 处的图像.
pub fn open_gray<P: AsRef<Path>>(path: P) -> Result<Array2<u8>, CodecError> {
    let img = image::open(path)?;
    into_array(img.to_luma8())
}

/// 把数组保存到 `path`, 格式由扩展名决定.
pub fn save_gray<P: AsRef<Path>>(arr: &Array2<u8>, path: P) -> Result<(), CodecError> {
    to_image(arr)?.save(path)?;
    Ok(())
}

/// 把 `bytes` 解码到 `target`. 成功时 `target` 的尺寸与内容被替换,
/// 分辨率保持不变; 失败时 `target` 不变.
pub fn read_gray_into(target: &mut Array2<u8>, bytes: &[u8]) -> Result<(), CodecError> {
    let mut fresh = decode_gray(bytes)?;
    fresh.set_resolution([target.reso1(), target.reso2()]);
    target.swap(&mut fresh);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image() -> Array2<u8> {
        Array2::from_fn([7, 5], |[x, y]| (x * 30 + y * 5) as u8)
    }

    #[test]
    fn test_png_round_trip() {
        let arr = gradient_image();
        let bytes = encode_gray(&arr, GrayFormat::Png).unwrap();
        let back = decode_gray(&bytes).unwrap();
        assert_eq!(back.shape(), [7, 5]);
        assert_eq!(back.as_slice(), arr.as_slice());
        assert_eq!(back[[6, 4]], 200);
    }

    #[test]
    fn test_bmp_round_trip() {
        let arr = gradient_image();
        let bytes = encode_gray(&arr, GrayFormat::Bmp).unwrap();
        assert_eq!(decode_gray(&bytes).unwrap().as_slice(), arr.as_slice());
    }

    #[test]
    fn test_read_into_keeps_resolution() {
        let bytes = encode_gray(&gradient_image(), GrayFormat::Png).unwrap();
        let mut target = Array2::from_elem([2, 2], 9u8).with_resolution([0.5, 2.0]);
        read_gray_into(&mut target, &bytes).unwrap();
        assert_eq!(target.shape(), [7, 5]);
        assert_eq!(target.reso1(), 0.5);
        assert_eq!(target.reso2(), 2.0);
    }

    #[test]
    fn test_read_into_failure_is_atomic() {
        let mut target = Array2::from_elem([2, 2], 9u8);
        let r = read_gray_into(&mut target, b"definitely not an image");
        assert!(matches!(r, Err(CodecError::Image(_))));
        assert_eq!(target.shape(), [2, 2]);
        assert!(target.iter().all(|&v| v == 9));
    }

    #[test]
    fn test_encode_empty() {
        let empty = Array2::<u8>::new();
        assert!(matches!(
            encode_gray(&empty, GrayFormat::Png),
            Err(CodecError::EmptyImage)
        ));
    }
}
