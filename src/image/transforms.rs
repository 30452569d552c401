use crate::utils::error::AgriError;
use crate::Result;
use image::RgbImage;
use ndarray::{Array3, Array4, Axis};

/// 图像变换工具集
pub struct ImageTransforms;

impl ImageTransforms {
    /// 直接从u8 RGB图像缩放到固定尺寸（不保持宽高比，双线性插值，像素中心对齐），
    /// 输出 HWC、BGR通道顺序、0-255 的f32数组；只分配目标尺寸的缓冲区
    pub fn resize_to_bgr(
        image: &RgbImage,
        target_width: usize,
        target_height: usize,
    ) -> Result<Array3<f32>> {
        let (orig_w, orig_h) = (image.width() as usize, image.height() as usize);

        if orig_h == 0 || orig_w == 0 || target_width == 0 || target_height == 0 {
            return Err(AgriError::ImageProcessing(format!(
                "Cannot resize {}x{} image to {}x{}",
                orig_w, orig_h, target_width, target_height
            )));
        }

        let scale_w = orig_w as f32 / target_width as f32;
        let scale_h = orig_h as f32 / target_height as f32;

        let mut resized = Array3::<f32>::zeros((target_height, target_width, 3));

        for h in 0..target_height {
            let (h1, h2, dh) = Self::source_coord(h, scale_h, orig_h);
            for w in 0..target_width {
                let (w1, w2, dw) = Self::source_coord(w, scale_w, orig_w);

                let p11 = image.get_pixel(w1 as u32, h1 as u32);
                let p12 = image.get_pixel(w2 as u32, h1 as u32);
                let p21 = image.get_pixel(w1 as u32, h2 as u32);
                let p22 = image.get_pixel(w2 as u32, h2 as u32);

                for c in 0..3 {
                    let interpolated = p11[c] as f32 * (1.0 - dh) * (1.0 - dw)
                        + p12[c] as f32 * (1.0 - dh) * dw
                        + p21[c] as f32 * dh * (1.0 - dw)
                        + p22[c] as f32 * dh * dw;

                    // RGB -> BGR
                    resized[[h, w, 2 - c]] = interpolated;
                }
            }
        }

        Ok(resized)
    }

    /// 目标坐标映射回源坐标，返回 (下界, 上界, 权重)
    fn source_coord(dst: usize, scale: f32, len: usize) -> (usize, usize, f32) {
        let src = (dst as f32 + 0.5) * scale - 0.5;
        if src <= 0.0 {
            return (0, 0, 0.0);
        }

        let lower = src.floor() as usize;
        if lower >= len - 1 {
            return (len - 1, len - 1, 0.0);
        }

        (lower, lower + 1, src - lower as f32)
    }

    /// 添加batch维度: HWC -> NHWC (N=1)
    pub fn to_batch(image: Array3<f32>) -> Array4<f32> {
        image.insert_axis(Axis(0))
    }
}
