//! 线性滤波 (相关运算) 与盒式均值滤波. 边界处按最近像素复制 (clamp) 处理.

use std::ops::{Add, Mul};

use num::traits::AsPrimitive;
use once_cell::sync::Lazy;

use super::for_each_row;
use crate::array::Spatial;
use crate::Array2;

/// 水平方向 (第一个轴) Sobel 算子, 按 `[j][i]` 排列.
const SOBEL_X_TABLE: [[f64; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];

/// 垂直方向 (第二个轴) Sobel 算子, 按 `[j][i]` 排列.
const SOBEL_Y_TABLE: [[f64; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// 水平梯度 Sobel 核.
pub static SOBEL_X: Lazy<Array2<f64>> = Lazy::new(|| Array2::from_fn([3, 3], |[i, j]| SOBEL_X_TABLE[j][i]));

/// 垂直梯度 Sobel 核.
pub static SOBEL_Y: Lazy<Array2<f64>> = Lazy::new(|| Array2::from_fn([3, 3], |[i, j]| SOBEL_Y_TABLE[j][i]));

/// 以 `kernel` 对 `input` 做二维相关运算, 结果写入 `output`.
///
/// 核的中心为 `(kw / 2, kh / 2)`. `output` 会被调整为 `input` 的尺寸并复制其分辨率.
///
/// # 注意
///
/// `kernel` 为空时输出全为 0.
pub fn linear_filter<T>(input: &Array2<T>, output: &mut Array2<f64>, kernel: &Array2<f64>)
where
    T: AsPrimitive<f64>,
{
    let src: Array2<f64> = input.cast();
    let [w, h] = input.shape();
    let [kw, kh] = kernel.shape();
    let (cx, cy) = (kw / 2, kh / 2);

    output.resize([w, h]);
    output.set_resolution_full(input.resolution());
    for_each_row(output.as_mut_slice(), w, |y, row| {
        for (x, px) in row.iter_mut().enumerate() {
            *px = kernel
                .indexed_iter()
                .map(|([u, v], k)| {
                    let sx = (x + u).saturating_sub(cx).min(w - 1);
                    let sy = (y + v).saturating_sub(cy).min(h - 1);
                    k * src[[sx, sy]]
                })
                .sum();
        }
    });
}

/// `size x size` 盒式均值滤波. `output` 会被调整为 `input` 的尺寸并复制其分辨率.
///
/// 元素类型只需支持加法和与 `f64` 的数乘, 因此多通道元素 (如 [`crate::Vector3`])
/// 会逐通道平均.
///
/// # 注意
///
/// `size == 0` 时按 `size == 1` 处理, 即原样拷贝.
pub fn average_filter<T>(input: &Array2<T>, output: &mut Array2<T>, size: usize)
where
    T: Copy + Default + Send + Sync + Add<Output = T> + Mul<f64, Output = T>,
{
    let size = size.max(1);
    let [w, h] = input.shape();
    let lo = size / 2;
    let scale = 1.0 / (size * size) as f64;

    output.resize([w, h]);
    output.set_resolution_full(input.resolution());
    for_each_row(output.as_mut_slice(), w, |y, row| {
        for (x, px) in row.iter_mut().enumerate() {
            let mut acc = T::default();
            for v in 0..size {
                let sy = (y + v).saturating_sub(lo).min(h - 1);
                for u in 0..size {
                    let sx = (x + u).saturating_sub(lo).min(w - 1);
                    acc = acc + input[[sx, sy]];
                }
            }
            *px = acc * scale;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector3;

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_sobel_on_ramp() {
        // f(i, j) = 2i + 3j
        let img = Array2::from_fn([6, 5], |[i, j]| (2 * i + 3 * j) as u8).with_resolution([0.5, 0.5]);
        let mut gx = Array2::new();
        let mut gy = Array2::new();
        linear_filter(&img, &mut gx, &SOBEL_X);
        linear_filter(&img, &mut gy, &SOBEL_Y);
        assert_eq!(gx.shape(), [6, 5]);
        assert_eq!(gx.reso1(), 0.5);
        // 内部: 权重和为 8.
        assert!(float_eq(gx[[2, 2]], 16.0));
        assert!(float_eq(gy[[3, 1]], 24.0));
        // 边界复制后梯度减半.
        assert!(float_eq(gx[[0, 2]], 8.0));
        assert!(float_eq(gy[[2, 4]], 12.0));
    }

    #[test]
    fn test_identity_kernel() {
        let img = Array2::from_fn([4, 3], |[i, j]| (i * j) as f32);
        let k = Array2::from_fn([1, 1], |_| 1.0);
        let mut out = Array2::from_elem([9, 9], 7.0);
        linear_filter(&img, &mut out, &k);
        assert_eq!(out.shape(), [4, 3]);
        assert!(out.iter().zip(img.iter()).all(|(a, b)| float_eq(*a, *b as f64)));
    }

    #[test]
    fn test_average_filter() {
        let mut img = Array2::from_elem([5, 5], 0.0f64);
        img[[2, 2]] = 9.0;
        let mut out = Array2::new();
        average_filter(&img, &mut out, 3);
        assert!(float_eq(out[[1, 1]], 1.0));
        assert!(float_eq(out[[3, 2]], 1.0));
        assert!(float_eq(out[[0, 0]], 0.0));
        assert!(float_eq(out.iter().sum::<f64>(), 9.0));

        let v = Array2::from_elem([2, 2], Vector3::new(1.0, 2.0, 3.0));
        let mut vout = Array2::new();
        average_filter(&v, &mut vout, 3);
        assert!(vout.iter().all(|p| *p == Vector3::new(1.0, 2.0, 3.0)));
    }
}
