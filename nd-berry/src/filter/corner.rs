//! Harris 角点检测.
//!
//! 参考: C. Harris and M. Stephens, "A combined corner and edge detector", 1988.

use std::cmp::Reverse;

use num::traits::AsPrimitive;
use ordered_float::OrderedFloat;

use super::for_each_row;
use super::linear::{average_filter, linear_filter, SOBEL_X, SOBEL_Y};
use crate::array::Spatial;
use crate::consts::harris::{BACKGROUND, FOREGROUND, KAPPA, WINDOW_SIZE};
use crate::{Array2, Vector3};

/// Harris 角点检测参数.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HarrisParams {
    /// 最多接受的角点个数.
    pub max_corners: usize,

    /// 两个被接受角点之间的最小欧氏距离 (像素).
    pub min_distance: f64,

    /// 响应 `det - kappa * trace^2` 中的系数.
    pub kappa: f64,

    /// 结构张量盒式平均窗口的边长.
    pub window_size: usize,
}

impl HarrisParams {
    /// 使用默认 `kappa` 与窗口大小.
    pub fn new(max_corners: usize, min_distance: f64) -> Self {
        Self {
            max_corners,
            min_distance,
            kappa: KAPPA,
            window_size: WINDOW_SIZE,
        }
    }
}

/// 被接受的角点.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Corner {
    /// 第一个轴坐标.
    pub x: usize,
    /// 第二个轴坐标.
    pub y: usize,
    /// Harris 响应值, 恒为正.
    pub measure: f64,
}

/// 角点检测错误.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CornerError {
    /// 输入图像不含任何像素.
    #[error("输入图像为空")]
    EmptyInput,
}

/// 检测角点, 按响应值从大到小返回被接受的角点.
///
/// 1. 用 Sobel 核求梯度 `gx`, `gy`;
/// 2. 在除最外一圈以外的像素上构造 `(gx^2, gy^2, gx * gy)`, 并做盒式平均;
/// 3. 求响应 `Mc = r * g - b^2 - kappa * (r + g)^2`, 收集 `Mc > 0` 的像素;
/// 4. 按 `Mc` 降序排序, 响应相同时按行优先下标升序;
/// 5. 依次贪心接受, 与已接受角点的平方距离小于 `min_distance^2` 的候选被丢弃,
///   直到接受 `max_corners` 个.
pub fn harris_corners<T>(input: &Array2<T>, params: &HarrisParams) -> Result<Vec<Corner>, CornerError>
where
    T: AsPrimitive<f64>,
{
    if input.is_empty() {
        return Err(CornerError::EmptyInput);
    }
    let [w, h] = input.shape();
    let img: Array2<f64> = input.cast();

    let mut gx = Array2::new();
    let mut gy = Array2::new();
    linear_filter(&img, &mut gx, &SOBEL_X);
    linear_filter(&img, &mut gy, &SOBEL_Y);

    let interior = |i: usize, j: usize| 0 < i && i + 1 < w && 0 < j && j + 1 < h;
    let work = Array2::from_fn([w, h], |[i, j]| {
        if interior(i, j) {
            let (dx, dy) = (gx[[i, j]], gy[[i, j]]);
            Vector3::new(dx * dx, dy * dy, dx * dy)
        } else {
            Vector3::default()
        }
    });
    let mut tensor = Array2::new();
    average_filter(&work, &mut tensor, params.window_size);

    let kappa = params.kappa;
    let mut measure = Array2::from_elem([w, h], 0.0f64);
    for_each_row(measure.as_mut_slice(), w, |j, row| {
        for (i, m) in row.iter_mut().enumerate() {
            if interior(i, j) {
                let Vector3 { x: r, y: g, z: b } = tensor[[i, j]];
                *m = r * g - b * b - kappa * (r + g) * (r + g);
            }
        }
    });

    let mut candidates: Vec<Corner> = measure
        .indexed_iter()
        .filter(|(_, m)| **m > 0.0)
        .map(|([x, y], &m)| Corner { x, y, measure: m })
        .collect();
    candidates.sort_unstable_by_key(|c| (Reverse(OrderedFloat(c.measure)), c.y, c.x));
    log::trace!("harris: {} 个正响应候选", candidates.len());

    let min_d2 = params.min_distance * params.min_distance;
    let mut accepted: Vec<Corner> = Vec::with_capacity(params.max_corners.min(candidates.len()));
    for c in candidates {
        if accepted.len() >= params.max_corners {
            break;
        }
        let far_enough = accepted.iter().all(|a| {
            let dx = a.x as f64 - c.x as f64;
            let dy = a.y as f64 - c.y as f64;
            dx * dx + dy * dy >= min_d2
        });
        if far_enough {
            accepted.push(c);
        }
    }
    Ok(accepted)
}

/// 检测角点并绘制到 `output`: 角点像素为 `fg`, 其余为 `bg`.
///
/// `output` 会被调整为 `input` 的尺寸并复制其分辨率. 返回角点个数.
/// 失败时 `output` 保持不变.
pub fn harris<T, U>(
    input: &Array2<T>,
    output: &mut Array2<U>,
    params: &HarrisParams,
    fg: U,
    bg: U,
) -> Result<usize, CornerError>
where
    T: AsPrimitive<f64>,
    U: Clone,
{
    let corners = harris_corners(input, params)?;
    paint(&corners, input.shape(), input.resolution(), output, fg, bg);
    Ok(corners.len())
}

/// 同 [`harris`], 但输入与输出是同一幅图像.
///
/// 全部角点先计算完成, 之后才覆写图像, 因此结果与使用独立输出缓冲区时完全一致.
pub fn harris_in_place<T>(image: &mut Array2<T>, params: &HarrisParams, fg: T, bg: T) -> Result<usize, CornerError>
where
    T: AsPrimitive<f64>,
{
    let corners = harris_corners(image, params)?;
    let (shape, resolution) = (image.shape(), image.resolution());
    paint(&corners, shape, resolution, image, fg, bg);
    Ok(corners.len())
}

/// 以默认前景/背景值生成 `u8` 角点掩膜.
pub fn harris_mask<T>(input: &Array2<T>, params: &HarrisParams) -> Result<Array2<u8>, CornerError>
where
    T: AsPrimitive<f64>,
{
    let mut out = Array2::new();
    harris(input, &mut out, params, FOREGROUND, BACKGROUND)?;
    Ok(out)
}

fn paint<U: Clone>(
    corners: &[Corner],
    shape: [usize; 2],
    resolution: crate::Resolution,
    output: &mut Array2<U>,
    fg: U,
    bg: U,
) {
    output.resize_filled(shape, bg);
    output.set_resolution_full(resolution);
    for c in corners {
        output[[c.x, c.y]] = fg.clone();
    }
}
