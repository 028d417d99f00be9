//! 混合分布的单个高斯成分.

use std::f64::consts::PI;
use std::fmt;

use crate::Vector2;

/// 一维高斯成分: 混合权重, 均值, 标准差.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Distribution {
    /// 混合权重.
    pub weight: f64,
    /// 均值.
    pub mean: f64,
    /// 标准差.
    pub sd: f64,
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            weight: 1.0,
            mean: 0.0,
            sd: 1.0,
        }
    }
}

impl Distribution {
    /// 直接初始化.
    pub const fn new(weight: f64, mean: f64, sd: f64) -> Self {
        Self { weight, mean, sd }
    }

    /// 归一化概率密度 (不含混合权重).
    pub fn pdf(&self, x: f64) -> f64 {
        let d = x - self.mean;
        (-d * d / (2.0 * self.sd * self.sd)).exp() / ((2.0 * PI).sqrt() * self.sd)
    }
}

/// 形如 `( 0.5, 1.2, 0.3 )`.
impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "( {}, {}, {} )", self.weight, self.mean, self.sd)
    }
}

/// 二维高斯成分: 混合权重, 均值向量, 协方差矩阵.
///
/// 协方差按 `[vxx, vxy, vyx, vyy]` 排列, 两个非对角元始终相等.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Distribution2 {
    /// 混合权重.
    pub weight: f64,
    /// 均值.
    pub mean: Vector2<f64>,
    /// 协方差.
    pub cov: [f64; 4],
}

impl Default for Distribution2 {
    fn default() -> Self {
        Self {
            weight: 1.0,
            mean: Vector2::default(),
            cov: [1.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Distribution2 {
    /// 直接初始化.
    pub const fn new(weight: f64, mean: Vector2<f64>, cov: [f64; 4]) -> Self {
        Self { weight, mean, cov }
    }

    /// 协方差行列式.
    #[inline]
    pub fn det(&self) -> f64 {
        self.cov[0] * self.cov[3] - self.cov[1] * self.cov[2]
    }

    /// 归一化概率密度 (不含混合权重).
    pub fn pdf(&self, p: Vector2<f64>) -> f64 {
        let det = self.det();
        let [a, b, c, d] = self.cov;
        let Vector2 { x: dx, y: dy } = p - self.mean;
        // 逆矩阵为 [d, -b; -c, a] / det.
        let q = (d * dx * dx - (b + c) * dx * dy + a * dy * dy) / det;
        (-0.5 * q).exp() / (2.0 * PI * det.sqrt())
    }
}

/// 形如 `( 0.5, ( 1, 2 ), < 1, 0, 0, 1 > )`.
impl fmt::Display for Distribution2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.cov;
        write!(f, "( {}, {}, < {a}, {b}, {c}, {d} > )", self.weight, self.mean)
    }
}
