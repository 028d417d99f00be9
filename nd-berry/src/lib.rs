#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 提供带物理分辨率的 1/2/3 维数组容器, 以及构建于其上的数值算法.
//!
//! 所有算法只通过容器的寻址/尺寸/迭代约定访问数据: 带越界检查的访问器,
//! 按轴的一维 lane 视图, 以及线性化顺序 `i + j * s1 + k * s1 * s2`.
//!
//! # 注意
//!
//! 1. 带检查的访问器 (`at`, `get`) 返回 `Result` / `Option`; 下标运算符越界时 panic;
//!   `unsafe fn get_unchecked` 是唯一不做越界检查的入口.
//! 2. 算法失败时不会留下一半被修改的调用方状态.
//!
//! # 开发计划
//!
//! ### 多维数组容器 ✅
//!
//! 1/2/3 维稠密数组, 每轴带物理分辨率. 未使用的轴尺寸为 1.
//!
//! 实现位于 `nd-berry/src/array/mod.rs`.
//!
//! ### 带边距的数组 & 二次幂缓冲数组 ✅
//!
//! 1. 可用负下标访问边距的 `Margin`. ✅
//! 2. 底层各轴尺寸统一补齐为二次幂的 `Buffered`. ✅
//!
//! 实现位于 `nd-berry/src/array/margin.rs` 与 `nd-berry/src/array/buffered.rs`.
//!
//! ### Harris 角点检测 ✅
//!
//! 输入输出可以是同一个数组. 同时提供 Sobel / 均值等线性滤波.
//!
//! 实现位于 `nd-berry/src/filter`.
//!
//! ### 高斯混合分布的 EM 估计 ✅
//!
//! 一维/二维样本, 以及一维/二维直方图输入.
//!
//! 参考: A. P. Dempster et al., "Maximum Likelihood from Incomplete Data
//! via the EM Algorithm".
//!
//! 实现位于 `nd-berry/src/mixture`.
//!
//! ### 函数极小化 ✅
//!
//! 黄金分割, Brent, 梯度下降, Powell.
//!
//! 实现位于 `nd-berry/src/minimization`.
//!
//! ### 灰度图像读写 ✅
//!
//! 基于 `image` 的 PNG/BMP/JPEG/TIFF 编解码.
//!
//! 实现位于 `nd-berry/src/io`.

/// 三维索引, 同时也可一定程度上用作非负整数向量. 顺序为 `(z, y, x)`.
pub type Idx3d = (usize, usize, usize);

/// 多维数组容器.
pub mod array;

pub use array::{Array, Array1, Array2, Array3, Buffered, DenseBuffer, Margin, PosIter, Resolution, Spatial};

pub mod consts;

mod error;

pub use error::{ArrayError, ArrayResult};

pub mod filter;

pub mod io;

pub mod minimization;

pub mod mixture;

pub mod prelude;

mod vector;

pub use vector::{Vector2, Vector3};
