//! 带边距的数组适配器.
//!
//! 在逻辑数组四周预留固定宽度的边距 (halo), 便于卷积类算法在边界处直接越界读取.

use std::ops::{Index, IndexMut};

use ndarray::{s, ArrayView3, ArrayViewMut3, Axis, Slice};
use num::traits::AsPrimitive;

use super::{full_extents, Array, Resolution, Spatial};
use crate::error::{ArrayError, ArrayResult};

/// 带边距的 `N` 维数组.
///
/// 逻辑坐标 `i` 对应底层坐标 `i + margin`, 逻辑尺寸为底层尺寸减去两倍边距.
/// 逻辑坐标可以为负, 只要落在底层数组内即可访问边距区域.
#[derive(Debug, Clone)]
pub struct Margin<T, const N: usize> {
    inner: Array<T, N>,
    margin: [usize; 3],
}

impl<T: Clone, const N: usize> Margin<T, N> {
    /// 以统一边距 `margin` 包裹 `src` 的拷贝, 边距区域填充为 `border`.
    #[inline]
    pub fn new(src: &Array<T, N>, margin: usize, border: T) -> Self {
        Self::with_margins(src, [margin; N], border)
    }

    /// 同 [`Margin::new`], 但每个轴分别指定边距.
    pub fn with_margins(src: &Array<T, N>, margin: [usize; N], border: T) -> Self {
        let mut ans = Self::with_extents(src.shape(), margin, border);
        ans.inner.set_resolution_full(src.resolution());
        ans.copy_from(src);
        ans
    }

    /// 创建逻辑尺寸为 `extents` 的数组, 全部 (含内部) 填充为 `border`.
    pub fn with_extents(extents: [usize; N], margin: [usize; N], border: T) -> Self {
        let margin = {
            let mut m = [0; 3];
            m[..N].copy_from_slice(&margin);
            m
        };
        let backing: [usize; N] = std::array::from_fn(|a| extents[a] + 2 * margin[a]);
        Self {
            inner: Array::from_elem(backing, border),
            margin,
        }
    }

    /// 把 `src` 拷贝进内部区域.
    ///
    /// 各轴独立地截断到 `min(逻辑尺寸, src 尺寸)`; 未覆盖的内部区域保持原值.
    pub fn copy_from(&mut self, src: &Array<T, N>) {
        let [l1, l2, l3] = self.extents();
        let [s1, s2, s3] = src.extents();
        let (c1, c2, c3) = (l1.min(s1), l2.min(s2), l3.min(s3));
        self.interior_mut()
            .slice_mut(s![..c3, ..c2, ..c1])
            .assign(&src.view().slice(s![..c3, ..c2, ..c1]));
    }

    /// 只覆写边距区域, 内部保持不变.
    pub fn fill_margin(&mut self, val: T) {
        self.fill_margin_per_axis(std::array::from_fn(|_| val.clone()));
    }

    /// 按轴分别覆写边距区域, `vals[a]` 用于第 `a` 个轴两端的边带.
    ///
    /// 边带按第三轴, 第二轴, 第一轴的顺序写入, 因此角落与棱上的格子
    /// 最终取第一轴的值.
    pub fn fill_margin_per_axis(&mut self, vals: [T; N]) {
        let margin = self.margin;
        let mut view = self.inner.view_mut();
        // 视图轴顺序为 (k, j, i).
        for a in (0..N).rev() {
            let m = margin[a] as isize;
            if m == 0 {
                continue;
            }
            let axis = Axis(2 - a);
            view.slice_axis_mut(axis, Slice::from(..m))
                .fill(vals[a].clone());
            view.slice_axis_mut(axis, Slice::from(-m..))
                .fill(vals[a].clone());
        }
    }

    /// 改变逻辑尺寸和边距, 全部元素重置为 `border`.
    pub fn resize(&mut self, extents: [usize; N], margin: [usize; N], border: T) {
        let resolution = self.resolution();
        *self = Self::with_extents(extents, margin, border);
        self.inner.set_resolution_full(resolution);
    }
}

impl<T, const N: usize> Margin<T, N> {
    /// 各轴边距.
    #[inline]
    pub fn margin(&self) -> [usize; N] {
        std::array::from_fn(|a| self.margin[a])
    }

    /// 以逻辑坐标访问 (可为负, 从而落入边距).
    /// 超出底层数组范围时返回 [`ArrayError::IndexOutOfRange`].
    pub fn at(&self, index: [isize; N]) -> ArrayResult<&T> {
        let n = self.backing_offset(index)?;
        Ok(&self.inner[n])
    }

    /// [`Margin::at`] 的可变版本.
    pub fn at_mut(&mut self, index: [isize; N]) -> ArrayResult<&mut T> {
        let n = self.backing_offset(index)?;
        Ok(&mut self.inner[n])
    }

    fn backing_offset(&self, index: [isize; N]) -> ArrayResult<usize> {
        let mut backing = [0usize; N];
        for a in 0..N {
            let b = index[a] + self.margin[a] as isize;
            if b < 0 || b as usize >= self.inner.extents()[a] {
                let mut full = [0isize; 3];
                full[..N].copy_from_slice(&index);
                return Err(ArrayError::IndexOutOfRange {
                    index: full,
                    extents: self.extents(),
                });
            }
            backing[a] = b as usize;
        }
        self.inner.linear_index(backing)
    }

    /// 内部 (逻辑) 区域的 `ndarray` 视图, 形状为 `(size3, size2, size1)`.
    pub fn interior(&self) -> ArrayView3<'_, T> {
        let [m1, m2, m3] = self.margin;
        let [l1, l2, l3] = self.extents();
        self.inner
            .view()
            .slice_move(s![m3..m3 + l3, m2..m2 + l2, m1..m1 + l1])
    }

    /// 内部区域的可变视图.
    pub fn interior_mut(&mut self) -> ArrayViewMut3<'_, T> {
        let [m1, m2, m3] = self.margin;
        let [l1, l2, l3] = self.extents();
        self.inner
            .view_mut()
            .slice_move(s![m3..m3 + l3, m2..m2 + l2, m1..m1 + l1])
    }

    /// 含边距的底层数组.
    #[inline]
    pub fn backing(&self) -> &Array<T, N> {
        &self.inner
    }

    /// 取出含边距的底层数组.
    #[inline]
    pub fn into_backing(self) -> Array<T, N> {
        self.inner
    }

    /// 设置前 `N` 个轴的分辨率.
    #[inline]
    pub fn set_resolution(&mut self, reso: [f64; N]) {
        self.inner.set_resolution(reso);
    }

    /// 释放存储, 尺寸与边距归零.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.margin = [0; 3];
    }
}

impl<T: Clone, const N: usize> Margin<T, N> {
    /// 把内部区域拷贝为普通数组, 保留分辨率.
    pub fn to_array(&self) -> Array<T, N> {
        let shape: [usize; N] = std::array::from_fn(|a| self.extents()[a]);
        let data: Vec<T> = self.interior().iter().cloned().collect();
        // `interior` 的元素个数恰为逻辑尺寸之积.
        let mut ans = Array::from_vec(shape, data).unwrap();
        ans.set_resolution_full(self.resolution());
        ans
    }
}

impl<T: Copy + 'static, const N: usize> Margin<T, N> {
    /// 以逐元素转换后的 `src` 为内部内容构造, 边距填充为 `border`.
    pub fn from_cast<S>(src: &Array<S, N>, margin: usize, border: T) -> Self
    where
        S: AsPrimitive<T>,
    {
        Self::new(&src.cast(), margin, border)
    }
}

impl<T, const N: usize> Spatial for Margin<T, N> {
    /// 逻辑尺寸.
    fn extents(&self) -> [usize; 3] {
        let b = self.inner.extents();
        let logical: [usize; N] = std::array::from_fn(|a| b[a] - 2 * self.margin[a]);
        full_extents(logical)
    }

    #[inline]
    fn resolution(&self) -> Resolution {
        self.inner.resolution()
    }
}

impl<T, const N: usize> Index<[isize; N]> for Margin<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, index: [isize; N]) -> &Self::Output {
        match self.at(index) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T, const N: usize> IndexMut<[isize; N]> for Margin<T, N> {
    #[inline]
    fn index_mut(&mut self, index: [isize; N]) -> &mut Self::Output {
        match self.at_mut(index) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Array2, Array3};

    #[test]
    fn test_margin_round_trip() {
        let src = Array2::from_fn([5, 4], |[i, j]| (i * 10 + j) as i32).with_resolution([0.5, 0.7]);
        let m = Margin::new(&src, 2, -1);
        assert_eq!(m.extents(), [5, 4, 1]);
        assert_eq!(m.backing().shape(), [9, 8]);
        assert_eq!(m.margin(), [2, 2]);
        assert_eq!(m.reso2(), 0.7);

        for [i, j] in src.positions() {
            assert_eq!(m[[i as isize, j as isize]], src[[i, j]]);
        }
        assert_eq!(m[[-1, -1]], -1);
        assert_eq!(*m.at([-2, 5]).unwrap(), -1);
        assert_eq!(*m.at([6, 0]).unwrap(), -1);
        assert!(m.at([-3, 0]).is_err());
        assert_eq!(
            m.at([0, 6]),
            Err(ArrayError::IndexOutOfRange {
                index: [0, 6, 0],
                extents: [5, 4, 1]
            })
        );

        let back = m.to_array();
        assert!(back.same_shape(&src));
        assert_eq!(back.as_slice(), src.as_slice());
        assert_eq!(back.resolution(), src.resolution());
    }

    #[test]
    fn test_fill_margin_keeps_interior() {
        let src = Array2::from_elem([3, 3], 5u8);
        let mut m = Margin::new(&src, 1, 0);
        m.fill_margin(9);
        assert!(m.interior().iter().all(|v| *v == 5));
        assert_eq!(m.backing().iter().filter(|v| **v == 9).count(), 25 - 9);
    }

    #[test]
    fn test_fill_margin_precedence() {
        let src = Array2::from_elem([2, 2], 0u8);
        let mut m = Margin::new(&src, 1, 0);
        m.fill_margin_per_axis([1, 2]);
        // 角落取第一轴的值.
        assert_eq!(m[[-1, -1]], 1);
        assert_eq!(m[[2, 2]], 1);
        assert_eq!(m[[-1, 0]], 1);
        assert_eq!(m[[0, -1]], 2);
        assert_eq!(m[[1, 2]], 2);
        assert_eq!(m[[0, 0]], 0);

        let src = Array3::from_elem([1, 1, 1], 0u8);
        let mut m = Margin::new(&src, 1, 0);
        m.fill_margin_per_axis([1, 2, 3]);
        assert_eq!(m[[-1, -1, -1]], 1);
        assert_eq!(m[[0, -1, -1]], 2);
        assert_eq!(m[[0, 0, 1]], 3);
    }

    #[test]
    fn test_narrowing_copy_per_axis() {
        let src = Array2::from_fn([4, 2], |[i, j]| (1 + i + 4 * j) as u16);
        let mut m = Margin::with_extents([3, 5], [1, 0], 0u16);
        m.copy_from(&src);
        // 第一轴截断到 3, 第二轴截断到 2, 两者独立.
        assert_eq!(m[[2, 0]], 3);
        assert_eq!(m[[2, 1]], 7);
        assert_eq!(m[[0, 2]], 0);
        assert_eq!(m[[-1, 0]], 0);
        assert_eq!(m.to_array().as_slice().iter().filter(|v| **v != 0).count(), 6);
    }

    #[test]
    fn test_from_cast_and_resize() {
        let src = Array2::from_fn([2, 2], |[i, j]| (i + j) as u8);
        let mut m: Margin<f64, 2> = Margin::from_cast(&src, 1, f64::NAN);
        assert_eq!(m[[1, 1]], 2.0);
        assert!(m[[-1, 1]].is_nan());

        m.set_resolution([3.0, 3.0]);
        m.resize([4, 1], [0, 2], 0.5);
        assert_eq!(m.extents(), [4, 1, 1]);
        assert_eq!(m.backing().shape(), [4, 5]);
        assert_eq!(m[[3, -2]], 0.5);
        assert_eq!(m.reso1(), 3.0);

        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.margin(), [0, 0]);
    }
}
