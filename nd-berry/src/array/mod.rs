//! 带物理分辨率的 1/2/3 维数组容器, 及其边距适配器和 2 的幂填充适配器.
//!
//! # 寻址
//!
//! 坐标 `(i, j, k)` 的线性下标为 `i + j * size1 + k * size1 * size2`,
//! 即第一个轴变化最快. 低维数组未使用的轴尺寸恒为 1.
//!
//! 该布局与形状为 `(size3, size2, size1)` 的标准布局 `ndarray` 数组完全一致,
//! 因此 [`Array::view`] 可零拷贝地借出 `ndarray` 视图, 按轴的遍历 (lane)
//! 也直接借助视图切片完成.

use std::fmt;
use std::ops::{Index, IndexMut};

use itertools::Itertools;
use ndarray::{s, ArrayView1, ArrayView3, ArrayViewMut1, ArrayViewMut3};
use num::traits::AsPrimitive;

use crate::error::{ArrayError, ArrayResult};

mod buffer;
mod buffered;
mod iter;
mod margin;
mod resolution;

pub use buffer::DenseBuffer;
pub use buffered::Buffered;
pub use iter::PosIter;
pub use margin::Margin;
pub use resolution::{Resolution, Spatial};

/// `N` 维 (`1 <= N <= 3`) 数组, 携带每个轴的物理分辨率.
///
/// # 注意
///
/// 1. [`Array::resize`] 只是重新线性化底层缓冲区, **不** 保留二维/三维空间对应关系.
///   需要保留对应关系时请使用 [`Margin`] 的显式拷贝.
/// 2. 容器本身不提供内容相等比较, 仅提供形状比较 [`Array::same_shape`].
/// 3. 不同元素类型之间的转换必须显式调用 [`Array::cast`] 或 [`Array::assign_cast`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Array<T, const N: usize> {
    extents: [usize; 3],
    reso: Resolution,
    buf: DenseBuffer<T>,
}

/// 一维数组.
pub type Array1<T> = Array<T, 1>;

/// 二维数组 (图像).
pub type Array2<T> = Array<T, 2>;

/// 三维数组 (体数据).
pub type Array3<T> = Array<T, 3>;

/// 把 `N` 维尺寸补齐为三维, 未使用的轴为 1.
#[inline]
pub(crate) fn full_extents<const N: usize>(ext: [usize; N]) -> [usize; 3] {
    let mut ans = [1; 3];
    ans[..N].copy_from_slice(&ext);
    ans
}

/// 把 `N` 维坐标补齐为三维, 未使用的轴为 0.
#[inline]
pub(crate) fn full_index<const N: usize>(idx: [usize; N]) -> [usize; 3] {
    let mut ans = [0; 3];
    ans[..N].copy_from_slice(&idx);
    ans
}

/// 三维尺寸的元素总数, 溢出时返回 `None`.
#[inline]
fn checked_count(ext: [usize; 3]) -> Option<usize> {
    ext.iter().try_fold(1usize, |acc, &e| acc.checked_mul(e))
}

impl<T, const N: usize> Array<T, N> {
    const ARITY: () = assert!(N >= 1 && N <= 3, "仅支持 1, 2, 3 维数组");

    /// 维数.
    pub const NDIM: usize = N;

    /// 创建空数组, 不持有分配.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::ARITY;
        Self {
            extents: full_extents([0; N]),
            reso: Resolution::default(),
            buf: DenseBuffer::new(),
        }
    }

    /// 由按线性化顺序排列的数据创建数组.
    ///
    /// `data.len()` 与 `extents` 的乘积不符时返回 [`ArrayError::ShapeMismatch`].
    pub fn from_vec(extents: [usize; N], data: Vec<T>) -> ArrayResult<Self> {
        #[allow(clippy::let_unit_value)]
        let () = Self::ARITY;
        let extents = full_extents(extents);
        if checked_count(extents) != Some(data.len()) {
            return Err(ArrayError::ShapeMismatch {
                expected: extents,
                actual: [data.len(), 1, 1],
            });
        }
        Ok(Self {
            extents,
            reso: Resolution::default(),
            buf: DenseBuffer::from(data),
        })
    }

    /// 按线性化顺序对每个坐标调用 `f` 生成元素.
    pub fn from_fn<F>(extents: [usize; N], f: F) -> Self
    where
        F: FnMut([usize; N]) -> T,
    {
        #[allow(clippy::let_unit_value)]
        let () = Self::ARITY;
        let extents = full_extents(extents);
        let data: Vec<T> = PosIter::<N>::new(extents).map(f).collect();
        Self {
            extents,
            reso: Resolution::default(),
            buf: DenseBuffer::from(data),
        }
    }

    /// 设置前 `N` 个轴的分辨率后返回自身.
    #[inline]
    pub fn with_resolution(mut self, reso: [f64; N]) -> Self {
        self.set_resolution(reso);
        self
    }

    /// 设置前 `N` 个轴的分辨率. 不影响寻址与内容.
    #[inline]
    pub fn set_resolution(&mut self, reso: [f64; N]) {
        self.reso = Resolution::from_axes(reso);
    }

    /// 设置第 `axis` 个轴 (从 0 开始) 的分辨率.
    #[inline]
    pub fn set_reso(&mut self, axis: usize, value: f64) {
        self.reso.set(axis, value);
    }

    /// 整体替换分辨率.
    #[inline]
    pub(crate) fn set_resolution_full(&mut self, reso: Resolution) {
        self.reso = reso;
    }

    /// 各轴尺寸.
    #[inline]
    pub fn shape(&self) -> [usize; N] {
        std::array::from_fn(|a| self.extents[a])
    }

    /// 两个数组的形状是否一致. 不比较元素类型和内容.
    #[inline]
    pub fn same_shape<U>(&self, other: &Array<U, N>) -> bool {
        self.extents == other.extents
    }

    /// 坐标对应的线性下标. 任一轴越界时返回 [`ArrayError::IndexOutOfRange`].
    pub fn linear_index(&self, index: [usize; N]) -> ArrayResult<usize> {
        let full = full_index(index);
        if full.iter().zip(&self.extents).any(|(i, e)| i >= e) {
            return Err(ArrayError::out_of_range(full, self.extents));
        }
        Ok(self.offset(full))
    }

    #[inline]
    fn offset(&self, [i, j, k]: [usize; 3]) -> usize {
        let [s1, s2, _] = self.extents;
        i + j * s1 + k * s1 * s2
    }

    /// 带检查的元素访问.
    #[inline]
    pub fn at(&self, index: [usize; N]) -> ArrayResult<&T> {
        let n = self.linear_index(index)?;
        Ok(&self.buf[n])
    }

    /// 带检查的可变元素访问.
    #[inline]
    pub fn at_mut(&mut self, index: [usize; N]) -> ArrayResult<&mut T> {
        let n = self.linear_index(index)?;
        Ok(&mut self.buf[n])
    }

    /// 获取元素, 越界时返回 `None`.
    #[inline]
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.at(index).ok()
    }

    /// 获取可变元素, 越界时返回 `None`.
    #[inline]
    pub fn get_mut(&mut self, index: [usize; N]) -> Option<&mut T> {
        self.at_mut(index).ok()
    }

    /// 以三维坐标访问, 忽略超出维数的尾部坐标.
    ///
    /// 便于对不同维数的数组使用统一的调用形式, 例如 `a.at_xyz(i, j, 0)`
    /// 对一维数组等价于 `a.at([i])`.
    #[inline]
    pub fn at_xyz(&self, i: usize, j: usize, k: usize) -> ArrayResult<&T> {
        let full = [i, j, k];
        self.at(std::array::from_fn(|a| full[a]))
    }

    /// [`Array::at_xyz`] 的可变版本.
    #[inline]
    pub fn at_xyz_mut(&mut self, i: usize, j: usize, k: usize) -> ArrayResult<&mut T> {
        let full = [i, j, k];
        self.at_mut(std::array::from_fn(|a| full[a]))
    }

    /// 不做边界检查的元素访问.
    ///
    /// # Safety
    ///
    /// 调用者必须保证每个轴的坐标都小于该轴尺寸.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: [usize; N]) -> &T {
        let n = self.offset(full_index(index));
        self.buf.as_slice().get_unchecked(n)
    }

    /// 不做边界检查的可变元素访问.
    ///
    /// # Safety
    ///
    /// 同 [`Array::get_unchecked`].
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: [usize; N]) -> &mut T {
        let n = self.offset(full_index(index));
        self.buf.as_mut_slice().get_unchecked_mut(n)
    }

    /// O(1) 交换两个数组的全部状态 (尺寸, 分辨率, 存储).
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// 释放存储, 尺寸归零. 分辨率保持不变.
    pub fn clear(&mut self) {
        self.extents = full_extents([0; N]);
        self.buf.clear();
    }

    /// 底层缓冲区.
    #[inline]
    pub fn buffer(&self) -> &DenseBuffer<T> {
        &self.buf
    }

    /// 按线性化顺序的切片.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.buf.as_slice()
    }

    /// 按线性化顺序的可变切片.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.buf.as_mut_slice()
    }

    /// 线性正向迭代器. `.rev()` 即为反向遍历.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.buf.iter()
    }

    /// 线性正向可变迭代器.
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.buf.iter_mut()
    }

    /// 全部坐标, 按线性化顺序.
    #[inline]
    pub fn positions(&self) -> PosIter<N> {
        PosIter::new(self.extents)
    }

    /// 按线性化顺序同时产生坐标和元素.
    pub fn indexed_iter(&self) -> impl DoubleEndedIterator<Item = ([usize; N], &T)> + '_ {
        self.positions().zip(self.buf.iter())
    }

    /// 借出形状为 `(size3, size2, size1)` 的 `ndarray` 视图.
    pub fn view(&self) -> ArrayView3<'_, T> {
        let [s1, s2, s3] = self.extents;
        // `extents` 的乘积总等于缓冲区长度, 形状一定合法.
        ArrayView3::from_shape((s3, s2, s1), self.buf.as_slice()).unwrap()
    }

    /// 借出形状为 `(size3, size2, size1)` 的可变 `ndarray` 视图.
    pub fn view_mut(&mut self) -> ArrayViewMut3<'_, T> {
        let [s1, s2, s3] = self.extents;
        // 同上.
        ArrayViewMut3::from_shape((s3, s2, s1), self.buf.as_mut_slice()).unwrap()
    }

    /// 固定 `(j, k)`, 沿第一个轴遍历 (步长 1).
    ///
    /// # 注意
    ///
    /// 坐标越界时程序 panic. 反向遍历使用 `.iter().rev()`.
    #[inline]
    pub fn x_lane(&self, j: usize, k: usize) -> ArrayView1<'_, T> {
        self.view().slice_move(s![k, j, ..])
    }

    /// 固定 `(i, k)`, 沿第二个轴遍历 (步长 `size1`).
    ///
    /// # 注意
    ///
    /// 坐标越界时程序 panic.
    #[inline]
    pub fn y_lane(&self, i: usize, k: usize) -> ArrayView1<'_, T> {
        self.view().slice_move(s![k, .., i])
    }

    /// 固定 `(i, j)`, 沿第三个轴遍历 (步长 `size1 * size2`).
    ///
    /// # 注意
    ///
    /// 坐标越界时程序 panic.
    #[inline]
    pub fn z_lane(&self, i: usize, j: usize) -> ArrayView1<'_, T> {
        self.view().slice_move(s![.., j, i])
    }

    /// [`Array::x_lane`] 的可变版本.
    #[inline]
    pub fn x_lane_mut(&mut self, j: usize, k: usize) -> ArrayViewMut1<'_, T> {
        self.view_mut().slice_move(s![k, j, ..])
    }

    /// [`Array::y_lane`] 的可变版本.
    #[inline]
    pub fn y_lane_mut(&mut self, i: usize, k: usize) -> ArrayViewMut1<'_, T> {
        self.view_mut().slice_move(s![k, .., i])
    }

    /// [`Array::z_lane`] 的可变版本.
    #[inline]
    pub fn z_lane_mut(&mut self, i: usize, j: usize) -> ArrayViewMut1<'_, T> {
        self.view_mut().slice_move(s![.., j, i])
    }

    /// 逐元素映射为新数组, 保留形状和分辨率.
    pub fn map<U, F>(&self, f: F) -> Array<U, N>
    where
        F: FnMut(&T) -> U,
    {
        Array {
            extents: self.extents,
            reso: self.reso,
            buf: DenseBuffer::from(self.buf.iter().map(f).collect::<Vec<U>>()),
        }
    }

    /// 取出按线性化顺序排列的数据.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.buf.into_vec()
    }
}

impl<T: Clone, const N: usize> Array<T, N> {
    /// 创建全部元素为 `val` 的数组.
    pub fn from_elem(extents: [usize; N], val: T) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::ARITY;
        let extents = full_extents(extents);
        Self {
            extents,
            reso: Resolution::default(),
            buf: DenseBuffer::from_elem(extents.iter().product(), val),
        }
    }

    /// 同 [`Array::from_elem`], 但分配失败 (或元素个数溢出) 时返回
    /// [`ArrayError::AllocationFailed`].
    pub fn try_from_elem(extents: [usize; N], val: T) -> ArrayResult<Self> {
        #[allow(clippy::let_unit_value)]
        let () = Self::ARITY;
        let extents = full_extents(extents);
        let count = checked_count(extents).ok_or(ArrayError::AllocationFailed { count: usize::MAX })?;
        Ok(Self {
            extents,
            reso: Resolution::default(),
            buf: DenseBuffer::try_from_elem(count, val)?,
        })
    }

    /// 改变尺寸并令全部元素等于 `val`. 分辨率不变.
    pub fn resize_filled(&mut self, extents: [usize; N], val: T) {
        self.extents = full_extents(extents);
        self.buf.resize_filled(self.extents.iter().product(), val);
    }

    /// 用 `val` 覆写全部元素.
    #[inline]
    pub fn fill(&mut self, val: T) {
        self.buf.fill(val);
    }
}

impl<T: Clone + Default, const N: usize> Array<T, N> {
    /// 创建给定尺寸的数组, 元素为默认值.
    #[inline]
    pub fn from_extents(extents: [usize; N]) -> Self {
        Self::from_elem(extents, T::default())
    }

    /// 改变尺寸. 分辨率不变.
    ///
    /// 这只是底层缓冲区的重新线性化: 元素总数不变时线性顺序保持不变,
    /// 但二维/三维空间位置不再对应; 元素总数变大时内容全部重置为默认值.
    pub fn resize(&mut self, extents: [usize; N]) {
        self.extents = full_extents(extents);
        self.buf.resize(self.extents.iter().product());
    }

    /// 用默认值覆写全部元素.
    #[inline]
    pub fn fill_default(&mut self) {
        self.buf.fill_default();
    }
}

impl<T: Copy + 'static, const N: usize> Array<T, N> {
    /// 逐元素显式转换 (语义同 `as`) 为新数组, 保留形状和分辨率.
    pub fn cast<U>(&self) -> Array<U, N>
    where
        T: AsPrimitive<U>,
        U: Copy + 'static,
    {
        Array {
            extents: self.extents,
            reso: self.reso,
            buf: self.buf.cast(),
        }
    }

    /// 以 `src` 逐元素转换后的结果替换自身, 形状和分辨率随之改变.
    pub fn assign_cast<S>(&mut self, src: &Array<S, N>)
    where
        S: AsPrimitive<T>,
    {
        self.extents = src.extents;
        self.reso = src.reso;
        self.buf.assign_cast(&src.buf);
    }
}

impl<T, const N: usize> Default for Array<T, N> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Spatial for Array<T, N> {
    #[inline]
    fn extents(&self) -> [usize; 3] {
        self.extents
    }

    #[inline]
    fn resolution(&self) -> Resolution {
        self.reso
    }
}

impl<T, const N: usize> Index<[usize; N]> for Array<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, index: [usize; N]) -> &Self::Output {
        match self.at(index) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T, const N: usize> IndexMut<[usize; N]> for Array<T, N> {
    #[inline]
    fn index_mut(&mut self, index: [usize; N]) -> &mut Self::Output {
        match self.at_mut(index) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

/// 无视维数, 直接按线性下标访问底层缓冲区.
impl<T, const N: usize> Index<usize> for Array<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.buf[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for Array<T, N> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.buf[index]
    }
}

/// 调试用输出: 每行一条 x 方向数据, 元素间以 `", "` 分隔;
/// 三维数组在切片之间插入分隔行. 不保证可以解析回来.
impl<T: fmt::Display, const N: usize> fmt::Display for Array<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [_, s2, s3] = self.extents;
        for k in 0..s3 {
            for j in 0..s2 {
                writeln!(f, "{}", self.x_lane(j, k).iter().join(", "))?;
            }
            if N == 3 {
                if k + 1 != s3 {
                    f.write_str("----- separator -----")?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
