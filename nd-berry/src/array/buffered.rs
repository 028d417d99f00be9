//! 底层尺寸向上取整到 2 的幂的数组适配器 (便于纹理上传等场景).

use std::ops::{Index, IndexMut};

use ndarray::{s, ArrayView3, ArrayViewMut3};

use super::{full_extents, full_index, Array, Resolution, Spatial};
use crate::error::{ArrayError, ArrayResult};

/// 编译期检查源数组维数 `M` 不高于目标维数 `N`.
struct Arity<const M: usize, const N: usize>;

impl<const M: usize, const N: usize> Arity<M, N> {
    const NOT_HIGHER: () = assert!(M <= N, "不能把高维数组拷贝到低维数组");
}

/// 底层存储在每个使用中的轴上都是同一个 2 的幂尺寸的数组.
///
/// 对外报告的是请求的 (逻辑) 尺寸; 底层尺寸为
/// `next_power_of_two(max(逻辑尺寸))`, 各轴一致.
///
/// # 注意
///
/// 每次改变尺寸时底层存储 (含填充区) 全部重置为默认值;
/// [`Buffered::copy_from`] 只写逻辑区域, 填充区保持原样.
#[derive(Debug, Clone)]
pub struct Buffered<T, const N: usize> {
    inner: Array<T, N>,
    logical: [usize; 3],
}

impl<T, const N: usize> Buffered<T, N> {
    /// 创建空数组.
    pub fn new() -> Self {
        Self {
            inner: Array::new(),
            logical: full_extents([0; N]),
        }
    }

    /// 底层各轴尺寸.
    #[inline]
    pub fn backing_extents(&self) -> [usize; N] {
        self.inner.shape()
    }

    /// 含填充区的底层数组.
    #[inline]
    pub fn backing(&self) -> &Array<T, N> {
        &self.inner
    }

    /// 带检查地访问逻辑区域内的元素.
    pub fn at(&self, index: [usize; N]) -> ArrayResult<&T> {
        self.check_logical(index)?;
        self.inner.at(index)
    }

    /// [`Buffered::at`] 的可变版本.
    pub fn at_mut(&mut self, index: [usize; N]) -> ArrayResult<&mut T> {
        self.check_logical(index)?;
        self.inner.at_mut(index)
    }

    fn check_logical(&self, index: [usize; N]) -> ArrayResult<()> {
        let full = full_index(index);
        if self.check(full) {
            Ok(())
        } else {
            Err(ArrayError::out_of_range(full, self.logical))
        }
    }

    /// 逻辑区域的 `ndarray` 视图, 形状为 `(size3, size2, size1)`.
    pub fn view(&self) -> ArrayView3<'_, T> {
        let [l1, l2, l3] = self.logical;
        self.inner.view().slice_move(s![..l3, ..l2, ..l1])
    }

    /// 逻辑区域的可变视图.
    pub fn view_mut(&mut self) -> ArrayViewMut3<'_, T> {
        let [l1, l2, l3] = self.logical;
        self.inner.view_mut().slice_move(s![..l3, ..l2, ..l1])
    }

    /// 设置前 `N` 个轴的分辨率.
    #[inline]
    pub fn set_resolution(&mut self, reso: [f64; N]) {
        self.inner.set_resolution(reso);
    }

    /// 释放存储.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.logical = full_extents([0; N]);
    }
}

impl<T: Clone + Default, const N: usize> Buffered<T, N> {
    /// 创建逻辑尺寸为 `extents` 的数组.
    pub fn from_extents(extents: [usize; N]) -> Self {
        let mut ans = Self::new();
        ans.resize(extents);
        ans
    }

    /// 记录逻辑尺寸, 并把底层数组调整为各轴一致的 2 的幂尺寸.
    /// 全部元素重置为默认值.
    pub fn resize(&mut self, extents: [usize; N]) {
        self.logical = full_extents(extents);
        let side = match extents.iter().max() {
            Some(&m) if m > 0 => m.next_power_of_two(),
            _ => 0,
        };
        self.inner.resize([side; N]);
        self.inner.fill_default();
    }

    /// 把不高于 `N` 维的数组逐元素拷贝到逻辑区域, 并复制其分辨率.
    ///
    /// 逻辑尺寸与 `src` 不同时先 [`Buffered::resize`]; 否则填充区保持原样.
    ///
    /// # 注意
    ///
    /// `M > N` 时无法通过编译:
    ///
    /// ```compile_fail
    /// use nd_berry::{Array3, Buffered};
    ///
    /// let mut b = Buffered::<u8, 2>::new();
    /// b.copy_from(&Array3::<u8>::from_extents([2, 2, 2]));
    /// ```
    pub fn copy_from<const M: usize>(&mut self, src: &Array<T, M>) {
        #[allow(clippy::let_unit_value)]
        let () = Arity::<M, N>::NOT_HIGHER;
        let ext = src.extents();
        if ext != self.logical {
            self.resize(std::array::from_fn(|a| ext[a]));
        }
        self.inner.set_resolution_full(src.resolution());
        self.view_mut().assign(&src.view());
    }
}

impl<T, const N: usize> Default for Buffered<T, N> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Spatial for Buffered<T, N> {
    #[inline]
    fn extents(&self) -> [usize; 3] {
        self.logical
    }

    #[inline]
    fn resolution(&self) -> Resolution {
        self.inner.resolution()
    }
}

impl<T, const N: usize> Index<[usize; N]> for Buffered<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, index: [usize; N]) -> &Self::Output {
        match self.at(index) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T, const N: usize> IndexMut<[usize; N]> for Buffered<T, N> {
    #[inline]
    fn index_mut(&mut self, index: [usize; N]) -> &mut Self::Output {
        match self.at_mut(index) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}
