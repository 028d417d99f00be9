//! 连续存储的一维所有权缓冲区, 是所有数组容器的底层存储.

use crate::error::{ArrayError, ArrayResult};
use num::traits::AsPrimitive;
use std::ops::{Index, IndexMut};

/// 独占一段连续内存的元素缓冲区.
///
/// 元素个数为 0 时保证不持有任何分配; 反之亦然.
///
/// # 注意
///
/// 1. 扩大尺寸时会 **重新分配** 存储, 原有内容全部丢弃, 新元素为默认值 (或给定值).
/// 2. 缩小尺寸时原地截断, 保留前 `n` 个元素.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DenseBuffer<T> {
    data: Vec<T>,
}

impl<T> DenseBuffer<T> {
    /// 创建空缓冲区, 不持有分配.
    #[inline]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// 元素个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 是否持有底层分配. 与 `!self.is_empty()` 总是一致.
    #[inline]
    pub fn is_allocated(&self) -> bool {
        if std::mem::size_of::<T>() == 0 {
            !self.data.is_empty()
        } else {
            self.data.capacity() != 0
        }
    }

    /// O(1) 交换两个缓冲区的存储, 不涉及元素搬移.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.data, &mut other.data);
    }

    /// 释放存储. 可重复调用.
    #[inline]
    pub fn clear(&mut self) {
        self.data = Vec::new();
    }

    /// 原地截断到 `n` 个元素, 保留前 `n` 个, 不重新分配. `n` 不小于当前长度时无操作.
    pub fn truncate(&mut self, n: usize) {
        if n == 0 {
            self.clear();
        } else {
            self.data.truncate(n);
        }
    }

    /// 获取第 `i` 个元素. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<&T> {
        self.data.get(i)
    }

    /// 获取第 `i` 个元素的可变引用. 越界时返回 `None`.
    #[inline]
    pub fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        self.data.get_mut(i)
    }

    /// 带检查地获取第 `i` 个元素.
    pub fn at(&self, i: usize) -> ArrayResult<&T> {
        let len = self.data.len();
        self.data
            .get(i)
            .ok_or_else(|| ArrayError::out_of_range([i, 0, 0], [len, 1, 1]))
    }

    /// 带检查地获取第 `i` 个元素的可变引用.
    pub fn at_mut(&mut self, i: usize) -> ArrayResult<&mut T> {
        let len = self.data.len();
        self.data
            .get_mut(i)
            .ok_or_else(|| ArrayError::out_of_range([i, 0, 0], [len, 1, 1]))
    }

    /// 以切片形式查看全部元素.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// 以可变切片形式查看全部元素.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// 线性正向迭代器. 可通过 `.rev()` 反向遍历.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// 线性正向可变迭代器.
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// 取出底层 `Vec`.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Clone> DenseBuffer<T> {
    /// 创建 `n` 个元素, 全部为 `val`.
    #[inline]
    pub fn from_elem(n: usize, val: T) -> Self {
        Self { data: vec![val; n] }
    }

    /// 同 [`DenseBuffer::from_elem`], 但分配失败时返回错误而非中止程序.
    pub fn try_from_elem(n: usize, val: T) -> ArrayResult<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(n)
            .map_err(|_| ArrayError::AllocationFailed { count: n })?;
        data.resize(n, val);
        Ok(Self { data })
    }

    /// 用 `val` 覆写全部元素.
    #[inline]
    pub fn fill(&mut self, val: T) {
        self.data.fill(val);
    }

    /// 改变尺寸, 并使 **全部** 元素等于 `val`.
    ///
    /// 缩小时原地截断后覆写, 扩大时重新分配.
    pub fn resize_filled(&mut self, n: usize, val: T) {
        if n == 0 {
            self.clear();
        } else if n <= self.data.len() {
            self.truncate(n);
            self.data.fill(val);
        } else {
            self.data = vec![val; n];
        }
    }
}

impl<T: Clone + Default> DenseBuffer<T> {
    /// 创建 `n` 个默认值元素.
    #[inline]
    pub fn with_len(n: usize) -> Self {
        Self::from_elem(n, T::default())
    }

    /// 改变尺寸.
    ///
    /// 缩小时保留前 `n` 个元素; 扩大时重新分配, 原有内容丢弃, 全部元素为默认值.
    pub fn resize(&mut self, n: usize) {
        if n <= self.data.len() {
            self.truncate(n);
        } else {
            self.data = vec![T::default(); n];
        }
    }

    /// 用默认值覆写全部元素.
    #[inline]
    pub fn fill_default(&mut self) {
        self.data.fill(T::default());
    }
}

impl<T: Copy + 'static> DenseBuffer<T> {
    /// 逐元素显式类型转换 (语义同 `as`), 得到新缓冲区.
    pub fn cast<U>(&self) -> DenseBuffer<U>
    where
        T: AsPrimitive<U>,
        U: Copy + 'static,
    {
        DenseBuffer {
            data: self.data.iter().map(|v| v.as_()).collect(),
        }
    }

    /// 用 `src` 逐元素转换后的内容替换自身.
    pub fn assign_cast<S>(&mut self, src: &DenseBuffer<S>)
    where
        S: AsPrimitive<T>,
    {
        self.data = src.data.iter().map(|v| v.as_()).collect();
    }
}

impl<T> From<Vec<T>> for DenseBuffer<T> {
    /// 直接接管 `data` 的存储. 空 `Vec` 的残余容量会被释放.
    fn from(mut data: Vec<T>) -> Self {
        if data.is_empty() {
            data = Vec::new();
        }
        Self { data }
    }
}

impl<T> Index<usize> for DenseBuffer<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for DenseBuffer<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}
