//! 坐标迭代.

/// 按线性化顺序 (第一个轴变化最快) 产生 `N` 维坐标.
#[derive(Debug, Clone)]
pub struct PosIter<const N: usize> {
    extents: [usize; 3],
    front: usize,
    back: usize,
}

impl<const N: usize> PosIter<N> {
    /// 遍历 `extents` (三维形式, 未使用轴为 1) 所围成的全部坐标.
    pub fn new(extents: [usize; 3]) -> Self {
        Self {
            extents,
            front: 0,
            back: extents.iter().product(),
        }
    }

    #[inline]
    fn unravel(&self, n: usize) -> [usize; N] {
        let [s1, s2, _] = self.extents;
        let full = [n % s1, (n / s1) % s2, n / (s1 * s2)];
        std::array::from_fn(|a| full[a])
    }
}

impl<const N: usize> Iterator for PosIter<N> {
    type Item = [usize; N];

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let ans = self.unravel(self.front);
        self.front += 1;
        Some(ans)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<const N: usize> DoubleEndedIterator for PosIter<N> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.unravel(self.back))
    }
}

impl<const N: usize> ExactSizeIterator for PosIter<N> {}
