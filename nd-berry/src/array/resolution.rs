//! 各轴物理分辨率, 以及数组类容器共享的空间属性.

use crate::consts::DEFAULT_RESOLUTION;
use crate::Idx3d;

/// 每个轴一个物理分辨率 (每个采样点对应的物理长度, 如毫米).
///
/// 纯元数据, 从不影响寻址.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution([f64; 3]);

impl Default for Resolution {
    #[inline]
    fn default() -> Self {
        Self([DEFAULT_RESOLUTION; 3])
    }
}

impl Resolution {
    /// 分别指定三个轴的分辨率.
    #[inline]
    pub const fn new(r1: f64, r2: f64, r3: f64) -> Self {
        Self([r1, r2, r3])
    }

    /// 三个轴使用同一分辨率.
    #[inline]
    pub const fn uniform(r: f64) -> Self {
        Self([r; 3])
    }

    /// 由前 `N` 个轴的分辨率构造, 其余轴取默认值.
    pub fn from_axes<const N: usize>(reso: [f64; N]) -> Self {
        let mut ans = Self::default();
        ans.0.iter_mut().zip(reso).for_each(|(d, s)| *d = s);
        ans
    }

    /// 第 `axis` 个轴 (从 0 开始) 的分辨率.
    ///
    /// # 注意
    ///
    /// `axis >= 3` 时程序 panic.
    #[inline]
    pub fn get(&self, axis: usize) -> f64 {
        self.0[axis]
    }

    /// 设置第 `axis` 个轴 (从 0 开始) 的分辨率.
    #[inline]
    pub fn set(&mut self, axis: usize, value: f64) {
        self.0[axis] = value;
    }

    /// 以数组形式返回.
    #[inline]
    pub const fn to_array(self) -> [f64; 3] {
        self.0
    }
}

/// 数组类容器共用的尺寸与分辨率属性.
///
/// 低维容器未使用的轴尺寸恒为 1. 对于带边距或带填充的适配器,
/// 这里报告的总是 **逻辑** 尺寸.
pub trait Spatial {
    /// 三个轴的尺寸 `[size1, size2, size3]`.
    fn extents(&self) -> [usize; 3];

    /// 三个轴的分辨率.
    fn resolution(&self) -> Resolution;

    /// 元素总数.
    #[inline]
    fn size(&self) -> usize {
        self.extents().iter().product()
    }

    /// 是否不含任何元素.
    #[inline]
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// 第一个轴 (变化最快的轴) 的尺寸.
    #[inline]
    fn size1(&self) -> usize {
        self.extents()[0]
    }

    /// 第二个轴的尺寸.
    #[inline]
    fn size2(&self) -> usize {
        self.extents()[1]
    }

    /// 第三个轴的尺寸.
    #[inline]
    fn size3(&self) -> usize {
        self.extents()[2]
    }

    /// 同 [`Spatial::size1`].
    #[inline]
    fn width(&self) -> usize {
        self.size1()
    }

    /// 同 [`Spatial::size2`].
    #[inline]
    fn height(&self) -> usize {
        self.size2()
    }

    /// 同 [`Spatial::size3`].
    #[inline]
    fn depth(&self) -> usize {
        self.size3()
    }

    /// 以 `(depth, height, width)` 顺序返回形状, 与 `ndarray` 视图的形状一致.
    #[inline]
    fn dim(&self) -> Idx3d {
        let [s1, s2, s3] = self.extents();
        (s3, s2, s1)
    }

    /// 检查坐标是否在逻辑范围内.
    #[inline]
    fn check(&self, [i, j, k]: [usize; 3]) -> bool {
        let [s1, s2, s3] = self.extents();
        i < s1 && j < s2 && k < s3
    }

    /// 第一个轴的分辨率.
    #[inline]
    fn reso1(&self) -> f64 {
        self.resolution().get(0)
    }

    /// 第二个轴的分辨率.
    #[inline]
    fn reso2(&self) -> f64 {
        self.resolution().get(1)
    }

    /// 第三个轴的分辨率.
    #[inline]
    fn reso3(&self) -> f64 {
        self.resolution().get(2)
    }

    /// 单个元素 (像素/体素) 的物理体积.
    #[inline]
    fn voxel(&self) -> f64 {
        self.resolution().to_array().iter().product()
    }

    /// 三个轴分辨率是否相同?
    #[inline]
    fn is_isotropic(&self) -> bool {
        let [a, b, c] = self.resolution().to_array();
        a == b && a == c
    }

    /// 各轴覆盖的物理长度.
    #[inline]
    fn physical_size(&self) -> [f64; 3] {
        let r = self.resolution().to_array();
        let e = self.extents();
        [e[0] as f64 * r[0], e[1] as f64 * r[1], e[2] as f64 * r[2]]
    }
}

#[cfg(test)]
mod tests {
    use super::{Resolution, Spatial};

    struct Probe([usize; 3], Resolution);

    impl Spatial for Probe {
        fn extents(&self) -> [usize; 3] {
            self.0
        }

        fn resolution(&self) -> Resolution {
            self.1
        }
    }

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_resolution_defaults() {
        let r = Resolution::default();
        assert_eq!(r.to_array(), [1.0; 3]);
        let r = Resolution::from_axes([0.5, 2.0]);
        assert_eq!(r.to_array(), [0.5, 2.0, 1.0]);
    }

    #[test]
    fn test_spatial_attrs() {
        let p = Probe([4, 3, 2], Resolution::new(0.5, 0.5, 2.5));
        assert_eq!(p.size(), 24);
        assert_eq!(p.dim(), (2, 3, 4));
        assert!(p.check([3, 2, 1]));
        assert!(!p.check([4, 0, 0]));
        assert!(float_eq(p.voxel(), 0.625));
        assert!(!p.is_isotropic());
        assert_eq!(p.physical_size(), [2.0, 1.5, 5.0]);

        let q = Probe([0, 5, 1], Resolution::uniform(0.7));
        assert!(q.is_empty());
        assert!(q.is_isotropic());
    }
}
