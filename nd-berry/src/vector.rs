//! 定长二维/三维向量. 可作为数组元素类型, 也用于算法内部的多通道累加.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num::Float;

/// 二维向量.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2<T> {
    /// x 分量.
    pub x: T,
    /// y 分量.
    pub y: T,
}

/// 三维向量.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3<T> {
    /// x 分量.
    pub x: T,
    /// y 分量.
    pub y: T,
    /// z 分量.
    pub z: T,
}

/// 逐分量运算与通用方法.
macro_rules! impl_vector {
    ($vec: ident, $($f: ident),+) => {
        impl<T> $vec<T> {
            /// 直接初始化.
            #[inline]
            pub const fn new($($f: T),+) -> Self {
                Self { $($f),+ }
            }
        }

        impl<T: Copy + Add<Output = T> + Mul<Output = T>> $vec<T> {
            /// 内积.
            #[inline]
            pub fn inner(&self, rhs: &Self) -> T {
                let ans = [$(self.$f * rhs.$f),+];
                ans[1..].iter().fold(ans[0], |acc, v| acc + *v)
            }
        }

        impl<T: Float> $vec<T> {
            /// 欧氏长度.
            #[inline]
            pub fn length(&self) -> T {
                self.inner(self).sqrt()
            }

            /// 单位化. 零向量保持不变.
            pub fn normalize(&self) -> Self {
                let len = self.length();
                if len > T::zero() {
                    *self / len
                } else {
                    *self
                }
            }
        }

        impl<T: Add<Output = T>> Add for $vec<T> {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self { $($f: self.$f + rhs.$f),+ }
            }
        }

        impl<T: Sub<Output = T>> Sub for $vec<T> {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self { $($f: self.$f - rhs.$f),+ }
            }
        }

        impl<T: Neg<Output = T>> Neg for $vec<T> {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                Self { $($f: -self.$f),+ }
            }
        }

        impl<T: Copy + Mul<Output = T>> Mul<T> for $vec<T> {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: T) -> Self {
                Self { $($f: self.$f * rhs),+ }
            }
        }

        impl<T: Copy + Div<Output = T>> Div<T> for $vec<T> {
            type Output = Self;

            #[inline]
            fn div(self, rhs: T) -> Self {
                Self { $($f: self.$f / rhs),+ }
            }
        }

        impl<T: AddAssign> AddAssign for $vec<T> {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                $(self.$f += rhs.$f;)+
            }
        }

        impl<T: SubAssign> SubAssign for $vec<T> {
            #[inline]
            fn sub_assign(&mut self, rhs: Self) {
                $(self.$f -= rhs.$f;)+
            }
        }

        impl<T: Copy + MulAssign> MulAssign<T> for $vec<T> {
            #[inline]
            fn mul_assign(&mut self, rhs: T) {
                $(self.$f *= rhs;)+
            }
        }

        impl<T: Copy + DivAssign> DivAssign<T> for $vec<T> {
            #[inline]
            fn div_assign(&mut self, rhs: T) {
                $(self.$f /= rhs;)+
            }
        }

        /// 形如 `( 1, 2 )`.
        impl<T: fmt::Display> fmt::Display for $vec<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let parts = [$(self.$f.to_string()),+];
                write!(f, "( {} )", parts.join(", "))
            }
        }
    };
}

impl_vector!(Vector2, x, y);
impl_vector!(Vector3, x, y, z);

impl<T: Copy + Sub<Output = T> + Mul<Output = T>> Vector2<T> {
    /// 外积的 z 分量 (有向面积).
    #[inline]
    pub fn outer(&self, rhs: &Self) -> T {
        self.x * rhs.y - self.y * rhs.x
    }
}

impl<T: Copy + Sub<Output = T> + Mul<Output = T>> Vector3<T> {
    /// 外积.
    #[inline]
    pub fn outer(&self, rhs: &Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }
}
