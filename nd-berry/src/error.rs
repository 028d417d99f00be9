//! 容器访问与分配的运行时错误.

/// 数组容器的可恢复错误.
///
/// 坐标统一以三维形式记录, 低维数组未使用的轴分别记为 `0` (索引) 和 `1` (尺寸).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArrayError {
    /// 带检查的访问越界.
    #[error("索引 {index:?} 越界, 数组尺寸为 {extents:?}")]
    IndexOutOfRange {
        /// 越界的坐标.
        index: [isize; 3],
        /// 被访问数组 (或其逻辑区域) 的尺寸.
        extents: [usize; 3],
    },

    /// 给定数据与所需形状不符.
    #[error("形状不符: 需要 {expected:?}, 实际为 {actual:?}")]
    ShapeMismatch {
        /// 需要的形状.
        expected: [usize; 3],
        /// 实际的形状.
        actual: [usize; 3],
    },

    /// 底层存储分配失败.
    #[error("无法为 {count} 个元素分配存储空间")]
    AllocationFailed {
        /// 请求的元素个数.
        count: usize,
    },
}

/// 容器操作的返回类型.
pub type ArrayResult<T> = Result<T, ArrayError>;

impl ArrayError {
    /// 由无符号坐标构造越界错误.
    pub(crate) fn out_of_range(index: [usize; 3], extents: [usize; 3]) -> Self {
        Self::IndexOutOfRange {
            index: index.map(|v| v as isize),
            extents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ArrayError;

    #[test]
    fn test_error_message() {
        let e = ArrayError::out_of_range([4, 0, 0], [4, 1, 1]);
        assert_eq!(e.to_string(), "索引 [4, 0, 0] 越界, 数组尺寸为 [4, 1, 1]");
        let e = ArrayError::AllocationFailed { count: 7 };
        assert!(e.to_string().contains('7'));
    }
}
