//! 二维图像滤波与角点检测.

mod corner;
mod linear;

pub use corner::{harris, harris_corners, harris_in_place, harris_mask, Corner, CornerError, HarrisParams};
pub use linear::{average_filter, linear_filter, SOBEL_X, SOBEL_Y};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::prelude::{ParallelIterator, IndexedParallelIterator, ParallelSliceMut};
    }
}

/// 把按行存储的 `data` (每行 `width` 个元素) 逐行交给 `op` 处理.
///
/// 开启 `rayon` 特性时各行并行处理. 各行互不重叠, 返回即代表全部完成.
pub(crate) fn for_each_row<U, F>(data: &mut [U], width: usize, op: F)
where
    U: Send,
    F: Fn(usize, &mut [U]) + Sync + Send,
{
    if width == 0 {
        return;
    }
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            data.par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| op(y, row));
        } else {
            data.chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| op(y, row));
        }
    }
}
