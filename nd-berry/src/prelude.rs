//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx3d;

pub use crate::array::{Array, Array1, Array2, Array3, Buffered, Margin, Resolution, Spatial};
pub use crate::{ArrayError, ArrayResult, Vector2, Vector3};

pub use crate::filter::{harris, harris_in_place, HarrisParams};
pub use crate::io::{decode_gray, encode_gray, open_gray, save_gray, GrayFormat};
pub use crate::minimization::{brent, golden_section, gradient_descent, gradient_descent_numeric, powell};
pub use crate::mixture::{estimate_mixture, estimate_mixture2, Distribution, Distribution2, EmParams};
