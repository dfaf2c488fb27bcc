//! Pure data-side building blocks of a scatter view. Nothing in here touches
//! egui input or rendering.

pub mod color_scale;
pub mod lasso;
pub mod legend;
pub mod points;
pub mod scale;
pub mod selection;
