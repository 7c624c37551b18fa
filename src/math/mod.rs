pub mod layout;
pub mod tensor;
pub mod view;

pub use layout::Layout;
pub use tensor::Tensor;
pub use view::{TensorView, TensorViewMut};
