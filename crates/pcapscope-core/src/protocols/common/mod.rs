pub(crate) mod view;

pub(crate) use view::{ByteView, OutOfBounds};
