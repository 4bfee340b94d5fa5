pub mod decode;
pub mod engine;
pub mod path;

pub use engine::{
    MovieValues, OpResult, Operation, ParentRef, ReviewValues, RowValues, Store, StoreChange,
    VideoValues,
};
pub use path::ResourcePath;
