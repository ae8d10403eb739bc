pub mod renderer;
pub mod selector;

pub use renderer::{
    EventHandler, ImageBuilder, ImageData, ImageListener, OperatorFactory, Painter,
    PixelOperator, Renderer, SharedModel,
};
pub use selector::{ViewerBuildArgs, ViewerSelector, ViewerTypeBuilder};
