mod canvas;
mod font;
mod renderer;
mod transform;

pub(crate) use font::measure_text;
pub use renderer::Renderer;
pub use transform::world_to_screen_px;
