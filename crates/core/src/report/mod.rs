pub mod fallback;
pub mod html;
pub mod prompt;

pub use fallback::render_fallback;
pub use prompt::build_prompt;
