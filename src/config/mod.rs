mod render_config;

pub use render_config::RenderConfig;
