use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing::info;
use winit::window::Window;

use armature_render::armature::{ArmatureDisplay, Factory, StaticArmature};
use armature_render::config::RenderConfig;
use armature_render::model::{DisplayData, Matrix};
use armature_render::render::window::{GameLoop, WindowConfig, run_app};
use armature_render::render::{Renderer, WgpuRenderer};
use armature_render::traits::armature::{Armature, SlotVisitor};
use armature_render::traits::render::RenderBackend;
use armature_render::util::logging::init_logging;

#[derive(Parser, Debug)]
#[command(
    name = "atlas-viewer",
    about = "Draw every region of a texture atlas through the mesh batcher"
)]
struct Args {
    /// Texture atlas JSON file.
    atlas: PathBuf,

    /// Atlas image; defaults to the atlas's imagePath next to the JSON file.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Render config JSON file.
    #[arg(long, env = "ARMATURE_RENDER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long)]
    verbose: bool,

    /// Also write logs to a daily file in this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

const CELL_PADDING: f32 = 16.0;
const SWAY_RADIANS: f32 = 0.25;

/// Every atlas region as one centred quad slot, laid out in a grid and
/// swaying around its own centre.
struct RegionGrid {
    inner: StaticArmature,
    centers: Vec<(f32, f32)>,
    time: f32,
}

impl RegionGrid {
    fn build(factory: &Factory, atlas_name: &str, canvas_width: u32) -> Result<Self> {
        let atlas = factory
            .texture_atlas(atlas_name)
            .ok_or_else(|| anyhow!("atlas {atlas_name:?} is not registered"))?;

        let cell = atlas
            .regions
            .values()
            .map(|r| r.region.width.max(r.region.height))
            .fold(0.0_f32, f32::max)
            + CELL_PADDING;
        let columns = ((canvas_width as f32 / cell).floor() as usize).max(1);

        let mut inner = StaticArmature::new(atlas_name);
        inner.add_animation("sway");
        let mut centers = Vec::new();
        for (i, name) in atlas.region_names().enumerate() {
            let frame =
                factory.build_display_frame(atlas_name, name, Some(DisplayData::image(0.5, 0.5)));
            inner.add_slot(name, frame);
            let x = (i % columns) as f32 * cell + cell * 0.5;
            let y = (i / columns) as f32 * cell + cell * 0.5;
            centers.push((x, y));
        }
        info!("laid out {} regions in {} columns", centers.len(), columns);

        let mut grid = Self {
            inner,
            centers,
            time: 0.0,
        };
        grid.pose();
        Ok(grid)
    }

    fn pose(&mut self) {
        for (i, &(x, y)) in self.centers.iter().enumerate() {
            let angle = (self.time * 1.5 + i as f32 * 0.4).sin() * SWAY_RADIANS;
            self.inner
                .set_slot_transform(i, Matrix::from_transform(x, y, angle, 1.0, 1.0));
        }
    }
}

impl Armature for RegionGrid {
    fn advance_time(&mut self, dt: f32) {
        self.time += dt;
        self.inner.advance_time(dt);
        self.pose();
    }

    fn play(&mut self, animation: &str) -> bool {
        self.inner.play(animation)
    }

    fn visit_slots(&mut self, visitor: &mut SlotVisitor<'_>) -> Result<()> {
        self.inner.visit_slots(visitor)
    }
}

struct AtlasViewer {
    args: Args,
    config: RenderConfig,
    renderer: Option<Renderer<WgpuRenderer>>,
    displays: Vec<ArmatureDisplay>,
}

impl GameLoop for AtlasViewer {
    fn init(&mut self, window: Arc<Window>) -> Result<()> {
        let backend = pollster::block_on(WgpuRenderer::new(window, &self.config))?;
        let mut renderer = Renderer::new(backend, &self.config);

        let mut factory = Factory::new();
        let name =
            factory.load_texture_atlas(&mut renderer, &self.args.atlas, self.args.image.as_deref())?;

        let (width, _) = renderer.backend().screen_size();
        let grid = RegionGrid::build(&factory, &name, width)?;
        let mut display = ArmatureDisplay::new(Box::new(grid));
        display.play("sway");

        self.displays.push(display);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn update(&mut self, dt: f32) {
        for display in &mut self.displays {
            display.advance_time(dt);
        }
    }

    fn render(&mut self) -> Result<()> {
        let Some(renderer) = &mut self.renderer else {
            return Ok(());
        };
        renderer.render_frame(&mut self.displays)
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(renderer) = &mut self.renderer {
            renderer.backend_mut().resize(width, height);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_dir.as_deref(), args.verbose)?;
    info!("atlas-viewer starting");

    let config = match &args.config {
        Some(path) => RenderConfig::load_from(path)?,
        None => RenderConfig::default(),
    };
    config.validate()?;

    let window = WindowConfig::from_render_config("atlas-viewer", &config);
    let viewer = AtlasViewer {
        args,
        config,
        renderer: None,
        displays: Vec::new(),
    };
    run_app(window, viewer)
}
