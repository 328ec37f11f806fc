//! Lantern command line renderer.
//!
//! Builds one of the demo scenes, renders it on a worker pool and writes the
//! result to disk. `RUST_LOG` controls log verbosity (default `info`).

mod scenes;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lantern_renderer::{RenderSettings, Renderer};

use scenes::ScenePreset;

/// Lantern, an offline Monte Carlo path tracer
#[derive(Parser, Debug)]
#[command(
    name = "lantern",
    version,
    about = "Offline Monte Carlo path tracer",
    after_help = "EXAMPLES:\n  \
                  lantern --scene cornell-box --spp 100 -o cornell.ppm\n  \
                  lantern --scene simple-sphere --width 400 --seed 1 -o sphere.png\n  \
                  lantern --scene quantum-lab --settings lab.json -j 8"
)]
struct Cli {
    /// Scene preset to render
    #[arg(short, long, value_enum, default_value_t = ScenePreset::CornellBox)]
    scene: ScenePreset,

    /// JSON settings file replacing the preset's own settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Override image width in pixels
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Override samples per pixel (rounded down to a perfect square)
    #[arg(long)]
    spp: Option<u32>,

    /// Override maximum bounce depth
    #[arg(long)]
    depth: Option<u32>,

    /// Fix the random seed for a reproducible render
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads, 0 uses every available core
    #[arg(short = 'j', long, default_value_t = 0)]
    threads: usize,

    /// Output file; `.ppm` is written as plain text, other extensions by encoder
    #[arg(short, long, default_value = "image.ppm")]
    output: PathBuf,
}

impl Cli {
    /// Start from the settings file or the preset and apply overrides.
    fn resolve_settings(&self, preset: RenderSettings) -> Result<RenderSettings> {
        let mut settings = match &self.settings {
            Some(path) => RenderSettings::from_json_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => preset,
        };

        if let Some(width) = self.width {
            settings.image_width = width;
        }
        if let Some(spp) = self.spp {
            settings.samples_per_pixel = spp;
        }
        if let Some(depth) = self.depth {
            settings.max_depth = depth;
        }
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }

        Ok(settings)
    }

    fn resolve_threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    log::info!("Building scene {:?}", cli.scene);
    let scene = cli.scene.build();
    let settings = cli.resolve_settings(scene.settings.clone())?;
    let threads = cli.resolve_threads();

    let renderer = Renderer::new(&settings).context("Invalid render settings")?;
    let image = renderer
        .render(&scene.world, &scene.lights, threads)
        .context("Render failed")?;

    image
        .save(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_on_top_of_preset() {
        let cli = Cli::parse_from([
            "lantern", "--scene", "simple-sphere", "-W", "64", "--spp", "4", "--seed", "3",
        ]);
        assert_eq!(cli.scene, ScenePreset::SimpleSphere);

        let preset = cli.scene.build().settings;
        let settings = cli.resolve_settings(preset.clone()).unwrap();
        assert_eq!(settings.image_width, 64);
        assert_eq!(settings.samples_per_pixel, 4);
        assert_eq!(settings.seed, Some(3));
        assert_eq!(settings.max_depth, preset.max_depth);
        assert_eq!(cli.output, PathBuf::from("image.ppm"));
    }

    #[test]
    fn test_explicit_thread_count_is_kept() {
        let cli = Cli::parse_from(["lantern", "-j", "3"]);
        assert_eq!(cli.resolve_threads(), 3);

        let cli = Cli::parse_from(["lantern"]);
        assert!(cli.resolve_threads() >= 1);
    }

    #[test]
    fn test_missing_settings_file_is_an_error() {
        let cli = Cli::parse_from(["lantern", "--settings", "/nonexistent/lantern.json"]);
        let error = cli.resolve_settings(RenderSettings::default()).unwrap_err();
        assert!(error.to_string().contains("Failed to load settings"));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
