use anyhow::{Context, Result};
use clap::Parser;
use driftboard_common::{DriftConfig, Snapshot};
use env_logger::Builder;
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, LevelFilter};
use palette::{FromColor, Hsv, Srgb};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

/// Command-line arguments for the visualizer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input snapshot file path (.json, .bin or .msgpack)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the rendered PNG frames
    #[arg(short, long, default_value = "frames")]
    output: PathBuf,

    /// Width of the output frames in pixels
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Height of the output frames in pixels (calculated from the viewport
    /// aspect ratio if not provided)
    #[arg(long)]
    height: Option<u32>,

    /// Optional path to the config.toml file to get the exact board viewport
    #[arg(long)]
    config: Option<PathBuf>,

    /// Viewport width in board px (used if config is not provided)
    #[arg(long, default_value_t = 1000.0)]
    viewport_width_px: f32,

    /// Viewport height in board px (used if config is not provided)
    #[arg(long, default_value_t = 800.0)]
    viewport_height_px: f32,

    /// Marker radius in board px
    #[arg(long, default_value_t = 6.0)]
    marker_radius_px: f32,

    /// Marker color - use "palette" for a distinct color per marker, or a
    /// specific color name (black, white, red, green, blue, yellow, cyan, magenta)
    #[arg(long, default_value = "palette")]
    color: String,

    /// Background color - name of the color for the background
    #[arg(long, default_value = "white")]
    bg_color: String,
}

// Color definitions for named colors (RGBA format)
const COLOR_MAP: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
];

/// Parse a color name to RGBA values
fn parse_color(color_name: &str) -> [u8; 4] {
    for &(name, color) in COLOR_MAP {
        if name.eq_ignore_ascii_case(color_name) {
            return color;
        }
    }
    // Default to black if color not found
    warn!("Color '{}' not recognized, using black.", color_name);
    [0, 0, 0, 255]
}

/// Generate a color palette with a specified number of colors
fn generate_color_palette(count: usize) -> Vec<[u8; 4]> {
    let mut colors = Vec::with_capacity(count);
    let mut rng = rand::rng();

    use rand::Rng;

    for i in 0..count {
        // Use HSV color space for better distribution
        let hue = (i as f32) / (count as f32);
        let saturation = 0.7 + rng.random_range(-0.1..0.1);
        let value = 0.8 + rng.random_range(-0.1..0.1);

        let hsv = Hsv::new(hue * 360.0, saturation, value);
        let rgb = Srgb::from_color(hsv);

        let r = (rgb.red * 255.0) as u8;
        let g = (rgb.green * 255.0) as u8;
        let b = (rgb.blue * 255.0) as u8;

        colors.push([r, g, b, 255]);
    }

    // Shuffle the colors to make adjacent grid cells less similar
    use rand::seq::SliceRandom;
    colors.shuffle(&mut rng);

    colors
}

/// Load snapshots from a file, picking the decoder from the extension.
fn load_snapshots(path: &PathBuf) -> Result<Vec<Snapshot>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open snapshot file '{}'", path.display()))?;
    let reader = BufReader::new(file);

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let snapshots: Vec<Snapshot> = match extension.as_str() {
        "json" => serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse JSON snapshots from '{}'", path.display()))?,
        "bin" => bincode::deserialize_from(reader)
            .with_context(|| format!("Failed to parse bincode snapshots from '{}'", path.display()))?,
        "msgpack" => rmp_serde::from_read(reader)
            .with_context(|| format!("Failed to parse MessagePack snapshots from '{}'", path.display()))?,
        other => anyhow::bail!(
            "Unsupported snapshot extension '{}' (expected .json, .bin or .msgpack).",
            other
        ),
    };

    Ok(snapshots)
}

/// Draw one snapshot as an RGBA frame.
///
/// Board coordinates are CSS-style: origin top-left, y growing downwards, so
/// no axis flip is needed.
fn draw_frame(
    snapshot: &Snapshot,
    width: u32,
    height: u32,
    scale_x: f32,
    scale_y: f32,
    marker_radius_px: f32,
    bg_color: [u8; 4],
    color_palette: &[[u8; 4]],
) -> RgbaImage {
    let mut image = ImageBuffer::from_pixel(
        width,
        height,
        Rgba([bg_color[0], bg_color[1], bg_color[2], bg_color[3]]),
    );

    if let Some(positions) = &snapshot.positions {
        let radius = (marker_radius_px * scale_x.min(scale_y)).round().max(1.0) as i32;

        for (i, &(x, y)) in positions.iter().enumerate() {
            let px = (x * scale_x).round() as i32;
            let py = (y * scale_y).round() as i32;

            // Only draw if within bounds
            if px >= 0 && px < width as i32 && py >= 0 && py < height as i32 {
                let color = color_palette[i % color_palette.len()];
                draw_filled_circle_mut(&mut image, (px, py), radius, Rgba(color));
            }
        }
    }

    image
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    Builder::from_default_env()
        .filter(None, LevelFilter::Info)
        .init();

    info!("Starting Driftboard Visualizer...");
    info!("Input file: {}", args.input.display());
    info!("Output directory: {}", args.output.display());

    // --- Determine Board Viewport ---
    // The viewport spans from the origin to the far bound plus the same
    // margin the near bound leaves, matching the embedding page layout.
    let (viewport_width_px, viewport_height_px) = if let Some(config_path) = &args.config {
        match DriftConfig::load(config_path) {
            Ok(config) => {
                info!("Loaded board viewport from {}", config_path.display());
                let bounds = config.motion.bounds;
                (bounds.x.max + bounds.x.min, bounds.y.max + bounds.y.min)
            }
            Err(e) => {
                warn!(
                    "Failed to load config file '{}': {}. Using default/provided viewport.",
                    config_path.display(),
                    e
                );
                (args.viewport_width_px, args.viewport_height_px)
            }
        }
    } else {
        info!("Using provided viewport dimensions.");
        (args.viewport_width_px, args.viewport_height_px)
    };

    let width = args.width;
    let height = args
        .height
        .unwrap_or_else(|| (width as f32 * viewport_height_px / viewport_width_px).round() as u32);
    let scale_x = width as f32 / viewport_width_px;
    let scale_y = height as f32 / viewport_height_px;

    info!("Board viewport: {:.0} px x {:.0} px", viewport_width_px, viewport_height_px);
    info!("Frame dimensions: {}x{}", width, height);

    // --- Load Snapshots ---
    let snapshots = load_snapshots(&args.input)?;
    if snapshots.is_empty() {
        anyhow::bail!("Snapshot file '{}' contains no snapshots.", args.input.display());
    }
    info!("Loaded {} snapshots.", snapshots.len());

    let with_positions = snapshots.iter().filter(|s| s.positions.is_some()).count();
    if with_positions < snapshots.len() {
        warn!(
            "{} of {} snapshots carry no positions and will render as empty frames.",
            snapshots.len() - with_positions,
            snapshots.len()
        );
    }

    // --- Prepare Colors ---
    let bg_color = parse_color(&args.bg_color);
    let marker_count = snapshots
        .iter()
        .find_map(|s| s.positions.as_ref().map(|p| p.len()))
        .unwrap_or(1);
    let color_palette: Vec<[u8; 4]> = if args.color.eq_ignore_ascii_case("palette") {
        generate_color_palette(marker_count)
    } else {
        vec![parse_color(&args.color)]
    };

    // --- Render Frames in Parallel ---
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory '{}'", args.output.display()))?;

    let progress = ProgressBar::new(snapshots.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{wide_bar} {pos}/{len} frames ({eta})")
            .expect("progress template should be valid"),
    );

    let start_time = Instant::now();
    let results: Vec<Result<()>> = snapshots
        .par_iter()
        .enumerate()
        .map(|(frame_index, snapshot)| {
            let image = draw_frame(
                snapshot,
                width,
                height,
                scale_x,
                scale_y,
                args.marker_radius_px,
                bg_color,
                &color_palette,
            );
            let filename = args.output.join(format!("frame_{:05}.png", frame_index));
            image
                .save(&filename)
                .with_context(|| format!("Failed to save frame '{}'", filename.display()))?;
            progress.inc(1);
            Ok(())
        })
        .collect();
    progress.finish();

    for result in results {
        result?;
    }

    info!(
        "Rendered {} frames to '{}' in {:.2} s.",
        snapshots.len(),
        args.output.display(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
