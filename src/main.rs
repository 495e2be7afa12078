use anyhow::Result;
use std::time::{Duration, Instant};
use std::fs::File;
use std::io::Write;
use log::{info, warn, error, debug, trace};

use driftboard::FrameDriver;
use driftboard_common::DriftConfig;

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting driftboard headless driver...");

    // --- Load Configuration ---
    let config = DriftConfig::load("config.toml")?;

    // --- Initialize Board ---
    info!("Spawning board...");
    let mut driver = FrameDriver::new(config)?;
    let (rows, cols) = driver.board().dimensions();
    info!("Board initialized with {} markers ({} rows x {} cols).", driver.board().len(), rows, cols);
    debug!("Configuration: {:#?}", driver.config());

    // --- Frame Loop Setup ---
    let timing = driver.config().timing.clone();
    let frame_ms = 1000.0 / timing.target_fps as f64;
    let total_frames = (timing.total_time_s * timing.target_fps).ceil() as u32;
    let record_interval_s = timing.record_interval_s.max(0.0);
    let mut record_interval_frames = (record_interval_s * timing.target_fps).max(1.0).round() as u32;

    if record_interval_s < 1.0 / timing.target_fps {
        warn!("Record interval ({:.3} s) is shorter than one frame ({:.3} s). Recording every frame.",
            record_interval_s, 1.0 / timing.target_fps);
        record_interval_frames = 1;
    }
    info!("Recording snapshot every {} frames ({:.2} seconds).",
        record_interval_frames, record_interval_frames as f32 / timing.target_fps);
    info!("Running {} frames at {} fps ({} mode).",
        total_frames, timing.target_fps, if timing.realtime { "realtime" } else { "fixed-step" });

    let start_time = Instant::now();
    let mut previous_print_time = start_time;

    // --- Initial Snapshot (frame = 0) ---
    info!("Recording initial snapshot (t=0)...");
    driver.record_snapshot();

    // --- Frame Loop ---
    for frame in 0..total_frames {
        let frame_start_time = Instant::now();

        // In realtime mode the driver sees actual wall-clock timestamps, so
        // the elapsed time per tick is whatever the host really delivered; in
        // fixed-step mode timestamps are synthesized for deterministic runs.
        let now_ms = if timing.realtime {
            start_time.elapsed().as_secs_f64() * 1000.0
        } else {
            (frame + 1) as f64 * frame_ms
        };
        driver.tick(now_ms);
        let frame_duration = frame_start_time.elapsed();

        // Print status periodically
        let current_time = Instant::now();
        let print_interval_secs = 5.0;
        let should_print_status = current_time.duration_since(previous_print_time).as_secs_f64() >= print_interval_secs;
        let is_record_frame = (frame + 1) % record_interval_frames == 0;
        let is_last_frame = frame == total_frames - 1;

        // Only log at intervals or when a snapshot is being taken
        if should_print_status || is_record_frame || is_last_frame {
            let elapsed_total = start_time.elapsed();
            info!(
                "Frame [{}/{}] ({:7.2} ms board time) | Mean speed: {:6.2} px/s | Frame Time: {:6.3} ms | Elapsed: {:.2} s",
                frame + 1,
                total_frames,
                now_ms,
                driver.board().mean_speed(),
                frame_duration.as_secs_f64() * 1000.0,
                elapsed_total.as_secs_f64()
            );
            previous_print_time = current_time;

            // --- Record Snapshot ---
            if is_record_frame || is_last_frame {
                driver.record_snapshot();
            }
        } else {
            trace!(
                "Frame [{}/{}] completed in {:.3} ms",
                frame + 1,
                total_frames,
                frame_duration.as_secs_f64() * 1000.0
            );
        }

        // Pace the loop to the target fps when running against the wall clock.
        if timing.realtime {
            let budget = Duration::from_secs_f64(frame_ms / 1000.0);
            if let Some(remaining) = budget.checked_sub(frame_start_time.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }

    let total_duration = start_time.elapsed();
    info!(
        "Frame loop finished in {:.3} seconds ({} frames).",
        total_duration.as_secs_f64(),
        driver.frame_count()
    );

    // --- Save Recorded Snapshots ---
    info!("Saving recorded snapshots...");
    let output_format = driver.config().output.format.as_deref().unwrap_or("json").to_string();
    let base_filename = driver.config().output.base_filename.clone();
    let snapshots = driver.snapshots();

    match output_format.as_str() {
        "json" => {
            let filename = format!("{}_snapshots.json", base_filename);
            match File::create(&filename) {
                Ok(mut file) => {
                    match serde_json::to_string(snapshots) {
                        Ok(json_string) => {
                            if let Err(e) = file.write_all(json_string.as_bytes()) {
                                error!("Error writing snapshot JSON to file '{}': {}", filename, e);
                            } else {
                                info!("All snapshots saved to {} ({} KB)", filename, json_string.len() / 1024);
                            }
                        }
                        Err(e) => error!("Error serializing snapshots to JSON: {}", e),
                    }
                }
                Err(e) => error!("Error creating snapshot file '{}': {}", filename, e),
            }
        },
        "bincode" => {
            // Binary format (much more compact)
            let filename = format!("{}_snapshots.bin", base_filename);
            match File::create(&filename) {
                Ok(file) => {
                    match bincode::serialize_into(file, snapshots) {
                        Ok(_) => {
                            info!("All snapshots saved to {} (binary format)", filename);
                        }
                        Err(e) => error!("Error serializing snapshots to bincode: {}", e),
                    }
                }
                Err(e) => error!("Error creating snapshot file '{}': {}", filename, e),
            }
        },
        "messagepack" => {
            // MessagePack format (compact and cross-platform)
            let filename = format!("{}_snapshots.msgpack", base_filename);
            match &mut File::create(&filename) {
                Ok(file) => {
                    match rmp_serde::encode::write(file, snapshots) {
                        Ok(_) => {
                            info!("All snapshots saved to {} (MessagePack format)", filename);
                        }
                        Err(e) => error!("Error serializing snapshots to MessagePack: {}", e),
                    }
                }
                Err(e) => error!("Error creating snapshot file '{}': {}", filename, e),
            }
        },
        other => {
            // Config validation rejects unknown formats, so this is unreachable
            // in practice; keep the fallback anyway.
            error!("Unknown output format: {}. Skipping snapshot output.", other);
        }
    }

    // Save final positions if requested (separate from full snapshots)
    if driver.config().output.save_final_positions {
        let final_positions = driver.board().positions();
        let filename = format!("{}_final_positions.csv", base_filename);

        match csv::Writer::from_path(&filename) {
            Ok(mut writer) => {
                writer.write_record(["x_px", "y_px"])?;
                for (x, y) in final_positions {
                    writer.write_record(&[format!("{:.4}", x), format!("{:.4}", y)])?;
                }
                writer.flush()?;
                info!("Final positions saved to {}", filename);
            }
            Err(e) => error!("Error saving CSV file '{}': {}", filename, e),
        }
    } else {
        info!("Skipping saving final positions as per config.");
    }

    info!("Done.");
    Ok(())
}
