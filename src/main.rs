//! Headless driver: opens a file or directory, plays the open animation and
//! a number of forward switches through the real decode pipeline, then logs
//! what happened.
//!
//! Usage: `imagura <file-or-dir> [--switches N]`

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use imagura::anim::Direction;
use imagura::clock::SystemClock;
use imagura::decode::{FileProbe, ImageDecoder};
use imagura::gpu::MemoryGpu;
use imagura::images::ImageList;
use imagura::{Viewer, ViewerConfig};

const FRAME: Duration = Duration::from_millis(16);
const SCREEN: (u32, u32) = (1920, 1080);
const RUN_LIMIT: Duration = Duration::from_secs(120);

struct Args {
    path: PathBuf,
    switches: usize,
}

fn parse_args() -> Result<Args> {
    let mut path = None;
    let mut switches = 0;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--switches" => {
                let value = args.next().context("--switches needs a value")?;
                switches = value
                    .parse()
                    .with_context(|| format!("Invalid switch count {:?}", value))?;
            }
            _ if path.is_none() => path = Some(PathBuf::from(arg)),
            _ => bail!("Unexpected argument {:?}", arg),
        }
    }
    let path = path.context("Usage: imagura <file-or-dir> [--switches N]")?;
    Ok(Args { path, switches })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("imagura=info".parse()?),
        )
        .init();

    let args = parse_args()?;
    let config = ViewerConfig::from_env();
    let (list, start) = ImageList::from_path(&args.path)?;
    if list.is_empty() {
        bail!("No supported images in {:?}", args.path);
    }
    info!(path = ?args.path, images = list.len(), start, "Loaded image list");

    let decoder = Arc::new(ImageDecoder::new(config.max_file_bytes));
    let probe = Box::new(FileProbe::new(
        config.heavy_file_bytes,
        config.heavy_min_short_side,
    ));
    let switch_duration = config.anim_switch_keys;
    let mut viewer = Viewer::new(
        config,
        decoder,
        probe,
        MemoryGpu::new(),
        Arc::new(SystemClock),
        SCREEN,
    )?;

    let started = Instant::now();
    viewer.open(list, start, true);

    let mut remaining = args.switches;
    let mut frames = 0u64;
    loop {
        viewer.tick();
        let _frame = viewer.current_frame();
        frames += 1;

        let at_end = viewer.index() + 1 >= viewer.list().len();
        if remaining > 0 && !at_end && !viewer.animations().is_switching() && !viewer.is_loading() {
            viewer.start_switch(Direction::Next, switch_duration);
            remaining -= 1;
        }
        if (remaining == 0 || at_end) && viewer.is_idle() {
            break;
        }
        if started.elapsed() > RUN_LIMIT {
            warn!("Run limit reached before the viewer went idle");
            break;
        }
        thread::sleep(FRAME);
    }

    info!(
        frames,
        index = viewer.index(),
        switches = args.switches - remaining,
        uploads = viewer.gpu().upload_count(),
        live_textures = viewer.gpu().live_count(),
        resident_mb = viewer.gpu().resident_bytes() / (1024 * 1024),
        thumbnails = viewer.thumbnails().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Run complete"
    );

    viewer.shutdown();
    Ok(())
}
