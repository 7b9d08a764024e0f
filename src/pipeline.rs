use anyhow::{Result, anyhow};
use log::{error, info, warn};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use evdev::Device;
use signal_hook::consts::{SIGINT, SIGTERM};

use crate::actions::Injector;
use crate::config::Profile;
use crate::gestures::{GestureAssembler, MotionFrame};
use crate::input::{self, TouchReader};

fn stop_flag() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    for sig in [SIGINT, SIGTERM] {
        signal_hook::flag::register(sig, Arc::clone(&stop))?;
    }
    Ok(stop)
}

/// Re-synthesise the touches of a physical device on the virtual touchscreen.
pub fn run_mirror<I: Injector>(
    profile: &Profile,
    device: Option<&str>,
    assembler: &mut GestureAssembler<I>,
) -> Result<()> {
    let path = match device {
        Some(p) => p.to_string(),
        None => input::discover_multitouch()
            .into_iter()
            .next()
            .map(|d| d.path)
            .ok_or_else(|| anyhow!("no multitouch devices detected"))?,
    };
    let mut dev = Device::open(&path).map_err(|e| anyhow!("failed to open {path}: {e}"))?;
    dev.set_nonblocking(true)?;

    let (x_min, x_max, y_min, y_max) = input::axis_ranges(&dev);
    let mut reader = TouchReader::new(
        profile.output.width,
        profile.output.height,
        profile.output.max_contacts as usize,
    );
    reader.set_norm_ranges(x_min, x_max, y_min, y_max);

    dev.grab()?;
    info!("mirroring {path} (grabbed)");

    let stop = stop_flag()?;
    let start = Instant::now();
    while !stop.load(Ordering::Relaxed) {
        let mut any_event = false;
        // would-block shows up as an error; nothing to read this round
        if let Ok(events) = dev.fetch_events() {
            for ev in events {
                any_event = true;
                let now = start.elapsed().as_millis() as i64;
                for frame in reader.on_event(&ev, now) {
                    if let Err(e) = assembler.process_frame(&frame) {
                        error!("dispatch failed: {e}");
                    }
                }
            }
        }
        if !any_event {
            thread::sleep(Duration::from_millis(4));
        }
    }

    if let Err(e) = dev.ungrab() {
        warn!("ungrab failed: {e}");
    }
    info!("mirror stopped");
    Ok(())
}

/// Feed a JSON-lines frame recording through the assembler.
///
/// With `single`, only the first pointer of every frame is used and frames go through the
/// single-point path. Returns the number of frames that failed to dispatch.
pub fn run_replay<I: Injector>(
    file: &Path,
    single: bool,
    realtime: bool,
    assembler: &mut GestureAssembler<I>,
) -> Result<usize> {
    let f = File::open(file).map_err(|e| anyhow!("failed to open {}: {e}", file.display()))?;
    let mut failed = 0;
    let mut last_time: Option<i64> = None;

    for (n, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let frame: MotionFrame = serde_json::from_str(line)
            .map_err(|e| anyhow!("{}:{}: {e}", file.display(), n + 1))?;

        if realtime {
            if let Some(prev) = last_time {
                let gap = frame.event_time.saturating_sub(prev).max(0) as u64;
                thread::sleep(Duration::from_millis(gap));
            }
            last_time = Some(frame.event_time);
        }

        let res = if single {
            match frame.pointers.first() {
                Some(p) => assembler.process_single_point(
                    frame.down_time,
                    frame.event_time,
                    frame.action,
                    p.x,
                    p.y,
                ),
                None => Ok(()),
            }
        } else {
            assembler.process_frame(&frame)
        };
        if let Err(e) = res {
            warn!("{}:{}: {e}", file.display(), n + 1);
            failed += 1;
        }
    }
    Ok(failed)
}
