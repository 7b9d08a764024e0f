//! Gesture injection: the virtual touchscreen finished gestures are played on.

use anyhow::Result;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use crate::config::Output;
use crate::path::Point;
use crate::stroke::{Gesture, StrokeId};

/// Consumer of finished gestures. Returns whether the gesture was accepted for execution.
pub trait Injector {
    fn inject(&mut self, gesture: Gesture) -> bool;
}

impl<T: Injector + ?Sized> Injector for Box<T> {
    fn inject(&mut self, gesture: Gesture) -> bool {
        (**self).inject(gesture)
    }
}

/// Accepts and drops everything.
#[derive(Debug, Default)]
pub struct NoopInjector;

impl Injector for NoopInjector {
    fn inject(&mut self, gesture: Gesture) -> bool {
        debug!(
            "noop: dropping gesture ({} strokes, {} ms)",
            gesture.len(),
            gesture.duration_ms()
        );
        true
    }
}

/// Hands gestures to a playback thread driving a uinput multi-touch device.
/// Dropping it waits for queued gestures to finish playing.
pub struct UinputInjector {
    tx: Option<Sender<Gesture>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl UinputInjector {
    pub fn new(output: &Output) -> Result<Self> {
        let dev = TouchDevice::create(output)?;
        let step = Duration::from_millis(output.step_ms);
        let max_contacts = output.max_contacts as usize;
        let (tx, rx) = mpsc::channel::<Gesture>();
        let handle = thread::spawn(move || {
            // let udev and the compositor pick up the new device
            thread::sleep(Duration::from_millis(200));
            let mut player = Player::new(dev, max_contacts);
            for gesture in rx {
                if let Err(e) = player.play(&gesture, step) {
                    error!("playback failed: {e}");
                }
            }
            player.release_all();
        });
        Ok(Self {
            tx: Some(tx),
            thread: Some(handle),
        })
    }
}

impl Injector for UinputInjector {
    fn inject(&mut self, gesture: Gesture) -> bool {
        self.tx.as_ref().is_some_and(|tx| tx.send(gesture).is_ok())
    }
}

impl Drop for UinputInjector {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                error!("playback thread panicked");
            }
        }
    }
}

/// Uinput when available, otherwise a no-op.
pub fn default_injector(output: &Output) -> Box<dyn Injector> {
    match UinputInjector::new(output) {
        Ok(inj) => Box::new(inj),
        Err(e) => {
            warn!("uinput not available ({e}); running in NO-OP mode");
            Box::new(NoopInjector)
        }
    }
}

/// Low-level multi-touch protocol B writes.
pub trait TouchSink {
    fn contact(&mut self, slot: i32, tracking_id: Option<i32>, at: Point) -> Result<()>;
    fn release(&mut self, slot: i32) -> Result<()>;
    fn sync(&mut self, touching: bool) -> Result<()>;
}

struct Contact {
    slot: i32,
    fresh: bool,
}

/// Keeps contacts alive across gestures for chains that will continue.
pub struct Player<S: TouchSink> {
    sink: S,
    max_contacts: usize,
    contacts: HashMap<StrokeId, Contact>,
    next_tracking_id: i32,
}

impl<S: TouchSink> Player<S> {
    pub fn new(sink: S, max_contacts: usize) -> Self {
        Self {
            sink,
            max_contacts,
            contacts: HashMap::new(),
            next_tracking_id: 0,
        }
    }

    fn free_slot(&self) -> Option<i32> {
        (0..self.max_contacts as i32).find(|s| self.contacts.values().all(|c| c.slot != *s))
    }

    fn touch(&mut self, id: StrokeId, at: Point) -> Result<()> {
        if !self.contacts.contains_key(&id) {
            let Some(slot) = self.free_slot() else {
                warn!("no free contact slot for stroke {}", id.0);
                return Ok(());
            };
            self.contacts.insert(id, Contact { slot, fresh: true });
        }
        let Some(c) = self.contacts.get_mut(&id) else {
            return Ok(());
        };
        let tracking_id = if c.fresh {
            c.fresh = false;
            self.next_tracking_id = self.next_tracking_id.wrapping_add(1) & 0xffff;
            Some(self.next_tracking_id)
        } else {
            None
        };
        self.sink.contact(c.slot, tracking_id, at)
    }

    fn lift(&mut self, id: StrokeId) -> Result<()> {
        match self.contacts.remove(&id) {
            Some(c) => self.sink.release(c.slot),
            None => Ok(()),
        }
    }

    pub fn active_contacts(&self) -> usize {
        self.contacts.len()
    }

    /// Play every segment from its start delay, sampling positions each `step`.
    pub fn play(&mut self, gesture: &Gesture, step: Duration) -> Result<()> {
        let end = gesture.duration_ms();
        let step_ms = (step.as_millis() as u64).max(1);
        let mut done = vec![false; gesture.len()];
        let mut t = 0u64;
        loop {
            for (i, sd) in gesture.strokes().iter().enumerate() {
                if done[i] || t < sd.start_delay_ms() {
                    continue;
                }
                let local = t - sd.start_delay_ms();
                let frac = local as f32 / sd.duration_ms() as f32;
                if let Some(at) = sd.path().point_at(frac) {
                    self.touch(sd.id(), at)?;
                }
                if local >= sd.duration_ms() {
                    done[i] = true;
                    if !sd.will_continue() {
                        self.lift(sd.id())?;
                    }
                }
            }
            self.sink.sync(!self.contacts.is_empty())?;
            if t >= end {
                break;
            }
            thread::sleep(step);
            t = (t + step_ms).min(end);
        }
        Ok(())
    }

    pub fn release_all(&mut self) {
        let ids: Vec<StrokeId> = self.contacts.keys().copied().collect();
        for id in ids {
            if let Err(e) = self.lift(id) {
                error!("release failed: {e}");
            }
        }
        if let Err(e) = self.sink.sync(false) {
            error!("sync failed: {e}");
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(target_os = "linux")]
pub struct TouchDevice {
    dev: uinput::device::Device,
}

#[cfg(target_os = "linux")]
impl TouchDevice {
    fn create(output: &Output) -> Result<Self> {
        use uinput::event::absolute::{Multi, Position};
        use uinput::event::controller::Digi;

        let dev = uinput::default()?
            .name(&output.name)?
            .event(Digi::Touch)?
            .event(Position::X)?
            .min(0)
            .max(output.width as i32 - 1)
            .event(Position::Y)?
            .min(0)
            .max(output.height as i32 - 1)
            .event(Multi::Slot)?
            .min(0)
            .max(output.max_contacts as i32 - 1)
            .event(Multi::TrackingId)?
            .min(0)
            .max(0xffff)
            .event(Multi::PositionX)?
            .min(0)
            .max(output.width as i32 - 1)
            .event(Multi::PositionY)?
            .min(0)
            .max(output.height as i32 - 1)
            .create()?;

        info!(
            "uinput: created virtual touchscreen {}x{}",
            output.width, output.height
        );
        Ok(Self { dev })
    }
}

#[cfg(target_os = "linux")]
impl TouchSink for TouchDevice {
    fn contact(&mut self, slot: i32, tracking_id: Option<i32>, at: Point) -> Result<()> {
        use uinput::event::absolute::{Multi, Position};
        let (x, y) = (at.x.round() as i32, at.y.round() as i32);
        self.dev.send(Multi::Slot, slot)?;
        if let Some(id) = tracking_id {
            self.dev.send(Multi::TrackingId, id)?;
        }
        self.dev.send(Multi::PositionX, x)?;
        self.dev.send(Multi::PositionY, y)?;
        // single-touch emulation follows the most recent contact
        self.dev.send(Position::X, x)?;
        self.dev.send(Position::Y, y)?;
        Ok(())
    }

    fn release(&mut self, slot: i32) -> Result<()> {
        use uinput::event::absolute::Multi;
        self.dev.send(Multi::Slot, slot)?;
        self.dev.send(Multi::TrackingId, -1)?;
        Ok(())
    }

    fn sync(&mut self, touching: bool) -> Result<()> {
        use uinput::event::controller::Digi;
        self.dev.send(Digi::Touch, i32::from(touching))?;
        self.dev.synchronize()?;
        Ok(())
    }
}

#[cfg(not(target_os = "linux"))]
pub struct TouchDevice;

#[cfg(not(target_os = "linux"))]
impl TouchDevice {
    fn create(_output: &Output) -> Result<Self> {
        Err(anyhow::anyhow!("uinput is only available on linux"))
    }
}

#[cfg(not(target_os = "linux"))]
impl TouchSink for TouchDevice {
    fn contact(&mut self, _slot: i32, _tracking_id: Option<i32>, _at: Point) -> Result<()> {
        Ok(())
    }
    fn release(&mut self, _slot: i32) -> Result<()> {
        Ok(())
    }
    fn sync(&mut self, _touching: bool) -> Result<()> {
        Ok(())
    }
}
