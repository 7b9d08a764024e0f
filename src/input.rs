//! Input device discovery and multi-touch frame extraction (evdev 0.13.2 compatible)

use evdev::{AbsoluteAxisCode, Device, EventType, InputEvent, SynchronizationCode};

use crate::gestures::{MotionAction, MotionFrame};
use crate::path::Point;

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
}

pub fn discover_multitouch() -> Vec<DeviceInfo> {
    let mut out = vec![];
    let Ok(rd) = std::fs::read_dir("/dev/input") else {
        return out;
    };
    for e in rd.flatten() {
        let p = e.path();
        let is_event = p
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.starts_with("event"));
        if !is_event {
            continue;
        }
        if let Ok(dev) = Device::open(&p) {
            if is_multitouch(&dev) {
                out.push(DeviceInfo {
                    path: p.display().to_string(),
                    name: dev.name().unwrap_or("unknown").to_string(),
                });
            }
        }
    }
    out
}

fn is_multitouch(dev: &Device) -> bool {
    let has_abs = dev.supported_events().contains(EventType::ABSOLUTE);
    let has_mt = dev.supported_absolute_axes().is_some_and(|a| {
        a.contains(AbsoluteAxisCode::ABS_MT_SLOT)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_X)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_Y)
    });
    has_abs && has_mt
}

/// Raw axis range of a device, read from its absinfo when available.
pub fn axis_ranges(dev: &Device) -> (i32, i32, i32, i32) {
    let (mut x, mut y) = ((0, 4096), (0, 4096));
    if let Ok(infos) = dev.get_absinfo() {
        for (code, info) in infos {
            if code == AbsoluteAxisCode::ABS_MT_POSITION_X {
                x = (info.minimum(), info.maximum());
            } else if code == AbsoluteAxisCode::ABS_MT_POSITION_Y {
                y = (info.minimum(), info.maximum());
            }
        }
    }
    (x.0, x.1, y.0, y.1)
}

#[derive(Debug, Clone)]
struct Contact {
    tracking_id: i32, // -1 = inactive
    x: f32,
    y: f32,
    moved: bool,
}

const IDLE: Contact = Contact {
    tracking_id: -1,
    x: 0.0,
    y: 0.0,
    moved: false,
};

/// Converts protocol B slot events into frames, one pointer transition per frame.
#[derive(Debug)]
pub struct TouchReader {
    slots: Vec<Contact>,
    /// `None` while the device addresses a slot beyond `slots`.
    cur_slot: Option<usize>,
    /// Slots reported by the previous frame, in pointer-index order.
    reported: Vec<usize>,
    down_time: i64,
    // normalization
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
    width: f32,
    height: f32,
}

impl TouchReader {
    /// Contacts in slots at or above `max_slots` are ignored.
    pub fn new(width: u32, height: u32, max_slots: usize) -> Self {
        Self {
            slots: vec![IDLE; max_slots.max(1)],
            cur_slot: Some(0),
            reported: Vec::new(),
            down_time: 0,
            x_min: 0,
            x_max: 4096,
            y_min: 0,
            y_max: 4096,
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn set_norm_ranges(&mut self, x_min: i32, x_max: i32, y_min: i32, y_max: i32) {
        self.x_min = x_min;
        self.x_max = x_max.max(x_min + 1);
        self.y_min = y_min;
        self.y_max = y_max.max(y_min + 1);
    }

    fn slot(&mut self) -> Option<&mut Contact> {
        self.cur_slot.and_then(|s| self.slots.get_mut(s))
    }

    pub fn on_slot(&mut self, slot: i32) {
        self.cur_slot = usize::try_from(slot)
            .ok()
            .filter(|s| *s < self.slots.len());
    }

    pub fn on_tracking_id(&mut self, tracking_id: i32) {
        if let Some(c) = self.slot() {
            c.tracking_id = tracking_id;
        }
    }

    pub fn on_pos_x(&mut self, raw: i32) {
        let nx = ((raw - self.x_min) as f32 / (self.x_max - self.x_min) as f32).clamp(0.0, 1.0);
        let x = nx * self.width;
        if let Some(c) = self.slot() {
            c.x = x;
            c.moved = true;
        }
    }

    pub fn on_pos_y(&mut self, raw: i32) {
        let ny = ((raw - self.y_min) as f32 / (self.y_max - self.y_min) as f32).clamp(0.0, 1.0);
        let y = ny * self.height;
        if let Some(c) = self.slot() {
            c.y = y;
            c.moved = true;
        }
    }

    /// Feed one evdev event; frames come out on `SYN_REPORT`.
    pub fn on_event(&mut self, ev: &InputEvent, now_ms: i64) -> Vec<MotionFrame> {
        if ev.event_type() == EventType::ABSOLUTE {
            match ev.code() {
                c if c == AbsoluteAxisCode::ABS_MT_SLOT.0 => self.on_slot(ev.value()),
                c if c == AbsoluteAxisCode::ABS_MT_TRACKING_ID.0 => self.on_tracking_id(ev.value()),
                c if c == AbsoluteAxisCode::ABS_MT_POSITION_X.0 => self.on_pos_x(ev.value()),
                c if c == AbsoluteAxisCode::ABS_MT_POSITION_Y.0 => self.on_pos_y(ev.value()),
                _ => {}
            }
        } else if ev.event_type() == EventType::SYNCHRONIZATION
            && ev.code() == SynchronizationCode::SYN_REPORT.0
        {
            return self.on_syn_report(now_ms);
        }
        Vec::new()
    }

    fn frame(
        &self,
        action: MotionAction,
        action_index: usize,
        order: &[usize],
        now: i64,
    ) -> MotionFrame {
        MotionFrame {
            action,
            action_index,
            down_time: self.down_time,
            event_time: now,
            pointers: order
                .iter()
                .map(|&s| Point::new(self.slots[s].x, self.slots[s].y))
                .collect(),
        }
    }

    pub fn on_syn_report(&mut self, now_ms: i64) -> Vec<MotionFrame> {
        let mut frames = Vec::new();
        let mut order = self.reported.clone();

        // releases first, while the released pointer is still part of the frame
        let released: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&s| self.slots[s].tracking_id < 0)
            .collect();
        for s in released {
            let Some(idx) = order.iter().position(|&o| o == s) else {
                continue;
            };
            let action = if order.len() == 1 {
                MotionAction::Up
            } else {
                MotionAction::PointerUp
            };
            frames.push(self.frame(action, idx, &order, now_ms));
            order.remove(idx);
        }

        let pressed: Vec<usize> = (0..self.slots.len())
            .filter(|s| self.slots[*s].tracking_id >= 0 && !order.contains(s))
            .collect();
        for s in pressed {
            let action = if order.is_empty() {
                self.down_time = now_ms;
                MotionAction::Down
            } else {
                MotionAction::PointerDown
            };
            let idx = order.partition_point(|&o| o < s);
            order.insert(idx, s);
            frames.push(self.frame(action, idx, &order, now_ms));
        }

        // pressed contacts already carry their position in the down frame
        let held_moved = order
            .iter()
            .any(|s| self.reported.contains(s) && self.slots[*s].moved);
        if held_moved {
            frames.push(self.frame(MotionAction::Move, 0, &order, now_ms));
        }

        for c in &mut self.slots {
            c.moved = false;
        }
        self.reported = order;
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> TouchReader {
        let mut r = TouchReader::new(100, 100, 10);
        r.set_norm_ranges(0, 1000, 0, 1000);
        r
    }

    fn touch(r: &mut TouchReader, slot: i32, id: i32, x: i32, y: i32) {
        r.on_slot(slot);
        r.on_tracking_id(id);
        r.on_pos_x(x);
        r.on_pos_y(y);
    }

    #[test]
    fn single_finger_down_move_up() {
        let mut r = reader();
        touch(&mut r, 0, 1, 100, 200);
        let f = r.on_syn_report(5);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].action, MotionAction::Down);
        assert_eq!(f[0].pointers, vec![Point::new(10.0, 20.0)]);
        assert_eq!(f[0].down_time, 5);

        r.on_pos_x(500);
        let f = r.on_syn_report(15);
        assert_eq!(f[0].action, MotionAction::Move);
        assert_eq!(f[0].pointers, vec![Point::new(50.0, 20.0)]);
        assert_eq!(f[0].down_time, 5);

        r.on_tracking_id(-1);
        let f = r.on_syn_report(25);
        assert_eq!(f[0].action, MotionAction::Up);
        assert_eq!(f[0].pointers.len(), 1);
        assert!(r.on_syn_report(30).is_empty());
    }

    #[test]
    fn second_finger_is_pointer_down_at_its_index() {
        let mut r = reader();
        touch(&mut r, 1, 7, 100, 100);
        r.on_syn_report(0);
        touch(&mut r, 0, 8, 900, 900);
        let f = r.on_syn_report(10);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].action, MotionAction::PointerDown);
        // slot 0 sorts ahead of slot 1
        assert_eq!(f[0].action_index, 0);
        assert_eq!(f[0].pointers[0], Point::new(90.0, 90.0));

        r.on_slot(1);
        r.on_tracking_id(-1);
        let f = r.on_syn_report(20);
        assert_eq!(f[0].action, MotionAction::PointerUp);
        assert_eq!(f[0].action_index, 1);
        assert_eq!(f[0].pointers.len(), 2);
    }

    #[test]
    fn positions_clamp_to_output() {
        let mut r = reader();
        touch(&mut r, 0, 1, 5000, -20);
        let f = r.on_syn_report(0);
        assert_eq!(f[0].pointers[0], Point::new(100.0, 0.0));
    }

    #[test]
    fn held_finger_moves_alongside_a_press() {
        let mut r = reader();
        touch(&mut r, 0, 1, 100, 100);
        r.on_syn_report(0);

        r.on_slot(0);
        r.on_pos_x(500);
        touch(&mut r, 1, 2, 800, 800);
        let f = r.on_syn_report(10);
        assert_eq!(f.len(), 2);
        assert_eq!(f[0].action, MotionAction::PointerDown);
        assert_eq!(f[0].action_index, 1);
        assert_eq!(f[1].action, MotionAction::Move);
        assert_eq!(
            f[1].pointers,
            vec![Point::new(50.0, 10.0), Point::new(80.0, 80.0)]
        );
    }

    #[test]
    fn held_finger_moves_alongside_a_release() {
        let mut r = reader();
        touch(&mut r, 0, 1, 100, 100);
        touch(&mut r, 1, 2, 800, 800);
        r.on_syn_report(0);

        r.on_slot(0);
        r.on_pos_y(300);
        r.on_slot(1);
        r.on_tracking_id(-1);
        let f = r.on_syn_report(10);
        assert_eq!(f.len(), 2);
        assert_eq!(f[0].action, MotionAction::PointerUp);
        assert_eq!(f[1].action, MotionAction::Move);
        assert_eq!(f[1].pointers, vec![Point::new(10.0, 30.0)]);
    }

    #[test]
    fn out_of_range_slots_are_ignored() {
        let mut r = TouchReader::new(100, 100, 2);
        r.set_norm_ranges(0, 1000, 0, 1000);
        touch(&mut r, 5000, 3, 100, 100);
        touch(&mut r, -1, 4, 100, 100);
        assert!(r.on_syn_report(0).is_empty());
        assert_eq!(r.slots.len(), 2);

        touch(&mut r, 1, 5, 200, 200);
        let f = r.on_syn_report(5);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].action, MotionAction::Down);
    }
}
