//! Full-screen image inspection overlay with zoom and pan.
//!
//! The overlay is a single long-lived [`Lightbox`] owned by the UI controller.
//! Rendering reads [`Lightbox::scale`], [`Lightbox::pan`] and [`Lightbox::transform`];
//! input goes through the event methods below.

use std::collections::HashSet;
use std::time::{Duration, Instant};

pub const SCALE_MIN: f32 = 1.0;
pub const SCALE_MAX: f32 = 5.0;
pub const SCALE_STEP: f32 = 0.2;

/// Scale used by the double-click toggle.
pub const DOUBLE_CLICK_SCALE: f32 = 2.0;

/// Delay before the visible class is applied after opening.
pub const OPEN_DELAY: Duration = Duration::from_millis(10);

/// Exit animation length; the overlay is hidden once it elapses.
pub const CLOSE_DURATION: Duration = Duration::from_millis(300);

/// Pixel offset of the image relative to the overlay center.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pan {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightboxPhase {
    Closed,
    Opening { since: Instant },
    Open,
    Closing { since: Instant },
}

/// Keys the overlay reacts to while visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxKey {
    Escape,
    Plus,
    Minus,
    Zero,
}

/// What the lightbox is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxImage {
    /// Key of the image in the caller's texture cache
    pub key: String,
    pub caption: String,
}

#[derive(Debug)]
pub struct Lightbox {
    phase: LightboxPhase,
    image: Option<LightboxImage>,
    scale: f32,
    pan: Pan,
    /// Pointer position minus pan at drag start
    drag_origin: Option<Pan>,
}

impl Default for Lightbox {
    fn default() -> Self {
        Self {
            phase: LightboxPhase::Closed,
            image: None,
            scale: SCALE_MIN,
            pan: Pan::default(),
            drag_origin: None,
        }
    }
}

impl Lightbox {
    pub fn phase(&self) -> LightboxPhase {
        self.phase
    }

    /// True from the moment of opening until the exit animation finishes.
    pub fn is_visible(&self) -> bool {
        !matches!(self.phase, LightboxPhase::Closed)
    }

    pub fn is_open(&self) -> bool {
        matches!(self.phase, LightboxPhase::Open)
    }

    pub fn image(&self) -> Option<&LightboxImage> {
        self.image.as_ref()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pan(&self) -> Pan {
        self.pan
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Opacity for the fade in/out, from 0 to 1.
    pub fn opacity(&self, now: Instant) -> f32 {
        match self.phase {
            LightboxPhase::Closed | LightboxPhase::Opening { .. } => 0.0,
            LightboxPhase::Open => 1.0,
            LightboxPhase::Closing { since } => {
                let elapsed = now.saturating_duration_since(since).as_secs_f32();
                (1.0 - elapsed / CLOSE_DURATION.as_secs_f32()).clamp(0.0, 1.0)
            }
        }
    }

    /// CSS-style transform of the image for the current state.
    pub fn transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.pan.x, self.pan.y, self.scale
        )
    }

    pub fn open(&mut self, image: LightboxImage, now: Instant) {
        log::debug!("Opening lightbox for {}", image.key);
        self.image = Some(image);
        self.reset();
        self.phase = LightboxPhase::Opening { since: now };
    }

    /// Starts the exit animation. No-op unless the overlay is visible.
    pub fn close(&mut self, now: Instant) {
        if matches!(
            self.phase,
            LightboxPhase::Opening { .. } | LightboxPhase::Open
        ) {
            self.drag_origin = None;
            self.phase = LightboxPhase::Closing { since: now };
        }
    }

    /// Advances timed phase transitions.
    pub fn tick(&mut self, now: Instant) {
        match self.phase {
            LightboxPhase::Opening { since }
                if now.saturating_duration_since(since) >= OPEN_DELAY =>
            {
                self.phase = LightboxPhase::Open;
            }
            LightboxPhase::Closing { since }
                if now.saturating_duration_since(since) >= CLOSE_DURATION =>
            {
                self.phase = LightboxPhase::Closed;
                self.image = None;
            }
            _ => {}
        }
    }

    /// Time until the next phase transition, for scheduling a repaint.
    pub fn next_transition(&self, now: Instant) -> Option<Duration> {
        match self.phase {
            LightboxPhase::Opening { since } => {
                Some(OPEN_DELAY.saturating_sub(now.saturating_duration_since(since)))
            }
            LightboxPhase::Closing { since } => {
                Some(CLOSE_DURATION.saturating_sub(now.saturating_duration_since(since)))
            }
            _ => None,
        }
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.clamp(SCALE_MIN, SCALE_MAX);
        if self.scale <= SCALE_MIN {
            self.pan = Pan::default();
            self.drag_origin = None;
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale + SCALE_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale - SCALE_STEP);
    }

    /// One wheel tick; negative delta (scrolling up) zooms in.
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.zoom_in();
        } else if delta_y > 0.0 {
            self.zoom_out();
        }
    }

    pub fn toggle_zoom(&mut self) {
        if self.scale > SCALE_MIN {
            self.reset();
        } else {
            self.set_scale(DOUBLE_CLICK_SCALE);
        }
    }

    pub fn reset(&mut self) {
        self.scale = SCALE_MIN;
        self.pan = Pan::default();
        self.drag_origin = None;
    }

    /// Begins a pan drag. Ignored at scale 1.
    pub fn drag_start(&mut self, pointer: Pan) -> bool {
        if self.scale <= SCALE_MIN {
            return false;
        }
        self.drag_origin = Some(Pan {
            x: pointer.x - self.pan.x,
            y: pointer.y - self.pan.y,
        });
        true
    }

    pub fn drag_move(&mut self, pointer: Pan) {
        if let Some(origin) = self.drag_origin {
            self.pan = Pan {
                x: pointer.x - origin.x,
                y: pointer.y - origin.y,
            };
        }
    }

    pub fn drag_end(&mut self) {
        self.drag_origin = None;
    }

    /// Keyboard handling; returns whether the key was consumed.
    pub fn handle_key(&mut self, key: LightboxKey, now: Instant) -> bool {
        if !self.is_visible() {
            return false;
        }
        if key == LightboxKey::Escape {
            self.close(now);
            return true;
        }
        // Zoom keys are ignored once closing has started
        if matches!(self.phase, LightboxPhase::Closing { .. }) {
            return false;
        }
        match key {
            LightboxKey::Plus => self.zoom_in(),
            LightboxKey::Minus => self.zoom_out(),
            LightboxKey::Zero => self.reset(),
            LightboxKey::Escape => {}
        }
        true
    }
}

/// Remembers which images already have click-to-zoom attached.
#[derive(Debug, Default)]
pub struct LightboxBinder {
    bound: HashSet<String>,
}

impl LightboxBinder {
    /// Marks `key` as bound; returns `false` if it already was.
    pub fn bind(&mut self, key: &str) -> bool {
        self.bound.insert(key.to_owned())
    }

    pub fn is_bound(&self, key: &str) -> bool {
        self.bound.contains(key)
    }

    pub fn unbind(&mut self, key: &str) {
        self.bound.remove(key);
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> LightboxImage {
        LightboxImage {
            key: "upload://bolo.png".to_owned(),
            caption: "Bolo".to_owned(),
        }
    }

    fn opened() -> (Lightbox, Instant) {
        let now = Instant::now();
        let mut lightbox = Lightbox::default();
        lightbox.open(image(), now);
        lightbox.tick(now + OPEN_DELAY);
        (lightbox, now)
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn opening_resets_view() {
        let (mut lightbox, now) = opened();
        lightbox.zoom_in();
        lightbox.drag_start(Pan { x: 0.0, y: 0.0 });
        lightbox.drag_move(Pan { x: 30.0, y: 10.0 });
        lightbox.close(now);
        lightbox.tick(now + CLOSE_DURATION);

        lightbox.open(image(), now);
        assert_eq!(lightbox.scale(), 1.0);
        assert_eq!(lightbox.pan(), Pan::default());
        assert!(matches!(lightbox.phase(), LightboxPhase::Opening { .. }));
    }

    #[test]
    fn plus_steps_and_clamps() {
        let (mut lightbox, now) = opened();
        for _ in 0..3 {
            lightbox.handle_key(LightboxKey::Plus, now);
        }
        assert!(approx(lightbox.scale(), 1.6), "{}", lightbox.scale());

        for _ in 0..50 {
            lightbox.handle_key(LightboxKey::Plus, now);
        }
        assert_eq!(lightbox.scale(), SCALE_MAX);

        for _ in 0..50 {
            lightbox.wheel(1.0);
        }
        assert_eq!(lightbox.scale(), SCALE_MIN);
    }

    #[test]
    fn zero_resets_zoom_and_pan() {
        let (mut lightbox, now) = opened();
        lightbox.set_scale(3.0);
        assert!(lightbox.drag_start(Pan { x: 100.0, y: 100.0 }));
        lightbox.drag_move(Pan { x: 140.0, y: 80.0 });
        assert_eq!(lightbox.pan(), Pan { x: 40.0, y: -20.0 });

        lightbox.handle_key(LightboxKey::Zero, now);
        assert_eq!(lightbox.scale(), 1.0);
        assert_eq!(lightbox.pan(), Pan::default());
        assert!(!lightbox.is_dragging());
    }

    #[test]
    fn pan_accumulates_across_drags() {
        let (mut lightbox, _) = opened();
        lightbox.set_scale(2.0);
        lightbox.drag_start(Pan { x: 0.0, y: 0.0 });
        lightbox.drag_move(Pan { x: 10.0, y: 5.0 });
        lightbox.drag_end();

        lightbox.drag_start(Pan { x: 50.0, y: 50.0 });
        lightbox.drag_move(Pan { x: 60.0, y: 50.0 });
        assert_eq!(lightbox.pan(), Pan { x: 20.0, y: 5.0 });
        assert_eq!(lightbox.transform(), "translate(20px, 5px) scale(2)");
    }

    #[test]
    fn no_pan_at_base_scale() {
        let (mut lightbox, _) = opened();
        assert!(!lightbox.drag_start(Pan { x: 0.0, y: 0.0 }));
        lightbox.drag_move(Pan { x: 30.0, y: 30.0 });
        assert_eq!(lightbox.pan(), Pan::default());
    }

    #[test]
    fn double_click_toggles_between_one_and_two() {
        let (mut lightbox, _) = opened();
        lightbox.toggle_zoom();
        assert_eq!(lightbox.scale(), 2.0);
        lightbox.toggle_zoom();
        assert_eq!(lightbox.scale(), 1.0);
    }

    #[test]
    fn escape_runs_close_transition() {
        let (mut lightbox, now) = opened();
        assert!(lightbox.is_open());

        assert!(lightbox.handle_key(LightboxKey::Escape, now));
        assert!(matches!(lightbox.phase(), LightboxPhase::Closing { .. }));
        assert!(lightbox.is_visible());

        lightbox.tick(now + Duration::from_millis(150));
        assert!(lightbox.is_visible());
        assert!(lightbox.opacity(now + Duration::from_millis(150)) > 0.0);

        lightbox.tick(now + CLOSE_DURATION);
        assert_eq!(lightbox.phase(), LightboxPhase::Closed);
        assert!(lightbox.image().is_none());
        assert!(!lightbox.handle_key(LightboxKey::Plus, now));
    }

    #[test]
    fn zoom_keys_do_nothing_while_closing() {
        let (mut lightbox, now) = opened();
        lightbox.handle_key(LightboxKey::Plus, now);
        let scale = lightbox.scale();

        lightbox.handle_key(LightboxKey::Escape, now);
        assert!(!lightbox.handle_key(LightboxKey::Plus, now));
        assert!(!lightbox.handle_key(LightboxKey::Zero, now));
        assert!(approx(lightbox.scale(), scale));
    }

    #[test]
    fn binder_marks_images_once() {
        let mut binder = LightboxBinder::default();
        assert!(binder.bind("a"));
        assert!(!binder.bind("a"));
        assert!(binder.bind("b"));
        assert_eq!(binder.len(), 2);
        binder.unbind("a");
        assert!(!binder.is_bound("a"));
    }
}
