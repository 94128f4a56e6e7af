//! Head-mounted-display tracking
//!
//! Raw head and eye transforms come from a platform bridge once per
//! frame; trigger pulses and display-rotation changes arrive through
//! asynchronous callbacks that have no handle to the owning tracker.
//! Those callbacks latch into a process-wide registration slot with an
//! explicit attach/detach contract, and the tracker picks the latched
//! signals up at its next frame advance.

use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use glam::Mat4;
use tracing::warn;

/// Physical rotation of the display relative to its logical "up"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayOrientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl DisplayOrientation {
    /// Platform rotation index (0..=3 quarter turns)
    pub fn from_rotation(rotation: u8) -> Self {
        match rotation {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            _ => {
                warn!(rotation, "unrecognized display rotation");
                Self::Deg0
            }
        }
    }
}

/// Raw tracking transforms for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPose {
    pub head: Mat4,
    pub left_eye: Mat4,
    pub right_eye: Mat4,
}

impl Default for HeadPose {
    fn default() -> Self {
        Self {
            head: Mat4::IDENTITY,
            left_eye: Mat4::IDENTITY,
            right_eye: Mat4::IDENTITY,
        }
    }
}

/// Source of raw head and eye transforms (the platform tracking bridge)
pub trait HeadPoseSource {
    /// Sample the current transforms
    fn sample(&mut self) -> HeadPose;

    /// Ask the platform to re-zero its tracker
    fn reset_tracker(&mut self) {}
}

/// Signals latched by asynchronous callbacks for the next frame advance
#[derive(Debug, Default)]
struct HmdSignals {
    pending_trigger: AtomicBool,
    device_rotation: AtomicU8,
    in_hmd: AtomicBool,
}

/// Registration slot for the active tracker's signals
///
/// `cached_rotation` keeps rotation notifications that arrive before a
/// tracker exists; the value is handed over at attach.
#[derive(Default)]
struct ActiveSlot {
    signals: Option<Arc<HmdSignals>>,
    cached_rotation: u8,
}

static ACTIVE: Mutex<ActiveSlot> = Mutex::new(ActiveSlot {
    signals: None,
    cached_rotation: 0,
});

fn attach(signals: Arc<HmdSignals>) {
    let mut slot = ACTIVE.lock().unwrap_or_else(|e| e.into_inner());
    debug_assert!(slot.signals.is_none(), "head tracker already attached");
    signals
        .device_rotation
        .store(slot.cached_rotation, Ordering::Relaxed);
    slot.signals = Some(signals);
}

fn detach() {
    let mut slot = ACTIVE.lock().unwrap_or_else(|e| e.into_inner());
    debug_assert!(slot.signals.is_some(), "no head tracker attached");
    slot.signals = None;
}

/// Latch a trigger pulse for pickup at the next frame advance
///
/// Callable from any thread. A pulse arriving while no tracker is
/// attached is dropped.
pub fn notify_trigger() {
    let slot = ACTIVE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(signals) = &slot.signals {
        signals.pending_trigger.store(true, Ordering::Relaxed);
    }
}

/// Record a display rotation change (0..=3 quarter turns)
///
/// Rotations reported before a tracker exists are cached and applied
/// when one attaches.
pub fn notify_display_rotation(rotation: u8) {
    let mut slot = ACTIVE.lock().unwrap_or_else(|e| e.into_inner());
    slot.cached_rotation = rotation;
    if let Some(signals) = &slot.signals {
        signals.device_rotation.store(rotation, Ordering::Relaxed);
    }
}

/// Record whether the device is currently mounted in the headset
pub fn notify_in_hmd(in_hmd: bool) {
    let slot = ACTIVE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(signals) = &slot.signals {
        signals.in_hmd.store(in_hmd, Ordering::Relaxed);
    }
}

/// Head tracking state, advanced once per frame by the input system
pub struct HeadTracker {
    source: Box<dyn HeadPoseSource>,
    signals: Arc<HmdSignals>,
    pose: HeadPose,
    orientation: DisplayOrientation,
    orientation_at_reset: DisplayOrientation,
    triggered: bool,
    is_in_hmd: bool,
    correction_enabled: bool,
}

impl HeadTracker {
    /// Create a tracker over a platform bridge and attach it to the
    /// callback slot
    pub fn new(source: Box<dyn HeadPoseSource>) -> Self {
        let signals = Arc::new(HmdSignals::default());
        attach(Arc::clone(&signals));
        let orientation =
            DisplayOrientation::from_rotation(signals.device_rotation.load(Ordering::Relaxed));
        Self {
            source,
            signals,
            pose: HeadPose::default(),
            orientation,
            orientation_at_reset: DisplayOrientation::Deg0,
            triggered: false,
            is_in_hmd: false,
            correction_enabled: false,
        }
    }

    /// Apply the display-orientation correction to sampled transforms
    pub fn enable_orientation_correction(&mut self) {
        self.correction_enabled = true;
    }

    /// Pull fresh transforms and commit the latched trigger pulse
    ///
    /// `triggered` reads true for exactly the one frame after a pulse
    /// was latched, mirroring button edge semantics.
    pub fn advance_frame(&mut self) {
        self.orientation =
            DisplayOrientation::from_rotation(self.signals.device_rotation.load(Ordering::Relaxed));
        self.is_in_hmd = self.signals.in_hmd.load(Ordering::Relaxed);

        let raw = self.source.sample();
        self.pose = if self.correction_enabled {
            correct_pose(&raw, self.orientation, self.orientation_at_reset)
        } else {
            raw
        };

        self.triggered = self.signals.pending_trigger.swap(false, Ordering::Relaxed);
    }

    /// Latch a trigger pulse directly (the mouse-press path)
    pub fn latch_trigger(&mut self) {
        self.signals.pending_trigger.store(true, Ordering::Relaxed);
    }

    /// Re-zero the tracker in the current physical orientation
    ///
    /// The orientation recorded here feeds the cross-orientation
    /// correction cases until the next reset.
    pub fn reset_head_tracker(&mut self) {
        self.orientation_at_reset = self.orientation;
        self.source.reset_tracker();
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }

    pub fn pose(&self) -> &HeadPose {
        &self.pose
    }

    pub fn head_transform(&self) -> Mat4 {
        self.pose.head
    }

    pub fn left_eye_transform(&self) -> Mat4 {
        self.pose.left_eye
    }

    pub fn right_eye_transform(&self) -> Mat4 {
        self.pose.right_eye
    }

    pub fn device_orientation(&self) -> DisplayOrientation {
        self.orientation
    }

    pub fn is_in_hmd(&self) -> bool {
        self.is_in_hmd
    }
}

impl Drop for HeadTracker {
    fn drop(&mut self) {
        detach();
    }
}

/// Pre- and post-rotation for a display orientation
///
/// The cross-orientation arms compensate for a tracker reset performed
/// in a different physical orientation than the current one; those pairs
/// were tuned against hardware and are fixed constants, not a rule to
/// extrapolate from.
fn correction(
    orientation: DisplayOrientation,
    at_reset: DisplayOrientation,
) -> (Mat4, Mat4) {
    use DisplayOrientation::*;
    match orientation {
        Deg0 => {
            let mut pre = Mat4::from_rotation_y(FRAC_PI_2);
            // A flip to the opposite rotation after reset introduces
            // another 180 degree turn that has to be accounted for.
            if at_reset == Deg180 {
                pre *= Mat4::from_rotation_y(PI);
            }
            (pre, Mat4::from_rotation_z(-FRAC_PI_2))
        }
        Deg90 => {
            let pre = if at_reset == Deg270 {
                Mat4::from_rotation_y(PI)
            } else {
                Mat4::IDENTITY
            };
            (pre, Mat4::IDENTITY)
        }
        Deg180 => {
            let mut pre = Mat4::from_rotation_y(-FRAC_PI_2);
            if at_reset == Deg0 {
                pre *= Mat4::from_rotation_y(PI);
            }
            (pre, Mat4::from_rotation_z(FRAC_PI_2))
        }
        Deg270 => {
            let pre = if at_reset != Deg90 {
                Mat4::from_rotation_y(-PI)
            } else {
                Mat4::IDENTITY
            };
            (pre, Mat4::from_rotation_z(PI))
        }
    }
}

/// Apply `post * raw * pre` to the whole transform triple
fn correct_pose(
    raw: &HeadPose,
    orientation: DisplayOrientation,
    at_reset: DisplayOrientation,
) -> HeadPose {
    let (pre, post) = correction(orientation, at_reset);
    HeadPose {
        head: post * raw.head * pre,
        left_eye: post * raw.left_eye * pre,
        right_eye: post * raw.right_eye * pre,
    }
}
