//! Pointer slots and touch identity reconciliation
//!
//! Platforms hand out touch-contact identifiers that are not stable in
//! any useful way for callers polling per-frame state. The table below
//! maps them onto small ordinals: slot 0 is shared by the mouse and the
//! first contact, freed slots are reclaimed lowest-first, so "pointer 0"
//! stays stable through the common single-touch case.

use glam::IVec2;

use super::button::ButtonState;

/// A single pointer slot: the mouse cursor or one touch contact
#[derive(Debug, Clone, Copy, Default)]
pub struct Pointer {
    /// Platform contact identifier while a touch owns this slot
    pub platform_id: Option<u64>,
    /// Position in window coordinates (physical pixels)
    pub position: IVec2,
    /// Motion accumulated since the last frame boundary
    pub delta: IVec2,
    /// Whether the slot currently tracks a live contact
    pub used: bool,
    /// Press state of this pointer
    pub button: ButtonState,
}

/// Fixed table of pointer slots
#[derive(Debug)]
pub struct PointerTable {
    slots: Vec<Pointer>,
}

impl PointerTable {
    pub fn new(max_pointers: usize) -> Self {
        Self {
            slots: vec![Pointer::default(); max_pointers.max(1)],
        }
    }

    /// Look up the slot tracking a platform contact id
    pub fn find(&self, platform_id: u64) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.used && slot.platform_id == Some(platform_id))
    }

    /// Look up a contact, falling back to slot 0 on a miss
    ///
    /// Events can arrive for contacts already removed; input keeps
    /// flowing through slot 0 then, even though that may alias another
    /// contact. Deliberate lossy degradation, not an error.
    pub fn find_or_first(&self, platform_id: u64) -> usize {
        self.find(platform_id).unwrap_or(0)
    }

    /// Resolve a contact id to a slot, claiming the lowest free slot for
    /// a new contact. A full table degrades to slot 0.
    pub fn find_or_claim(&mut self, platform_id: u64) -> usize {
        if let Some(i) = self.find(platform_id) {
            return i;
        }
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if !slot.used {
                slot.used = true;
                slot.platform_id = Some(platform_id);
                return i;
            }
        }
        0
    }

    /// Free a slot for reuse by the next new contact
    ///
    /// Position and button state stay readable for the rest of the
    /// frame; only the identity is dropped.
    pub fn release(&mut self, ordinal: usize) {
        if let Some(slot) = self.slots.get_mut(ordinal) {
            slot.used = false;
            slot.platform_id = None;
        }
    }

    /// Set a slot's position without generating motion (new contacts)
    pub fn place(&mut self, ordinal: usize, position: IVec2) {
        if let Some(slot) = self.slots.get_mut(ordinal) {
            slot.position = position;
        }
    }

    /// Accumulate motion for a contact, preserving its identity
    pub fn apply_motion(&mut self, ordinal: usize, position: IVec2) {
        if let Some(slot) = self.slots.get_mut(ordinal) {
            slot.delta += position - slot.position;
            slot.position = position;
        }
    }

    pub fn get(&self, ordinal: usize) -> Option<&Pointer> {
        self.slots.get(ordinal)
    }

    pub fn get_mut(&mut self, ordinal: usize) -> Option<&mut Pointer> {
        self.slots.get_mut(ordinal)
    }

    pub fn slots(&self) -> &[Pointer] {
        &self.slots
    }

    /// Advance every pointer button for the next frame
    pub fn advance(&mut self) {
        for slot in &mut self.slots {
            slot.button = slot.button.advance();
        }
    }

    /// Zero accumulated deltas at the frame boundary
    pub fn zero_deltas(&mut self) {
        for slot in &mut self.slots {
            slot.delta = IVec2::ZERO;
        }
    }

    /// Drop all contacts and release all buttons
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            *slot = Pointer::default();
        }
    }
}
