//! Effect & Cue Queues
//!
//! Collision and hazard passes never mutate a victim mid-iteration. They
//! queue an `Effect` instead; the simulation applies the whole queue in a
//! second pass once iteration is over. This keeps the one permitted
//! "foreign write" (setting a victim's terminal state) auditable and makes
//! the first-match-wins ordering testable in isolation.
//!
//! Audio is the same shape: fire-and-forget `Cue`s queued during the tick
//! and drained by the frontend, which may drop them freely.

/// A queue for events of one type, collected during the frame and drained
/// at a fixed point.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Kill/damage consequences found during a collision or hazard pass.
///
/// Applying one of these may only set a terminal or semi-terminal state on
/// the victim - never reposition it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// A captive slot takes lethal damage (gunfire, shell, crush).
    KillCaptive { slot: usize },
    /// A stronghold is breached by the player's cannon round.
    DestroyStronghold { id: usize },
    /// A vehicle takes one point of bomb damage.
    DamageVehicle { slot: usize },
    /// The player aircraft is destroyed.
    KillAircraft,
    /// The balloon is shot and starts falling.
    DropBalloon,
    /// The jet is shot down.
    KillJet,
}

/// Fire-and-forget audio cues. No back-pressure; the frontend drains these
/// once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    PlayerFire,
    EnemyFire,
    BombDrop,
    SmallBlast,
    LargeBlast,
    Rescue,
    CaptiveLost,
}

/// All queues for one simulation instance.
#[derive(Debug, Default)]
pub struct Effects {
    pub hits: EventQueue<Effect>,
    pub cues: EventQueue<Cue>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }
}
