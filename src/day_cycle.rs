#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Day,
    Night,
}

/// Tick-driven day/night schedule; reports the ambient level to apply when
/// a phase boundary is crossed.
pub struct DayCycle {
    tick: u64,
    ticks_per_phase: u64,
    day_level: u8,
    night_level: u8,
}

impl DayCycle {
    pub fn new(ticks_per_phase: u64, day_level: u8, night_level: u8) -> Self {
        Self {
            tick: 0,
            ticks_per_phase: ticks_per_phase.max(1),
            day_level,
            night_level,
        }
    }

    pub fn phase(&self) -> Phase {
        if (self.tick / self.ticks_per_phase) % 2 == 0 {
            Phase::Day
        } else {
            Phase::Night
        }
    }

    pub fn level(&self) -> u8 {
        match self.phase() {
            Phase::Day => self.day_level,
            Phase::Night => self.night_level,
        }
    }

    /// Moves one tick forward; `Some(level)` when the phase just changed.
    pub fn advance(&mut self) -> Option<u8> {
        let before = self.phase();
        self.tick = self.tick.wrapping_add(1);
        (self.phase() != before).then(|| self.level())
    }
}
