use serde::{Deserialize, Serialize};

/// Pages in the mushaf.
pub const TOTAL_PAGES: u32 = 604;
pub const DEFAULT_PLAN_LENGTH_DAYS: u32 = 30;
pub const MAX_REPETITIONS: u32 = 10;
pub const SLOT_COUNT: usize = 5;

/// The five daily prayer slots, in their fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Slot {
    pub const ALL: [Slot; SLOT_COUNT] = [Slot::Fajr, Slot::Dhuhr, Slot::Asr, Slot::Maghrib, Slot::Isha];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Slot::Fajr => "Fajr",
            Slot::Dhuhr => "Dhuhr",
            Slot::Asr => "Asr",
            Slot::Maghrib => "Maghrib",
            Slot::Isha => "Isha",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanConfiguration {
    pub total_units: u32,
    pub repetition_count: u32,
    pub plan_length_days: u32,
}

impl PlanConfiguration {
    pub fn new(repetition_count: u32) -> Self {
        Self {
            total_units: TOTAL_PAGES,
            repetition_count: repetition_count.max(1),
            plan_length_days: DEFAULT_PLAN_LENGTH_DAYS,
        }
    }

    pub fn units_per_day(&self) -> u32 {
        (self.total_units * self.repetition_count).div_ceil(self.plan_length_days)
    }

    pub fn allocate(&self, day_index: u32) -> DayAllocation {
        allocate(self.total_units, self.units_per_day(), day_index)
    }
}

impl Default for PlanConfiguration {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Inclusive page range. `start > end` means the slot got nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotRange {
    pub start: u32,
    pub end: u32,
}

impl SlotRange {
    pub fn len(&self) -> u32 {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayAllocation {
    pub start_unit: u32,
    pub ranges: [SlotRange; SLOT_COUNT],
}

impl DayAllocation {
    pub fn total(&self) -> u32 {
        self.ranges.iter().map(SlotRange::len).sum()
    }
}

/// Splits one day's share of the pool across the five slots.
///
/// The day starts where the previous days left off, wrapping around the
/// pool. The first `units_per_day % 5` slots get one extra unit. A day never
/// wraps internally: ranges are clipped at `total_units`.
pub fn allocate(total_units: u32, units_per_day: u32, day_index: u32) -> DayAllocation {
    let total_units = total_units.max(1);
    let day_offset = u64::from(day_index.saturating_sub(1)) * u64::from(units_per_day);
    let start_unit = (day_offset % u64::from(total_units)) as u32 + 1;

    let base = units_per_day / SLOT_COUNT as u32;
    let remainder = (units_per_day % SLOT_COUNT as u32) as usize;

    let mut ranges = [SlotRange { start: 0, end: 0 }; SLOT_COUNT];
    let mut current = start_unit;
    for (index, range) in ranges.iter_mut().enumerate() {
        let count = base + u32::from(index < remainder);
        let end = (current + count).saturating_sub(1).min(total_units);
        *range = SlotRange {
            start: current,
            end,
        };
        current = end + 1;
    }

    DayAllocation { start_unit, ranges }
}

/// Share of the whole plan finished, in percent.
pub fn progress_percent(day_index: u32, completed_slots: usize, plan_length_days: u32) -> f64 {
    let total = f64::from(plan_length_days.max(1)) * SLOT_COUNT as f64;
    let done = f64::from(day_index.saturating_sub(1)) * SLOT_COUNT as f64 + completed_slots as f64;
    (done / total * 100.0).min(100.0)
}
