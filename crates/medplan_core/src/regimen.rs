/// A medication taken every day of the treatment window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dose {
    pub medication: &'static str,
    pub tablets: u8,
}

impl Dose {
    /// Long form used on wide layouts, e.g. `3 comps.`
    pub fn label(&self) -> String {
        format!("{} comps.", self.tablets)
    }
}

/// The fixed regimen printed on every row of the checklist.
pub const DAILY_DOSES: [Dose; 2] = [
    Dose {
        medication: "Carbamazepina",
        tablets: 3,
    },
    Dose {
        medication: "Frisium",
        tablets: 2,
    },
];
