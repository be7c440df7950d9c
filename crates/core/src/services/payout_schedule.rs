//! Which months a holding pays in, and how often.
//!
//! Equity funds are scheduled by category alone. Bond funds share one
//! category but distribute on different cycles, so they are looked up by
//! ticker in [`BOND_SCHEDULES`]. A bond code missing from that table is
//! assumed to pay Jan/Apr/Jul/Oct. That default is an approximation: the
//! table has to be extended by hand whenever a new bond ETF lists.

use tracing::debug;

use crate::models::etf::Category;
use crate::models::schedule::{BondGroup, PayoutSchedule};

/// Known bond ETFs and their distribution cycle.
pub const BOND_SCHEDULES: &[(&str, BondGroup)] = &[
    ("00937B", BondGroup::Monthly),
    ("00772B", BondGroup::Monthly),
    ("00933B", BondGroup::Monthly),
    ("00773B", BondGroup::Monthly),
    ("00679B", BondGroup::PhaseTwo),
    ("00761B", BondGroup::PhaseTwo),
    ("00795B", BondGroup::PhaseTwo),
    ("00687B", BondGroup::PhaseThree),
    ("00751B", BondGroup::PhaseThree),
    ("00792B", BondGroup::PhaseThree),
    ("00720B", BondGroup::PhaseOne),
    ("00725B", BondGroup::PhaseOne),
    ("00724B", BondGroup::PhaseOne),
];

/// Group assigned to bond codes not listed in [`BOND_SCHEDULES`].
pub const FALLBACK_BOND_GROUP: BondGroup = BondGroup::PhaseOne;

/// Look up a bond code. `None` means the code is not in the table.
pub fn bond_group(code: &str) -> Option<BondGroup> {
    let code = code.trim();
    BOND_SCHEDULES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, group)| *group)
}

/// Resolve the payout schedule for a holding.
pub fn resolve(category: Category, code: &str) -> PayoutSchedule {
    match category {
        Category::Monthly => PayoutSchedule::MONTHLY,
        Category::QuarterlyPhase1 => PayoutSchedule::QUARTER_PHASE_1,
        Category::QuarterlyPhase2 => PayoutSchedule::QUARTER_PHASE_2,
        Category::QuarterlyPhase3 => PayoutSchedule::QUARTER_PHASE_3,
        Category::Bond => match bond_group(code) {
            Some(group) => group.schedule(),
            None => {
                debug!(code, "bond code not in schedule table, using fallback");
                FALLBACK_BOND_GROUP.schedule()
            }
        },
    }
}
