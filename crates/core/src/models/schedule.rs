use serde::{Deserialize, Serialize};

/// Calendar months (1..=12) in which a holding distributes, plus the
/// number of distributions per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutSchedule {
    months: [bool; 12],
    frequency: u32,
}

impl PayoutSchedule {
    /// Every month, twelve payouts a year.
    pub const MONTHLY: PayoutSchedule = PayoutSchedule {
        months: [true; 12],
        frequency: 12,
    };

    /// Jan / Apr / Jul / Oct
    pub const QUARTER_PHASE_1: PayoutSchedule = PayoutSchedule::quarterly(1);

    /// Feb / May / Aug / Nov
    pub const QUARTER_PHASE_2: PayoutSchedule = PayoutSchedule::quarterly(2);

    /// Mar / Jun / Sep / Dec
    pub const QUARTER_PHASE_3: PayoutSchedule = PayoutSchedule::quarterly(3);

    const fn quarterly(first_month: usize) -> PayoutSchedule {
        let mut months = [false; 12];
        let mut m = first_month - 1;
        while m < 12 {
            months[m] = true;
            m += 3;
        }
        PayoutSchedule {
            months,
            frequency: 4,
        }
    }

    /// Whether `month` (1..=12) is a payout month. Out-of-range months never pay.
    pub fn pays_in(&self, month: u32) -> bool {
        (1..=12).contains(&month) && self.months[(month - 1) as usize]
    }

    /// Payout months in ascending order.
    pub fn months(&self) -> Vec<u32> {
        (1..=12).filter(|m| self.pays_in(*m)).collect()
    }

    /// Payouts per year.
    pub fn frequency(&self) -> u32 {
        self.frequency
    }
}

/// Known bond-fund schedule groups, keyed by ticker in
/// [`crate::services::payout_schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BondGroup {
    /// Pays monthly
    Monthly,
    /// Jan / Apr / Jul / Oct. Also the fallback for unlisted bond codes.
    PhaseOne,
    /// Feb / May / Aug / Nov
    PhaseTwo,
    /// Mar / Jun / Sep / Dec
    PhaseThree,
}

impl BondGroup {
    pub fn schedule(&self) -> PayoutSchedule {
        match self {
            BondGroup::Monthly => PayoutSchedule::MONTHLY,
            BondGroup::PhaseOne => PayoutSchedule::QUARTER_PHASE_1,
            BondGroup::PhaseTwo => PayoutSchedule::QUARTER_PHASE_2,
            BondGroup::PhaseThree => PayoutSchedule::QUARTER_PHASE_3,
        }
    }
}
