//! Dice DTOs - The request/response protocol with the dice resolver

use serde::{Deserialize, Serialize};

/// Dice every roll starts with
pub const BASE_DICE: u32 = 2;
/// No roll may use more dice than this
pub const MAX_DICE: u32 = 5;
/// Price of the first, second and third purchased die
pub const EXTRA_DIE_COSTS: [u32; 3] = [1, 2, 3];

/// What the dice resolver is asked to roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRequest {
    /// Attribute plus skill; a die at or under it is a success
    pub target_number: u32,
    pub difficulty: u32,
    pub dice_count: u32,
    /// A die at or under this scores two successes
    pub focus: u32,
}

/// What the dice resolver reports back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DiceResponse {
    pub successes: u32,
    pub complications: u32,
    pub momentum_generated: u32,
    /// Individual die faces, for display
    #[serde(default)]
    pub rolls: Vec<u32>,
}

impl DiceResponse {
    pub fn succeeded(&self, difficulty: u32) -> bool {
        self.successes >= difficulty
    }
}

/// A caller's description of the roll they want to make
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RollRequest {
    pub attribute: u32,
    pub skill: u32,
    /// A relevant focus doubles successes at or under the skill
    #[serde(default)]
    pub has_focus: bool,
    /// Free dice granted by assets or circumstances
    #[serde(default)]
    pub bonus_dice: u32,
    /// Dice bought with momentum (or threat)
    #[serde(default)]
    pub extra_dice: u32,
    /// Buy the extra dice by adding threat instead of spending momentum
    #[serde(default)]
    pub pay_with_threat: bool,
}

/// Resources a caller has to spend; the engine never debits them itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResourceCost {
    pub momentum: u32,
    pub threat: u32,
}

impl ResourceCost {
    pub fn momentum(amount: u32) -> Self {
        Self {
            momentum: amount,
            threat: 0,
        }
    }

    pub fn is_free(&self) -> bool {
        self.momentum == 0 && self.threat == 0
    }
}

/// A prepared roll, ready for the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollPlan {
    pub request: DiceRequest,
    /// Extra dice that fit under the cap
    pub extra_dice: u32,
    pub cost: ResourceCost,
}

/// Turn a difficulty and a roll description into a dice request
///
/// Bonus dice are applied before purchased ones; whatever would push the pool
/// past [`MAX_DICE`] is dropped and not charged for.
pub fn plan_roll(difficulty: u32, roll: RollRequest) -> RollPlan {
    let with_bonus = BASE_DICE.saturating_add(roll.bonus_dice).min(MAX_DICE);
    let extra_dice = roll
        .extra_dice
        .min(MAX_DICE - with_bonus)
        .min(EXTRA_DIE_COSTS.len() as u32);
    let price: u32 = EXTRA_DIE_COSTS.iter().take(extra_dice as usize).sum();
    let cost = if roll.pay_with_threat {
        ResourceCost {
            momentum: 0,
            threat: price,
        }
    } else {
        ResourceCost::momentum(price)
    };

    RollPlan {
        request: DiceRequest {
            target_number: roll.attribute.saturating_add(roll.skill),
            difficulty,
            dice_count: with_bonus + extra_dice,
            focus: if roll.has_focus { roll.skill.max(1) } else { 1 },
        },
        extra_dice,
        cost,
    }
}
