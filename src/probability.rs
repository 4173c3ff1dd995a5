use crate::{BIT_MODEL_TOTAL, NUM_MOVE_BITS, PROB_INIT};

/// Resets every probability counter of `probs` to the 50/50 state.
pub fn init_bit_models(probs: &mut [u16]) {
    probs.fill(PROB_INIT);
}

/// Returns a table of `N` freshly initialized probability counters.
pub const fn new_bit_models<const N: usize>() -> [u16; N] {
    [PROB_INIT; N]
}

/// Moves `prob` towards "0 is more likely" after a decoded or encoded 0 bit.
#[inline(always)]
pub const fn update_prob_0(prob: u16) -> u16 {
    prob + ((BIT_MODEL_TOTAL - prob as u32) >> NUM_MOVE_BITS) as u16
}

/// Moves `prob` towards "1 is more likely" after a decoded or encoded 1 bit.
#[inline(always)]
pub const fn update_prob_1(prob: u16) -> u16 {
    prob - (prob >> NUM_MOVE_BITS)
}
