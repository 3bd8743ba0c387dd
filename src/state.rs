//! Packing of a boxes-state and an agent index into one search key.

use std::fmt;

use crate::combination::BoxesState;
use crate::index::{SpaceIndex, MAX_SPACES};

const AGENT_BITS: u32 = 16;
const AGENT_MASK: u64 = (1 << AGENT_BITS) - 1;

const _: () = assert!(MAX_SPACES as u64 <= AGENT_MASK);

/// `boxes_state << 16 | agent_index`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CompositeState(u64);

impl CompositeState {
    #[inline(always)]
    pub fn encode(boxes: BoxesState, agent: SpaceIndex) -> Self {
        CompositeState((u64::from(boxes.get()) << AGENT_BITS) | u64::from(agent.get()))
    }

    #[inline(always)]
    pub fn decode(self) -> (BoxesState, SpaceIndex) {
        (self.boxes(), self.agent())
    }

    #[inline(always)]
    pub fn boxes(self) -> BoxesState {
        BoxesState::new((self.0 >> AGENT_BITS) as u32)
    }

    #[inline(always)]
    pub fn agent(self) -> SpaceIndex {
        SpaceIndex::new((self.0 & AGENT_MASK) as u16)
    }

    #[inline(always)]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn from_raw(raw: u64) -> Self {
        CompositeState(raw)
    }
}

impl fmt::Display for CompositeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.boxes(), self.agent())
    }
}
