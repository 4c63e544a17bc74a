
use crate::attributes::*;
use crate::checks::*;
use crate::error::*;
use crate::message::*;

const PRIORITY_SIZE: usize = 4; // 32 bit
pub(crate) const TIE_BREAKER_SIZE: usize = 8; // 64 bit

/// PriorityAttr represents PRIORITY attribute.
///
/// RFC 5245 Section 19.1
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub struct PriorityAttr(pub u32);

impl Setter for PriorityAttr {
    /// add_to adds PRIORITY to message.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(ATTR_PRIORITY, &self.0.to_be_bytes());
        Ok(())
    }
}

impl Getter for PriorityAttr {
    /// get_from decodes PRIORITY from message.
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let v = m.get(ATTR_PRIORITY)?;
        check_size(ATTR_PRIORITY, v.len(), PRIORITY_SIZE)?;
        self.0 = u32::from_be_bytes([v[0], v[1], v[2], v[3]]);
        Ok(())
    }
}

/// UseCandidateAttr represents USE-CANDIDATE attribute: a flag with no
/// value, set by the controlling agent.
///
/// RFC 5245 Section 19.1
#[derive(Default)]
pub struct UseCandidateAttr;

impl Setter for UseCandidateAttr {
    /// add_to adds USE-CANDIDATE attribute to message.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(ATTR_USE_CANDIDATE, &[]);
        Ok(())
    }
}

impl UseCandidateAttr {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// is_set returns true if USE-CANDIDATE attribute is present.
    #[must_use]
    pub fn is_set(m: &Message) -> bool {
        m.get(ATTR_USE_CANDIDATE).is_ok()
    }
}

/// TieBreaker is the common value carried by ICE-CONTROLLED and
/// ICE-CONTROLLING for role-conflict resolution.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub struct TieBreaker(pub u64);

impl TieBreaker {
    /// add_to_as adds the tie-breaker value to m as a t attribute.
    pub fn add_to_as(self, m: &mut Message, t: AttrType) -> Result<()> {
        m.add(t, &self.0.to_be_bytes());
        Ok(())
    }

    /// get_from_as decodes the tie-breaker value in message getting it as
    /// a t attribute.
    pub fn get_from_as(&mut self, m: &Message, t: AttrType) -> Result<()> {
        let v = m.get(t)?;
        check_size(t, v.len(), TIE_BREAKER_SIZE)?;
        self.0 = u64::from_be_bytes([v[0], v[1], v[2], v[3], v[4], v[5], v[6], v[7]]);
        Ok(())
    }
}

/// AttrControlled represents ICE-CONTROLLED attribute.
///
/// RFC 5245 Section 19.1
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub struct AttrControlled(pub u64);

impl Setter for AttrControlled {
    /// add_to adds ICE-CONTROLLED to message.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        TieBreaker(self.0).add_to_as(m, ATTR_ICE_CONTROLLED)
    }
}

impl Getter for AttrControlled {
    /// get_from decodes ICE-CONTROLLED from message.
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let mut t = TieBreaker::default();
        t.get_from_as(m, ATTR_ICE_CONTROLLED)?;
        self.0 = t.0;
        Ok(())
    }
}

/// AttrControlling represents ICE-CONTROLLING attribute.
///
/// RFC 5245 Section 19.1
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub struct AttrControlling(pub u64);

impl Setter for AttrControlling {
    /// add_to adds ICE-CONTROLLING to message.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        TieBreaker(self.0).add_to_as(m, ATTR_ICE_CONTROLLING)
    }
}

impl Getter for AttrControlling {
    /// get_from decodes ICE-CONTROLLING from message.
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let mut t = TieBreaker::default();
        t.get_from_as(m, ATTR_ICE_CONTROLLING)?;
        self.0 = t.0;
        Ok(())
    }
}
