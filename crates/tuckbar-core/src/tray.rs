/// Hands out notification-area icon identities.
///
/// A restarted shell forgets every identity it was told about, so each
/// (re)created icon gets a new one. Identities start at 1 and only grow.
#[derive(Debug, Default)]
pub struct TrayIds {
    last: u32,
}

impl TrayIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an identity never handed out before by this counter.
    pub fn fresh(&mut self) -> u32 {
        self.last = self.last.wrapping_add(1).max(1);
        self.last
    }

    /// The most recently issued identity, or 0 if none yet.
    pub fn current(&self) -> u32 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_identity_is_one() {
        let mut ids = TrayIds::new();
        assert_eq!(ids.current(), 0);
        assert_eq!(ids.fresh(), 1);
    }

    #[test]
    fn identities_increase_on_every_recreation() {
        let mut ids = TrayIds::new();
        let issued: Vec<u32> = (0..4).map(|_| ids.fresh()).collect();
        assert_eq!(issued, vec![1, 2, 3, 4]);
        assert_eq!(ids.current(), 4);
    }
}
