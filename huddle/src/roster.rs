use serde::{Deserialize, Serialize};

use crate::session::PeerId;

/// Remote participants currently connected to the channel, in join order,
/// together with the local participant's membership.
///
/// When `joined` is false the peer list is stale and no video is rendered.
#[derive(Default, Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct PeerRoster {
    peers: Vec<PeerId>,
    joined: bool,
}

impl PeerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` unless it is already present. Returns whether the roster changed.
    pub fn on_user_joined(&mut self, id: PeerId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.peers.push(id);
        true
    }

    /// Removes `id` if present. Returns whether the roster changed.
    pub fn on_user_offline(&mut self, id: PeerId) -> bool {
        let before = self.peers.len();
        self.peers.retain(|peer| *peer != id);
        self.peers.len() != before
    }

    pub fn on_local_join_success(&mut self) {
        self.joined = true;
    }

    /// Local participant ended the call
    pub fn on_call_ended(&mut self) {
        self.peers.clear();
        self.joined = false;
    }

    pub fn joined(&self) -> bool {
        self.joined
    }

    pub fn peers(&self) -> &[PeerId] {
        &self.peers
    }

    pub fn contains(&self, id: PeerId) -> bool {
        self.peers.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use super::*;

    fn ids(roster: &PeerRoster) -> Vec<u32> {
        roster.peers().iter().map(PeerId::as_u32).collect()
    }

    #[test]
    fn duplicate_join_is_ignored() {
        let mut roster = PeerRoster::new();
        assert!(roster.on_user_joined(PeerId::new(7)));
        assert_eq!(ids(&roster), vec![7]);

        assert!(!roster.on_user_joined(PeerId::new(7)));
        assert_eq!(ids(&roster), vec![7]);

        assert!(roster.on_user_offline(PeerId::new(7)));
        assert!(roster.is_empty());
    }

    #[test]
    fn unknown_offline_is_ignored() {
        let mut roster = PeerRoster::new();
        roster.on_user_joined(PeerId::new(1));
        assert!(!roster.on_user_offline(PeerId::new(2)));
        assert_eq!(ids(&roster), vec![1]);
    }

    #[test]
    fn keeps_join_order() {
        let mut roster = PeerRoster::new();
        for id in [5, 2, 9, 2, 5, 1] {
            roster.on_user_joined(PeerId::new(id));
        }
        roster.on_user_offline(PeerId::new(9));
        assert_eq!(ids(&roster), vec![5, 2, 1]);
    }

    #[test]
    fn membership_is_net_of_joins_and_offlines() {
        // (join?, id) sequences with repeats and out-of-order removals
        let script: &[(bool, u32)] = &[
            (true, 3),
            (true, 4),
            (false, 8),
            (true, 3),
            (false, 3),
            (true, 8),
            (true, 3),
            (false, 4),
            (false, 4),
            (true, 11),
        ];

        let mut roster = PeerRoster::new();
        let mut expected = BTreeSet::new();
        for (join, id) in script {
            if *join {
                roster.on_user_joined(PeerId::new(*id));
                expected.insert(*id);
            } else {
                roster.on_user_offline(PeerId::new(*id));
                expected.remove(id);
            }

            let current = ids(&roster);
            let unique: BTreeSet<u32> = current.iter().copied().collect();
            assert_eq!(unique.len(), current.len(), "duplicate peer in {current:?}");
            assert_eq!(unique, expected);
        }
        assert_eq!(ids(&roster), vec![8, 3, 11]);
    }

    #[test]
    fn call_ended_resets_everything() {
        let mut roster = PeerRoster::new();
        roster.on_call_ended();
        assert!(roster.is_empty());
        assert!(!roster.joined());

        roster.on_local_join_success();
        roster.on_user_joined(PeerId::new(1));
        roster.on_user_joined(PeerId::new(2));
        assert!(roster.joined());

        roster.on_call_ended();
        assert!(roster.is_empty());
        assert!(!roster.joined());
    }
}
