use crate::error::SignalError;
use crate::protocol::Identity;

/// Live-identity membership table, kept in connection order.
///
/// An identity in here has an open transport connection right now. Removal is
/// irreversible: a client that reconnects shows up as a new identity.
#[derive(Debug, Default)]
pub struct Registry {
    peers: Vec<Identity>,
}

impl Registry {
    pub fn register(&mut self, identity: Identity) -> Result<(), SignalError> {
        if self.peers.contains(&identity) {
            return Err(SignalError::DuplicateIdentity);
        }
        self.peers.push(identity);
        Ok(())
    }

    /// Returns false if the identity was not registered (already removed).
    pub fn unregister(&mut self, identity: Identity) -> bool {
        let before = self.peers.len();
        self.peers.retain(|p| *p != identity);
        self.peers.len() != before
    }

    pub fn contains(&self, identity: Identity) -> bool {
        self.peers.contains(&identity)
    }

    /// Roster for the "who can I call" listing: everyone except the
    /// requester, in connection order.
    pub fn others(&self, excluding: Identity) -> Vec<Identity> {
        self.peers
            .iter()
            .copied()
            .filter(|p| *p != excluding)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Identity> + '_ {
        self.peers.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_tracks_register_and_unregister() {
        let mut registry = Registry::default();
        let a = Identity::generate();
        let b = Identity::generate();

        registry.register(a).unwrap();
        registry.register(b).unwrap();
        assert!(registry.contains(a));
        assert!(registry.contains(b));
        assert_eq!(registry.len(), 2);

        assert!(registry.unregister(a));
        assert!(!registry.contains(a));
        assert!(registry.contains(b));

        // Second removal is a no-op, not an error.
        assert!(!registry.unregister(a));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_is_rejected_without_corruption() {
        let mut registry = Registry::default();
        let a = Identity::generate();
        registry.register(a).unwrap();
        assert_eq!(registry.register(a), Err(SignalError::DuplicateIdentity));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn others_excludes_requester_and_keeps_connection_order() {
        let mut registry = Registry::default();
        let ids: Vec<Identity> = (0..4).map(|_| Identity::generate()).collect();
        for id in &ids {
            registry.register(*id).unwrap();
        }

        assert_eq!(registry.others(ids[1]), vec![ids[0], ids[2], ids[3]]);

        registry.unregister(ids[0]);
        assert_eq!(registry.others(ids[1]), vec![ids[2], ids[3]]);
    }
}
