//! Round-robin selection over a fixed set of chain clients

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{PriceError, PriceResult};

/// Fixed list of client handles, one per RPC endpoint.
///
/// No health checks and no failover: a dead endpoint fails whatever lookup
/// it was picked for.
pub struct ChainClientPool<C> {
    clients: Vec<C>,
    counter: AtomicUsize,
}

impl<C> ChainClientPool<C> {
    pub fn new(clients: Vec<C>) -> PriceResult<Self> {
        if clients.is_empty() {
            return Err(PriceError::InvalidConfig("no rpc clients configured".to_string()));
        }
        Ok(Self {
            clients,
            counter: AtomicUsize::new(0),
        })
    }

    /// Next client in turn. The first call returns index 0.
    pub fn next(&self) -> &C {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        &self.clients[n % self.clients.len()]
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn clients(&self) -> &[C] {
        &self.clients
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_round_robin_order() {
        let pool = ChainClientPool::new(vec![0usize, 1, 2]).unwrap();
        let picks: Vec<usize> = (0..9).map(|_| *pool.next()).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_even_distribution_across_threads() {
        let pool = Arc::new(ChainClientPool::new(vec![0usize, 1, 2]).unwrap());

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let pool = pool.clone();
                std::thread::spawn(move || (0..300).map(|_| *pool.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut counts = [0usize; 3];
        for handle in handles {
            for idx in handle.join().unwrap() {
                counts[idx] += 1;
            }
        }
        assert_eq!(counts, [300, 300, 300]);
    }

    #[test]
    fn test_empty_pool_rejected() {
        assert!(ChainClientPool::<usize>::new(vec![]).is_err());
    }

    #[test]
    fn test_single_client() {
        let pool = ChainClientPool::new(vec!["only"]).unwrap();
        assert_eq!(pool.len(), 1);
        for _ in 0..5 {
            assert_eq!(*pool.next(), "only");
        }
    }
}
