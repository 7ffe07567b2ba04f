//! Per-cell transcription-factor pool.
//!
//! Three collections make up the pool:
//! - free TFs: identity → locus → lifespans, oldest first
//! - bound TFs: one lifespan per (identity, locus) slot
//! - pending morphogens: a schedule indexed by remaining TF updates
//!
//! Binding moves one free instance to the bound slot at the requested
//! locus, picking the closest free locus (the lower one on a tie).

use crate::config::TfConfig;
use crate::error::{MorphoError, Result};
use morphohw_data::{
    BoundTfEntry, FreeTfEntry, Lifespan, PendingTfEntry, TfIdentity, TfKind, TfPoolSnapshot,
    TfRecord,
};
use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound::{Excluded, Unbounded};

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingTf {
    identity: TfIdentity,
    locus: i64,
    ttl: i64,
}

#[derive(Debug, Clone)]
pub struct TfPool {
    settings: TfConfig,
    free: BTreeMap<TfIdentity, BTreeMap<i64, Vec<Lifespan>>>,
    bound: BTreeMap<(TfIdentity, i64), Lifespan>,
    pending: VecDeque<Vec<PendingTf>>,
}

impl TfPool {
    #[must_use]
    pub fn new(settings: TfConfig) -> Self {
        Self {
            settings,
            free: BTreeMap::new(),
            bound: BTreeMap::new(),
            pending: VecDeque::new(),
        }
    }

    /// Adds a free instance. Without an explicit TTL the lifespan follows
    /// the kind: cytoplasmic TFs never expire, the rest get `tf_lifespan`.
    pub fn create_tf(
        &mut self,
        identity: TfIdentity,
        kind: TfKind,
        locus: i64,
        explicit_ttl: Option<i64>,
    ) {
        let lifespan = match (explicit_ttl, kind) {
            (Some(ttl), _) => Lifespan::Ticks(ttl),
            (None, TfKind::Cytoplasmic) => Lifespan::Eternal,
            (None, TfKind::Local | TfKind::Morphogen) => Lifespan::Ticks(self.settings.tf_lifespan),
        };
        tracing::trace!(tf = %identity, locus, ?lifespan, "TF created");
        self.free
            .entry(identity)
            .or_default()
            .entry(locus)
            .or_default()
            .push(lifespan);
    }

    /// Any free instance of `identity`. `locus` is informational; free TFs
    /// match regardless of where they sit.
    #[must_use]
    pub fn get_free_tf(&self, identity: &TfIdentity, _locus: i64) -> Option<TfRecord> {
        self.free.get(identity).and_then(|by_locus| {
            by_locus.iter().find_map(|(&locus, lifespans)| {
                lifespans.first().map(|&lifespan| TfRecord {
                    identity: identity.clone(),
                    locus,
                    lifespan,
                })
            })
        })
    }

    /// The instance bound at exactly `locus`, if any.
    #[must_use]
    pub fn get_bound_tf(&self, identity: &TfIdentity, locus: i64) -> Option<TfRecord> {
        self.bound
            .get(&(identity.clone(), locus))
            .map(|&lifespan| TfRecord {
                identity: identity.clone(),
                locus,
                lifespan,
            })
    }

    /// Binds the free instance closest to `target` into the `(identity,
    /// target)` slot. `Ok(None)` when no free instance exists; an occupied
    /// slot is a contract violation and is never overwritten.
    pub fn bind_tf(&mut self, identity: &TfIdentity, target: i64) -> Result<Option<TfRecord>> {
        let Some(by_locus) = self.free.get_mut(identity) else {
            return Ok(None);
        };

        let lower = by_locus
            .range((Unbounded, Excluded(target)))
            .next_back()
            .map(|(&l, _)| l);
        let upper = by_locus.range(target..).next().map(|(&l, _)| l);
        let chosen = match (lower, upper) {
            (Some(lo), Some(hi)) => {
                if target.abs_diff(lo) <= hi.abs_diff(target) {
                    lo
                } else {
                    hi
                }
            }
            (Some(lo), None) => lo,
            (None, Some(hi)) => hi,
            (None, None) => return Ok(None),
        };

        let key = (identity.clone(), target);
        if self.bound.contains_key(&key) {
            return Err(MorphoError::contract(format!(
                "bound slot for {identity} at locus {target} is already occupied"
            )));
        }

        let Some(lifespans) = by_locus.get_mut(&chosen) else {
            return Ok(None);
        };
        if lifespans.is_empty() {
            return Ok(None);
        }
        let lifespan = lifespans.remove(0);
        if lifespans.is_empty() {
            by_locus.remove(&chosen);
        }
        if by_locus.is_empty() {
            self.free.remove(identity);
        }

        tracing::trace!(tf = %identity, from = chosen, to = target, "TF bound");
        self.bound.insert(key, lifespan);
        Ok(Some(TfRecord {
            identity: identity.clone(),
            locus: target,
            lifespan,
        }))
    }

    /// Queues a morphogen to appear as a free TF after `countdown + 1`
    /// updates of this pool.
    pub fn schedule_morphogen(&mut self, countdown: usize, identity: TfIdentity, locus: i64, ttl: i64) {
        if self.pending.len() <= countdown {
            self.pending.resize_with(countdown + 1, Vec::new);
        }
        self.pending[countdown].push(PendingTf {
            identity,
            locus,
            ttl,
        });
    }

    /// One tick of TF bookkeeping: age bound then free instances, release
    /// morphogens whose countdown reached zero, advance the schedule.
    pub fn update_tfs(&mut self) {
        let bound_rate = self.settings.bound_age_rate;
        let free_rate = self.settings.free_age_rate;

        self.bound.retain(|_, lifespan| match lifespan.age(bound_rate) {
            Some(aged) => {
                *lifespan = aged;
                true
            }
            None => false,
        });

        self.free.retain(|_, by_locus| {
            by_locus.retain(|_, lifespans| {
                *lifespans = lifespans
                    .iter()
                    .filter_map(|lifespan| lifespan.age(free_rate))
                    .collect();
                !lifespans.is_empty()
            });
            !by_locus.is_empty()
        });

        if let Some(released) = self.pending.pop_front() {
            for tf in released {
                self.create_tf(tf.identity, TfKind::Morphogen, tf.locus, Some(tf.ttl));
            }
        }
    }

    pub fn clear(&mut self) {
        self.free.clear();
        self.bound.clear();
        self.pending.clear();
    }

    /// Number of free instances across all identities and loci.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.bound.len()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.iter().map(Vec::len).sum()
    }

    /// Free instances whose sequence matches, in identity order.
    pub fn free_with_sequence<'a>(&'a self, sequence: &'a str) -> impl Iterator<Item = TfRecord> + 'a {
        self.free
            .iter()
            .filter(move |(identity, _)| identity.sequence == sequence)
            .flat_map(|(identity, by_locus)| {
                by_locus.iter().flat_map(move |(&locus, lifespans)| {
                    lifespans.iter().map(move |&lifespan| TfRecord {
                        identity: identity.clone(),
                        locus,
                        lifespan,
                    })
                })
            })
    }

    #[must_use]
    pub fn snapshot(&self) -> TfPoolSnapshot {
        let free = self
            .free
            .iter()
            .flat_map(|(identity, by_locus)| {
                by_locus.iter().map(|(&locus, lifespans)| FreeTfEntry {
                    identity: identity.clone(),
                    locus,
                    lifespans: lifespans.clone(),
                })
            })
            .collect();
        let bound = self
            .bound
            .iter()
            .map(|((identity, locus), &lifespan)| BoundTfEntry {
                identity: identity.clone(),
                locus: *locus,
                lifespan,
            })
            .collect();
        let pending = self
            .pending
            .iter()
            .enumerate()
            .flat_map(|(countdown, slot)| {
                slot.iter().map(move |tf| PendingTfEntry {
                    countdown,
                    identity: tf.identity.clone(),
                    locus: tf.locus,
                    ttl: tf.ttl,
                })
            })
            .collect();
        TfPoolSnapshot {
            free,
            bound,
            pending,
        }
    }

    /// Replaces the pool contents with a snapshot, keeping lifespan order.
    pub fn restore(&mut self, snapshot: &TfPoolSnapshot) -> Result<()> {
        self.clear();
        for entry in &snapshot.free {
            if entry.lifespans.is_empty() {
                continue;
            }
            self.free
                .entry(entry.identity.clone())
                .or_default()
                .entry(entry.locus)
                .or_default()
                .extend(entry.lifespans.iter().copied());
        }
        for entry in &snapshot.bound {
            let key = (entry.identity.clone(), entry.locus);
            if self.bound.insert(key, entry.lifespan).is_some() {
                return Err(MorphoError::snapshot(format!(
                    "duplicate bound TF {} at locus {}",
                    entry.identity, entry.locus
                )));
            }
        }
        for entry in &snapshot.pending {
            self.schedule_morphogen(entry.countdown, entry.identity.clone(), entry.locus, entry.ttl);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> TfPool {
        TfPool::new(TfConfig {
            tf_lifespan: 8,
            morphogen_lifespan: 8,
            free_age_rate: 3,
            bound_age_rate: 5,
            propagation_delay: 1,
        })
    }

    fn id(seq: &str) -> TfIdentity {
        TfIdentity::new("01", seq)
    }

    #[test]
    fn test_free_tf_expires_after_ceil_updates() {
        let mut pool = pool();
        pool.create_tf(id("A"), TfKind::Local, 0, None);

        // ttl 8, rate 3: 5, 2, then gone on the third update.
        pool.update_tfs();
        pool.update_tfs();
        assert!(pool.get_free_tf(&id("A"), 0).is_some());
        pool.update_tfs();
        assert!(pool.get_free_tf(&id("A"), 0).is_none());
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_cytoplasmic_never_expires() {
        let mut pool = pool();
        pool.create_tf(id("C"), TfKind::Cytoplasmic, 0, None);
        pool.bind_tf(&id("C"), 5).unwrap();
        pool.create_tf(id("C"), TfKind::Cytoplasmic, 0, None);
        for _ in 0..1000 {
            pool.update_tfs();
        }
        assert_eq!(
            pool.get_free_tf(&id("C"), 0).map(|r| r.lifespan),
            Some(Lifespan::Eternal)
        );
        assert_eq!(
            pool.get_bound_tf(&id("C"), 5).map(|r| r.lifespan),
            Some(Lifespan::Eternal)
        );
    }

    #[test]
    fn test_bind_prefers_closest_then_lower() {
        let mut pool = pool();
        pool.create_tf(id("A"), TfKind::Local, 10, None);
        pool.create_tf(id("A"), TfKind::Local, 20, None);
        pool.create_tf(id("A"), TfKind::Local, 31, None);

        // 15 is equidistant from 10 and 20.
        let rec = pool.bind_tf(&id("A"), 15).unwrap().unwrap();
        assert_eq!(rec.locus, 15);
        assert!(pool.get_bound_tf(&id("A"), 15).is_some());
        let left: Vec<i64> = pool.free_with_sequence("A").map(|r| r.locus).collect();
        assert_eq!(left, vec![20, 31]);

        pool.bind_tf(&id("A"), 30).unwrap().unwrap();
        let left: Vec<i64> = pool.free_with_sequence("A").map(|r| r.locus).collect();
        assert_eq!(left, vec![20]);
    }

    #[test]
    fn test_bind_takes_oldest_instance() {
        let mut pool = pool();
        pool.create_tf(id("A"), TfKind::Local, 0, Some(3));
        pool.create_tf(id("A"), TfKind::Local, 0, Some(9));
        let rec = pool.bind_tf(&id("A"), 0).unwrap().unwrap();
        assert_eq!(rec.lifespan, Lifespan::Ticks(3));
    }

    #[test]
    fn test_binding_is_exclusive() {
        let mut pool = pool();
        pool.create_tf(id("A"), TfKind::Local, 0, None);
        assert!(pool.bind_tf(&id("A"), 4).unwrap().is_some());
        assert!(pool.bind_tf(&id("A"), 4).unwrap().is_none());

        pool.create_tf(id("A"), TfKind::Local, 0, None);
        assert!(matches!(
            pool.bind_tf(&id("A"), 4),
            Err(MorphoError::Contract(_))
        ));
        // The free instance is left in place.
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn test_bound_ages_at_bound_rate() {
        let mut pool = pool();
        pool.create_tf(id("A"), TfKind::Local, 0, None);
        pool.bind_tf(&id("A"), 0).unwrap();
        pool.update_tfs();
        assert_eq!(
            pool.get_bound_tf(&id("A"), 0).map(|r| r.lifespan),
            Some(Lifespan::Ticks(3))
        );
        pool.update_tfs();
        assert_eq!(pool.bound_count(), 0);
    }

    #[test]
    fn test_morphogen_released_after_countdown() {
        let mut pool = pool();
        pool.schedule_morphogen(2, id("M"), 7, 4);
        for _ in 0..2 {
            pool.update_tfs();
            assert_eq!(pool.free_count(), 0);
        }
        pool.update_tfs();
        let rec = pool.get_free_tf(&id("M"), 0).unwrap();
        assert_eq!(rec.locus, 7);
        assert_eq!(rec.lifespan, Lifespan::Ticks(4));
        assert_eq!(pool.pending_count(), 0);
    }

    #[test]
    fn test_snapshot_restore_preserves_order() {
        let mut pool = pool();
        pool.create_tf(id("A"), TfKind::Local, 0, Some(2));
        pool.create_tf(id("A"), TfKind::Local, 0, Some(7));
        pool.create_tf(id("B"), TfKind::Cytoplasmic, 3, None);
        pool.bind_tf(&id("B"), 9).unwrap();
        pool.schedule_morphogen(1, id("M"), 1, 5);

        let snap = pool.snapshot();
        let mut restored = TfPool::new(TfConfig::default());
        restored.restore(&snap).unwrap();
        assert_eq!(restored.snapshot(), snap);

        let rec = restored.bind_tf(&id("A"), 0).unwrap().unwrap();
        assert_eq!(rec.lifespan, Lifespan::Ticks(2));
    }
}
