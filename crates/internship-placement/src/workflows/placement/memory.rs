use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::application::InternshipApplication;
use super::domain::{ApplicationId, OpportunityId, WithdrawalRequestId};
use super::opportunity::Opportunity;
use super::repository::{
    ChangeSet, EntityKind, IdGenerator, NoticeError, NoticePublisher, PlacementNotice,
    PlacementRepository, RepositoryError,
};
use super::withdrawal::WithdrawalRequest;

#[derive(Debug, Default)]
struct PlacementStore {
    opportunities: BTreeMap<OpportunityId, Opportunity>,
    applications: BTreeMap<ApplicationId, InternshipApplication>,
    withdrawals: BTreeMap<WithdrawalRequestId, WithdrawalRequest>,
}

/// Process-local repository used by the demo service and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPlacementRepository {
    store: Arc<Mutex<PlacementStore>>,
}

impl InMemoryPlacementRepository {
    fn lock(&self) -> Result<MutexGuard<'_, PlacementStore>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("placement store lock poisoned".to_string()))
    }
}

impl PlacementRepository for InMemoryPlacementRepository {
    fn opportunity(&self, id: &OpportunityId) -> Result<Option<Opportunity>, RepositoryError> {
        Ok(self.lock()?.opportunities.get(id).cloned())
    }

    fn application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<InternshipApplication>, RepositoryError> {
        Ok(self.lock()?.applications.get(id).cloned())
    }

    fn withdrawal(
        &self,
        id: &WithdrawalRequestId,
    ) -> Result<Option<WithdrawalRequest>, RepositoryError> {
        Ok(self.lock()?.withdrawals.get(id).cloned())
    }

    fn opportunities(&self) -> Result<Vec<Opportunity>, RepositoryError> {
        Ok(self.lock()?.opportunities.values().cloned().collect())
    }

    fn applications(&self) -> Result<Vec<InternshipApplication>, RepositoryError> {
        Ok(self.lock()?.applications.values().cloned().collect())
    }

    fn withdrawals(&self) -> Result<Vec<WithdrawalRequest>, RepositoryError> {
        Ok(self.lock()?.withdrawals.values().cloned().collect())
    }

    fn commit(&self, changes: ChangeSet) -> Result<(), RepositoryError> {
        let mut store = self.lock()?;
        for id in &changes.removed_opportunities {
            if !store.opportunities.contains_key(id) {
                return Err(RepositoryError::NotFound);
            }
        }

        for opportunity in changes.opportunities {
            store
                .opportunities
                .insert(opportunity.id.clone(), opportunity);
        }
        for application in changes.applications {
            store
                .applications
                .insert(application.id.clone(), application);
        }
        for withdrawal in changes.withdrawals {
            store.withdrawals.insert(withdrawal.id.clone(), withdrawal);
        }
        for id in changes.removed_opportunities {
            store.opportunities.remove(&id);
        }
        Ok(())
    }
}

/// Per-kind counters producing `INT0001`, `APP0001`, `WR0001`, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    opportunities: AtomicU64,
    applications: AtomicU64,
    withdrawals: AtomicU64,
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self {
            opportunities: AtomicU64::new(1),
            applications: AtomicU64::new(1),
            withdrawals: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next(&self, kind: EntityKind) -> String {
        let counter = match kind {
            EntityKind::Opportunity => &self.opportunities,
            EntityKind::Application => &self.applications,
            EntityKind::WithdrawalRequest => &self.withdrawals,
        };
        let sequence = counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{sequence:04}", kind.prefix())
    }
}

/// Collects notices so callers can render or assert on them.
#[derive(Debug, Default, Clone)]
pub struct InMemoryNoticePublisher {
    events: Arc<Mutex<Vec<PlacementNotice>>>,
}

impl InMemoryNoticePublisher {
    pub fn events(&self) -> Vec<PlacementNotice> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn drain(&self) -> Vec<PlacementNotice> {
        match self.events.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl NoticePublisher for InMemoryNoticePublisher {
    fn publish(&self, notice: PlacementNotice) -> Result<(), NoticeError> {
        self.events
            .lock()
            .map_err(|_| NoticeError::Transport("notice buffer lock poisoned".to_string()))?
            .push(notice);
        Ok(())
    }
}
