use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::{
    common::election::{ElectionCode, ElectionDocument},
    db::{election::Election, photo::Photo},
    store::{Commit, ElectionStore},
};
use crate::photo::PhotoStore;

/// Default bound on optimistic retries of a single mutation.
pub const DEFAULT_MUTATION_ATTEMPTS: u32 = 16;

/// Election persistence with atomic read-modify-write and photo cascade on delete.
#[derive(Clone)]
pub struct ElectionRepository {
    store: Arc<dyn ElectionStore>,
    photos: PhotoStore,
    mutation_attempts: u32,
}

impl ElectionRepository {
    pub fn new(store: Arc<dyn ElectionStore>) -> Self {
        Self::with_mutation_attempts(store, DEFAULT_MUTATION_ATTEMPTS)
    }

    pub fn with_mutation_attempts(store: Arc<dyn ElectionStore>, mutation_attempts: u32) -> Self {
        Self {
            photos: PhotoStore::new(store.clone()),
            store,
            mutation_attempts: mutation_attempts.max(1),
        }
    }

    pub fn photos(&self) -> &PhotoStore {
        &self.photos
    }

    /// Insert a new election. Fails with [`Error::DuplicateCode`] if the code is
    /// already taken, which callers should treat as a cue to pick another.
    pub async fn create(&self, election: &Election) -> Result<()> {
        self.store.insert_election(election).await
    }

    pub async fn exists(&self, code: &ElectionCode) -> Result<bool> {
        self.store.election_exists(code).await
    }

    pub async fn fetch(&self, code: &ElectionCode) -> Result<Election> {
        self.store
            .find_election(code)
            .await?
            .ok_or_else(|| Error::not_found(code))
    }

    /// Fetch an election along with its photo, if it has one.
    pub async fn fetch_with_photo(&self, code: &ElectionCode) -> Result<(Election, Option<Photo>)> {
        let election = self.fetch(code).await?;
        let photo = self.photos.load(election.photo_id).await?;
        Ok((election, photo))
    }

    /// Apply `mutation` to the current document and write it back, refreshing `last_used`.
    ///
    /// If the record changes between the read and the write, the whole cycle is
    /// retried on the fresh record. If `mutation` fails, nothing is written.
    pub async fn mutate<F>(&self, code: &ElectionCode, mutation: F) -> Result<Election>
    where
        F: FnMut(&mut ElectionDocument) -> Result<()> + Send,
    {
        self.read_modify_write(code, 0, mutation).await
    }

    /// [`mutate`](Self::mutate), also counting one more virtual voter in the same write.
    pub async fn mutate_counting_voter<F>(&self, code: &ElectionCode, mutation: F) -> Result<Election>
    where
        F: FnMut(&mut ElectionDocument) -> Result<()> + Send,
    {
        self.read_modify_write(code, 1, mutation).await
    }

    async fn read_modify_write<F>(
        &self,
        code: &ElectionCode,
        voters: u32,
        mut mutation: F,
    ) -> Result<Election>
    where
        F: FnMut(&mut ElectionDocument) -> Result<()> + Send,
    {
        for attempt in 1..=self.mutation_attempts {
            let mut election = self.fetch(code).await?;
            mutation(&mut election.document)?;

            let now = Utc::now();
            let commit = Commit {
                expected_revision: Some(election.revision),
                document: Some(election.document.clone()),
                voters,
                last_used: Some(now),
                ..Default::default()
            };
            if self.store.commit(code, commit).await? {
                election.revision += 1;
                election.voter_count += voters;
                election.last_used = now;
                return Ok(election);
            }
            debug!("Election {code} changed under mutation (attempt {attempt}), retrying");
        }
        warn!("Giving up on mutating election {code} after {} attempts", self.mutation_attempts);
        Err(Error::Contended(code.clone()))
    }

    /// Write counter increments and an optional `last_used` refresh without touching the document.
    async fn bump(&self, code: &ElectionCode, commit: Commit) -> Result<()> {
        if self.store.commit(code, commit).await? {
            Ok(())
        } else {
            Err(Error::not_found(code))
        }
    }

    /// Count a join and refresh `last_used`.
    pub async fn increment_join(&self, code: &ElectionCode) -> Result<()> {
        let commit = Commit {
            joins: 1,
            last_used: Some(Utc::now()),
            ..Default::default()
        };
        self.bump(code, commit).await
    }

    pub async fn increment_voter_count(&self, code: &ElectionCode) -> Result<()> {
        let commit = Commit {
            voters: 1,
            last_used: Some(Utc::now()),
            ..Default::default()
        };
        self.bump(code, commit).await
    }

    /// Refresh `last_used` only.
    pub async fn touch(&self, code: &ElectionCode) -> Result<()> {
        let commit = Commit {
            last_used: Some(Utc::now()),
            ..Default::default()
        };
        self.bump(code, commit).await
    }

    /// Remove an election and drop its reference to its photo.
    pub async fn delete(&self, code: &ElectionCode) -> Result<Election> {
        let election = self
            .store
            .remove_election(code)
            .await?
            .ok_or_else(|| Error::not_found(code))?;
        if let Some(photo_id) = election.photo_id {
            self.photos.release_if_unreferenced(photo_id).await?;
        }
        info!("Deleted election {code}");
        Ok(election)
    }

    /// Codes of elections last used strictly before `cutoff`.
    pub async fn unused_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<ElectionCode>> {
        self.store.elections_unused_since(cutoff).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::Duration;

    use crate::model::{common::photo::PhotoId, store::MemoryStore};
    use crate::voting;

    use super::*;

    /// A store where every revision-checked write loses to some other writer.
    #[derive(Default)]
    struct ConflictingStore {
        inner: MemoryStore,
        checked_commits: AtomicU32,
    }

    #[rocket::async_trait]
    impl ElectionStore for ConflictingStore {
        async fn insert_election(&self, election: &Election) -> Result<()> {
            self.inner.insert_election(election).await
        }

        async fn find_election(&self, code: &ElectionCode) -> Result<Option<Election>> {
            self.inner.find_election(code).await
        }

        async fn election_exists(&self, code: &ElectionCode) -> Result<bool> {
            self.inner.election_exists(code).await
        }

        async fn commit(&self, code: &ElectionCode, commit: Commit) -> Result<bool> {
            if commit.expected_revision.is_some() {
                self.checked_commits.fetch_add(1, Ordering::SeqCst);
                return Ok(false);
            }
            self.inner.commit(code, commit).await
        }

        async fn remove_election(&self, code: &ElectionCode) -> Result<Option<Election>> {
            self.inner.remove_election(code).await
        }

        async fn elections_unused_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<ElectionCode>> {
            self.inner.elections_unused_since(cutoff).await
        }

        async fn find_photo(&self, id: PhotoId) -> Result<Option<Photo>> {
            self.inner.find_photo(id).await
        }

        async fn acquire_photo(&self, content: String) -> Result<PhotoId> {
            self.inner.acquire_photo(content).await
        }

        async fn release_photo(&self, id: PhotoId) -> Result<bool> {
            self.inner.release_photo(id).await
        }
    }

    #[rocket::async_test]
    async fn endless_conflicts_give_up_after_configured_attempts() {
        let store = Arc::new(ConflictingStore::default());
        let repository = ElectionRepository::with_mutation_attempts(store.clone(), 5);
        let election = Election::example_aged("K7QX2M", Duration::zero(), None);
        repository.create(&election).await.unwrap();

        let result = repository
            .mutate(&election.code, |document| voting::vote(document, &[0]))
            .await;
        assert!(matches!(result, Err(Error::Contended(code)) if code == election.code));
        assert_eq!(store.checked_commits.load(Ordering::SeqCst), 5);
        assert_eq!(repository.fetch(&election.code).await.unwrap(), election);

        // Plain counter bumps are not revision-checked and still go through.
        repository.increment_join(&election.code).await.unwrap();
        assert_eq!(store.checked_commits.load(Ordering::SeqCst), 5);
    }

    #[backend_test]
    async fn mutate_refreshes_last_used(repository: ElectionRepository) {
        let election = Election::example_aged("K7QX2M", Duration::hours(2), None);
        repository.create(&election).await.unwrap();

        let before = Utc::now();
        let mutated = repository
            .mutate(&election.code, |document| {
                voting::take_seat(document);
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(mutated.document.number_of_seats_taken, Some(1));
        assert!(mutated.last_used >= before);

        let stored = repository.fetch(&election.code).await.unwrap();
        assert_eq!(stored, mutated);
    }

    #[backend_test]
    async fn failed_mutation_writes_nothing(repository: ElectionRepository) {
        let election = Election::example_aged("K7QX2M", Duration::hours(2), None);
        repository.create(&election).await.unwrap();

        let result = repository
            .mutate(&election.code, |document| voting::vote(document, &[0, 9]))
            .await;
        assert!(matches!(result, Err(Error::UnknownCandidateIndex(9))));

        let stored = repository.fetch(&election.code).await.unwrap();
        assert_eq!(stored, election);
    }

    #[backend_test]
    async fn voter_count_moves_with_document(repository: ElectionRepository) {
        let election = Election::example_aged("K7QX2M", Duration::zero(), None);
        repository.create(&election).await.unwrap();

        let mutated = repository
            .mutate_counting_voter(&election.code, |document| voting::vote(document, &[1]))
            .await
            .unwrap();
        assert_eq!(mutated.voter_count, 1);
        assert_eq!(mutated.document.number_of_voted, Some(1));
        assert_eq!(repository.fetch(&election.code).await.unwrap().voter_count, 1);
    }

    #[backend_test]
    async fn missing_elections_are_not_found(repository: ElectionRepository) {
        let code: ElectionCode = "K7QX2M".parse().unwrap();
        assert!(matches!(repository.fetch(&code).await, Err(Error::NotFound(_))));
        assert!(matches!(repository.increment_join(&code).await, Err(Error::NotFound(_))));
        assert!(matches!(repository.delete(&code).await, Err(Error::NotFound(_))));
        let result = repository.mutate(&code, |_| Ok(())).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[backend_test]
    async fn counters_increment(repository: ElectionRepository) {
        let election = Election::example_aged("K7QX2M", Duration::hours(3), None);
        repository.create(&election).await.unwrap();

        repository.increment_join(&election.code).await.unwrap();
        repository.increment_join(&election.code).await.unwrap();
        repository.increment_voter_count(&election.code).await.unwrap();

        let stored = repository.fetch(&election.code).await.unwrap();
        assert_eq!(stored.join_count, 2);
        assert_eq!(stored.voter_count, 1);
        assert!(stored.last_used > election.last_used);
        assert_eq!(stored.document, election.document);
    }
}
