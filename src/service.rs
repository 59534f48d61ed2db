//! The inbound operations: one per endpoint, each resolving the election,
//! applying a mutation and shaping the response.

use std::sync::Arc;

use chrono::Utc;

use crate::code::CodeGenerator;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    api::election::{
        CandidateUpdate, CreatedView, ElectionSpec, JoinView, MutationView, RetrieveView,
        VirtualJoinView, VirtualRetrieveView,
    },
    common::{
        election::{ElectionCode, ElectionKind},
        photo::PhotoId,
    },
    db::{election::Election, photo::Photo},
    store::ElectionStore,
};
use crate::repository::ElectionRepository;
use crate::view::{self, FieldSelection, Viewer};
use crate::voting;

/// Whether a retrieval counts as use of the election.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Retrieval {
    /// Ordinary read, refreshes `last_used`.
    Read,
    /// Read immediately before deleting; leaves `last_used` alone.
    ForDeletion,
}

#[derive(Clone)]
pub struct ElectionService {
    repository: ElectionRepository,
    codes: CodeGenerator,
}

impl ElectionService {
    pub fn new(store: Arc<dyn ElectionStore>, config: &Config) -> Self {
        Self {
            repository: ElectionRepository::with_mutation_attempts(
                store,
                config.mutation_attempts(),
            ),
            codes: CodeGenerator::new(config.code_attempts()),
        }
    }

    pub fn repository(&self) -> &ElectionRepository {
        &self.repository
    }

    /// Create an election under a fresh code.
    ///
    /// A code can be taken between generation and insertion, so insertion
    /// failures with a duplicate code are retried with a new one.
    pub async fn create_election(&self, spec: ElectionSpec, kind: ElectionKind) -> Result<CreatedView> {
        let (photo, document) = spec.into_parts();
        let photo_id = self.repository.photos().store(photo).await?;

        for _ in 0..self.codes.max_attempts() {
            let code = match self.codes.generate(&self.repository).await {
                Ok(code) => code,
                Err(err) => return Err(self.abandon_photo(photo_id, err).await),
            };
            let election = Election::new(code, kind, document.clone(), photo_id, Utc::now());
            match self.repository.create(&election).await {
                Ok(()) => {
                    info!("Created {kind:?} election {}", election.code);
                    return Ok(CreatedView {
                        code: election.code,
                        data: election.document,
                    });
                }
                Err(Error::DuplicateCode(code)) => {
                    debug!("Lost the race for election code {code}, picking another");
                }
                Err(err) => return Err(self.abandon_photo(photo_id, err).await),
            }
        }

        let err = Error::CodeSpaceExhausted(self.codes.max_attempts());
        Err(self.abandon_photo(photo_id, err).await)
    }

    /// Don't leave a photo behind that no election ended up using.
    async fn abandon_photo(&self, photo_id: Option<PhotoId>, err: Error) -> Error {
        if let Some(photo_id) = photo_id {
            if let Err(release_err) = self.repository.photos().release_if_unreferenced(photo_id).await {
                warn!("Failed to release photo {photo_id}: {release_err}");
            }
        }
        err
    }

    pub async fn join(&self, code: &ElectionCode) -> Result<JoinView> {
        self.repository.increment_join(code).await?;
        let (election, photo) = self.repository.fetch_with_photo(code).await?;
        Ok(view::shared_join(election, photo))
    }

    pub async fn join_virtual(&self, code: &ElectionCode, viewer: Viewer) -> Result<VirtualJoinView> {
        self.repository.increment_join(code).await?;
        let (election, photo) = self.repository.fetch_with_photo(code).await?;
        Ok(view::virtual_join(election, photo, viewer))
    }

    pub async fn vote(&self, code: &ElectionCode, selections: &[usize]) -> Result<MutationView> {
        let election = self
            .repository
            .mutate(code, |document| voting::vote(document, selections))
            .await?;
        Ok(MutationView {
            data: election.document,
        })
    }

    /// Vote in a virtual election. The tally is never echoed back.
    pub async fn vote_virtual(&self, code: &ElectionCode, selections: &[usize]) -> Result<()> {
        self.repository
            .mutate_counting_voter(code, |document| voting::vote(document, selections))
            .await?;
        Ok(())
    }

    pub async fn take_seat(&self, code: &ElectionCode) -> Result<MutationView> {
        let election = self
            .repository
            .mutate(code, |document| {
                voting::take_seat(document);
                Ok(())
            })
            .await?;
        Ok(MutationView {
            data: election.document,
        })
    }

    pub async fn skip(&self, code: &ElectionCode) -> Result<MutationView> {
        let election = self
            .repository
            .mutate(code, |document| {
                voting::skip(document);
                Ok(())
            })
            .await?;
        Ok(MutationView {
            data: election.document,
        })
    }

    pub async fn update_candidate_state(
        &self,
        code: &ElectionCode,
        update: &CandidateUpdate,
    ) -> Result<MutationView> {
        let election = self
            .repository
            .mutate(code, |document| {
                voting::update_candidate_state(
                    document,
                    &update.name,
                    update.selected_state.clone(),
                )
            })
            .await?;
        Ok(MutationView {
            data: election.document,
        })
    }

    pub async fn retrieve(
        &self,
        code: &ElectionCode,
        selection: &FieldSelection,
        retrieval: Retrieval,
    ) -> Result<RetrieveView> {
        let election = self.repository.fetch(code).await?;
        if retrieval == Retrieval::Read {
            self.repository.touch(code).await?;
        }
        let photo = self.wanted_photo(&election, selection).await?;
        view::retrieve(&election, selection, photo.as_ref())
    }

    /// Like [`retrieve`](Self::retrieve), plus the voter count. Does not count as use.
    pub async fn retrieve_virtual(
        &self,
        code: &ElectionCode,
        selection: &FieldSelection,
    ) -> Result<VirtualRetrieveView> {
        let election = self.repository.fetch(code).await?;
        let photo = self.wanted_photo(&election, selection).await?;
        view::retrieve_virtual(&election, selection, photo.as_ref())
    }

    async fn wanted_photo(
        &self,
        election: &Election,
        selection: &FieldSelection,
    ) -> Result<Option<Photo>> {
        if selection.wants_photo {
            self.repository.photos().load(election.photo_id).await
        } else {
            Ok(None)
        }
    }

    /// Delete an election, answering with what it looked like just before.
    pub async fn delete_election(
        &self,
        code: &ElectionCode,
        selection: &FieldSelection,
    ) -> Result<RetrieveView> {
        let last_view = self.retrieve(code, selection, Retrieval::ForDeletion).await?;
        self.repository.delete(code).await?;
        Ok(last_view)
    }
}
