use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::model::common::election::ElectionCode;
use crate::repository::ElectionRepository;

/// Default bound on how many codes are tried before giving up.
pub const DEFAULT_CODE_ATTEMPTS: u32 = 10;

/// Picks election codes that are not currently in use.
///
/// The check against the repository is only advisory: two creations can race
/// between the check and the insert, so the insert itself must still be
/// prepared to see [`Error::DuplicateCode`].
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    max_attempts: u32,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_ATTEMPTS)
    }
}

impl CodeGenerator {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub async fn generate(&self, repository: &ElectionRepository) -> Result<ElectionCode> {
        // `ThreadRng` is not `Send`, so it cannot be held across the awaits below.
        let mut rng = StdRng::from_entropy();
        self.generate_with(repository, &mut rng).await
    }

    /// Sample codes from `rng` until one is unused, up to the attempt bound.
    pub async fn generate_with<R>(
        &self,
        repository: &ElectionRepository,
        rng: &mut R,
    ) -> Result<ElectionCode>
    where
        R: Rng + Send,
    {
        for _ in 0..self.max_attempts {
            let code = ElectionCode::random(rng);
            if !repository.exists(&code).await? {
                return Ok(code);
            }
            debug!("Election code {code} already in use");
        }
        Err(Error::CodeSpaceExhausted(self.max_attempts))
    }
}
