//! [`RecordService`]: plaintext at the boundary, ciphertext at rest.

use std::sync::Arc;

use common::{RecordDto, ServiceError};
use tracing::{debug, info, warn};

use crate::crypto::FieldCipher;
use crate::record::{BoundRecord, ProtectedRecord};
use crate::storage::{RecordRepository, StorageError};

/// Create/read/update/delete over encrypted records.
///
/// Holds no mutable state of its own; every call works on fresh
/// [`BoundRecord`]s built from what storage returns. Cloning is cheap.
///
/// # Consistency
///
/// [`RecordService::update`] is a read-modify-write without a version token:
/// two concurrent updates of the same id interleave and the later write wins.
#[derive(Clone)]
pub struct RecordService {
    repository: Arc<dyn RecordRepository>,
    cipher: Arc<dyn FieldCipher>,
}

impl RecordService {
    pub fn new(repository: Arc<dyn RecordRepository>, cipher: Arc<dyn FieldCipher>) -> Self {
        Self { repository, cipher }
    }

    fn bind(&self, record: ProtectedRecord) -> BoundRecord<'_> {
        BoundRecord::bind(self.cipher.as_ref(), record)
    }

    /// Encrypt and store a new record; returns it with its assigned id and
    /// the submitted plaintext.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Validation`] if a field is too long once encrypted,
    /// [`ServiceError::Storage`] if the insert fails, or a crypto error if the
    /// stored text does not decrypt back.
    pub async fn create(&self, dto: &RecordDto) -> Result<RecordDto, ServiceError> {
        let bound = BoundRecord::create_with_encryption(
            self.cipher.as_ref(),
            &dto.user_document,
            &dto.credit_card_token,
            dto.value,
        );
        bound.record().validate()?;

        let stored = self.repository.add(bound.into_record()).await?;
        let created = self.bind(stored).to_dto()?;
        info!(record_id = created.id, "record created");
        Ok(created)
    }

    /// Fetch and decrypt one record; `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Storage`] on backend failure, or a crypto error if the
    /// stored text does not decrypt.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<RecordDto>, ServiceError> {
        let Some(stored) = self.repository.get_by_id(id).await? else {
            debug!(record_id = id, "record not found");
            return Ok(None);
        };
        Ok(Some(self.bind(stored).to_dto()?))
    }

    /// Fetch and decrypt every record.
    ///
    /// # Errors
    ///
    /// Fails as a whole if storage fails or any single record does not decrypt.
    pub async fn get_all(&self) -> Result<Vec<RecordDto>, ServiceError> {
        let stored = self.repository.get_all().await?;
        let dtos = stored
            .into_iter()
            .map(|record| self.bind(record).to_dto())
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = dtos.len(), "records listed");
        Ok(dtos)
    }

    /// Stored form of one record, ciphertext untouched.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Storage`] on backend failure.
    pub async fn get_raw_by_id(&self, id: i64) -> Result<Option<ProtectedRecord>, ServiceError> {
        Ok(self.repository.get_by_id(id).await?)
    }

    /// Stored form of every record, ciphertext untouched.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Storage`] on backend failure.
    pub async fn get_all_raw(&self) -> Result<Vec<ProtectedRecord>, ServiceError> {
        Ok(self.repository.get_all().await?)
    }

    /// Re-encrypt a record with new plaintext; `None` if the id is unknown.
    ///
    /// The new ciphertext is produced on a transient bound copy of the stored
    /// record and then copied back onto the stored record before it is
    /// written, so storage only ever sees the record it handed out.
    ///
    /// # Errors
    ///
    /// Same as [`RecordService::create`].
    pub async fn update(&self, id: i64, dto: &RecordDto) -> Result<Option<RecordDto>, ServiceError> {
        let Some(mut existing) = self.repository.get_by_id(id).await? else {
            debug!(record_id = id, "update target not found");
            return Ok(None);
        };

        let mut transient = self.bind(existing.clone());
        transient.set_user_document(&dto.user_document);
        transient.set_card_token(&dto.credit_card_token);
        transient.set_value(dto.value);
        transient.record().validate()?;

        existing.user_document = transient.record().user_document.clone();
        existing.card_token = transient.record().card_token.clone();
        existing.value = transient.value();

        match self.repository.update(existing).await {
            Ok(()) => {}
            Err(StorageError::Missing(_)) => {
                warn!(record_id = id, "record deleted while being updated");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        info!(record_id = id, "record updated");
        Ok(Some(transient.to_dto()?))
    }

    /// Delete a record; `false` if the id is unknown.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Storage`] on backend failure.
    pub async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let Some(existing) = self.repository.get_by_id(id).await? else {
            debug!(record_id = id, "delete target not found");
            return Ok(false);
        };

        match self.repository.delete(existing).await {
            Ok(()) => {
                info!(record_id = id, "record deleted");
                Ok(true)
            }
            Err(StorageError::Missing(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Number of stored records, used as the storage readiness probe.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Storage`] on backend failure.
    pub async fn count(&self) -> Result<usize, ServiceError> {
        Ok(self.repository.count().await?)
    }
}
