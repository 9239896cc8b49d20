// services/records.rs - Operations shared by every record service
//
// Each mutation is a read followed by a write through `create_or_update`.
// Two concurrent writers on the same id race; the last write wins.

use tracing::debug;

use super::ServiceError;
use crate::database::accessor::{DataAccessor, Entity};

/// Live record by id, or `NotFound`
pub(crate) async fn fetch<T: Entity>(
    accessor: &dyn DataAccessor<T>,
    id: &str,
) -> Result<T, ServiceError> {
    accessor
        .get_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound(T::KIND))
}

/// Persist through the accessor; a `None` result is a failed update
pub(crate) async fn save<T: Entity>(
    accessor: &dyn DataAccessor<T>,
    entity: T,
) -> Result<T, ServiceError> {
    accessor
        .create_or_update(entity)
        .await?
        .ok_or(ServiceError::UpdateFailed)
}

/// Flag the record as deleted and write it back
pub(crate) async fn remove_softly<T: Entity>(
    accessor: &dyn DataAccessor<T>,
    id: &str,
) -> Result<bool, ServiceError> {
    let mut record = fetch(accessor, id).await?;
    record.mark_deleted();
    save(accessor, record).await?;
    debug!(kind = T::KIND, id, "soft deleted");
    Ok(true)
}
