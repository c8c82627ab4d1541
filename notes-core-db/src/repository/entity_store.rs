use crate::models::entity::Entity;

use super::{Create, Delete, FindWhere, First, List, Updates};

/// Every single-entity repository operation on one entity type.
pub trait EntityStore<E: Entity>:
    FindWhere<E> + First<E> + Create<E> + Updates<E> + Delete<E> + List<E>
{
}

impl<E, S> EntityStore<E> for S
where
    E: Entity,
    S: FindWhere<E> + First<E> + Create<E> + Updates<E> + Delete<E> + List<E>,
{
}
