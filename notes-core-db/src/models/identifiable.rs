/// Trait for entities that are uniquely identified by a database-generated id
pub trait Identifiable {
    /// Returns the unique identifier of the entity (0 when not yet persisted)
    fn get_id(&self) -> i64;
}
