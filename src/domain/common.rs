use uuid::Uuid;

/// Entities addressable by a stable id.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Entities that carry a display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Finds an entity by id within a slice.
pub fn find_by_id<T: Identifiable>(items: &[T], id: Uuid) -> Option<&T> {
    items.iter().find(|item| item.id() == id)
}

/// Mutable companion to [`find_by_id`].
pub fn find_by_id_mut<T: Identifiable>(items: &mut [T], id: Uuid) -> Option<&mut T> {
    items.iter_mut().find(|item| item.id() == id)
}
