use uuid::Uuid;

use crate::domain::owner::OwnerId;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Entities that belong exclusively to one user.
pub trait Owned {
    fn owner(&self) -> &OwnerId;

    fn is_owned_by(&self, owner: &OwnerId) -> bool {
        self.owner() == owner
    }
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}
