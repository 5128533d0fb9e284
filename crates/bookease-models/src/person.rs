//! The contract shared by every entity that represents a person.
//!
//! Clinics, doctors and patients each own exactly one [`User`]. Mutating or
//! deactivating such an entity is only allowed to the caller whose username
//! matches that user, and deactivation always clears the entity's flag and
//! the user's flag together.

use uuid::Uuid;

use crate::users::User;

pub trait PersonOwned: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;

    fn user(&self) -> &User;

    fn user_mut(&mut self) -> &mut User;

    fn is_active(&self) -> bool;

    fn set_active(&mut self, active: bool);

    /// Clears the entity's active flag and its linked user's active flag.
    fn deactivate(&mut self) {
        self.set_active(false);
        self.user_mut().active = false;
    }
}

/// Implements [`PersonOwned`] for a struct with `id`, `user` and `active` fields.
macro_rules! impl_person_owned {
    ($ty:ty) => {
        impl $crate::person::PersonOwned for $ty {
            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn user(&self) -> &$crate::users::User {
                &self.user
            }

            fn user_mut(&mut self) -> &mut $crate::users::User {
                &mut self.user
            }

            fn is_active(&self) -> bool {
                self.active
            }

            fn set_active(&mut self, active: bool) {
                self.active = active;
            }
        }
    };
}

pub(crate) use impl_person_owned;
