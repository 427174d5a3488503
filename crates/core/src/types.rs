//! Opaque identifier newtypes.
//!
//! Every entity id in the system is an opaque string. These wrappers keep a
//! `TaskId` from being accidentally compared to an `OwnerId` at the type
//! level while still being cheap `String` newtypes underneath.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

macro_rules! newtype_string {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(TaskId);
newtype_string!(OwnerId);
newtype_string!(ReminderId);
newtype_string!(RecurrenceId);
newtype_string!(NotificationId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_roundtrips_through_json() {
        let id = TaskId::new("task-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"task-1\"");
        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn distinct_newtypes_do_not_compare() {
        let task = TaskId::new("x");
        let owner = OwnerId::new("x");
        assert_eq!(task.as_str(), owner.as_str());
        // Compile-time guarantee: `task == owner` would not type-check.
    }
}
