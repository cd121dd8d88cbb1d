//! Opaque ID newtypes.
//!
//! Every entity id is UUID-grade per spec.md §3. Newtypes prevent passing a
//! `LibraryId` where a `ProjectId` is expected at a DAO call site - a class
//! of bug that's easy to make once several engines pass ids around as plain
//! `Uuid`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
        )]
        #[sqlx(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(LibraryId);
id_newtype!(ProjectId);
id_newtype!(EventId);
id_newtype!(UpstreamVulnId);
id_newtype!(ClientVulnId);
id_newtype!(SnapshotId);
id_newtype!(AgentRunId);
id_newtype!(UserId);
