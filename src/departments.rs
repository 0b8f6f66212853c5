use serde::{Deserialize, Serialize};

use crate::store::{Collection, Record, RecordId};

/// Read-only summary row; nothing in the client mutates departments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub employee_count: u32,
}

impl Record for Department {
    const COLLECTION: Collection = Collection::Departments;

    fn id(&self) -> &RecordId {
        &self.id
    }
}
