use serde::{Deserialize, Serialize};

use crate::models::{Course, CourseFields};

#[derive(Debug, Deserialize, Serialize)]
pub struct ListResponse {
    pub data: Vec<Course>,
}

/// Body of an update request: the full entity, identifier included.
#[derive(Debug, Serialize)]
pub struct UpdateRequest<'a> {
    #[serde(rename = "_id")]
    pub id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
}

impl<'a> UpdateRequest<'a> {
    pub fn new(id: &'a str, fields: &'a CourseFields) -> Self {
        Self {
            id,
            name: &fields.name,
            description: &fields.description,
        }
    }
}
