use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted course. Only the server assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Course {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Course {
    pub fn fields(&self) -> CourseFields {
        CourseFields {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Editable course fields, also the body of an add request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFields {
    pub name: String,
    pub description: String,
}

impl CourseFields {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn get(&self, field: CourseField) -> &str {
        match field {
            CourseField::Name => &self.name,
            CourseField::Description => &self.description,
        }
    }

    pub fn set(&mut self, field: CourseField, value: impl Into<String>) {
        match field {
            CourseField::Name => self.name = value.into(),
            CourseField::Description => self.description = value.into(),
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> Course {
        Course {
            id: id.into(),
            name: self.name,
            description: self.description,
        }
    }
}

/// Body of an update request. The path identifier is authoritative, so the
/// `_id` echoed by clients is accepted but not required.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCourseRequest {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
}

impl From<UpdateCourseRequest> for CourseFields {
    fn from(req: UpdateCourseRequest) -> Self {
        CourseFields {
            name: req.name,
            description: req.description,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CourseField {
    Name,
    Description,
}

impl CourseField {
    pub const ALL: [CourseField; 2] = [CourseField::Name, CourseField::Description];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourseField::Name => "name",
            CourseField::Description => "description",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CourseField::Name => "Course Name",
            CourseField::Description => "Description",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

impl fmt::Display for CourseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
