pub mod course;

pub use course::{Course, CourseField, CourseFields, UpdateCourseRequest};
