use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Course, CourseFields};

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, name, description FROM courses ORDER BY created_at ASC, rowid ASC",
    )
    .fetch_all(db)
    .await
}

pub async fn insert_course(db: &SqlitePool, fields: CourseFields) -> Result<Course, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO courses (id, name, description, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)
        "#,
    )
    .bind(&id)
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(fields.with_id(id))
}

pub async fn update_course(
    db: &SqlitePool,
    id: &str,
    fields: CourseFields,
) -> Result<Option<Course>, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let affected = sqlx::query(
        r#"
        UPDATE courses
        SET name = ?1,
            description = ?2,
            updated_at = ?3
        WHERE id = ?4
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(&now)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    Ok(Some(fields.with_id(id)))
}

pub async fn delete_course(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
