//! Startup provisioning: database, tables, write procedures, default role.
//! Every statement is idempotent so the server can run it on each boot.

use crate::error::{AppError, ConfigError};
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Name of the role seeded on first boot.
pub const DEFAULT_ROLE_NAME: &str = "STUDENT";

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS roles (
        id BIGSERIAL PRIMARY KEY,
        name_role TEXT NOT NULL UNIQUE,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS class_rooms (
        id BIGSERIAL PRIMARY KEY,
        class_name TEXT NOT NULL UNIQUE,
        description TEXT,
        max_students INTEGER NOT NULL DEFAULT 0,
        current_students INTEGER NOT NULL DEFAULT 0,
        CONSTRAINT class_rooms_capacity CHECK (current_students <= max_students)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id BIGSERIAL PRIMARY KEY,
        student_code TEXT NOT NULL UNIQUE,
        full_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        date_of_birth DATE NOT NULL,
        address TEXT NOT NULL,
        gender TEXT NOT NULL CHECK (gender IN ('MALE', 'FEMALE')),
        class_room_id BIGINT NOT NULL REFERENCES class_rooms (id),
        role_id BIGINT NOT NULL REFERENCES roles (id)
    )
    "#,
];

/// `p_result` is 0 when the target class is full.
const CREATE_STU: &str = r#"
CREATE OR REPLACE PROCEDURE create_stu(
    p_class_id BIGINT,
    p_full_name TEXT,
    p_email TEXT,
    p_password TEXT,
    p_date_of_birth DATE,
    p_address TEXT,
    p_gender TEXT,
    p_stu_code TEXT,
    p_role_id BIGINT,
    INOUT p_result INTEGER DEFAULT 0
)
LANGUAGE plpgsql
AS $$
BEGIN
    UPDATE class_rooms
       SET current_students = current_students + 1
     WHERE id = p_class_id AND current_students < max_students;
    IF NOT FOUND THEN
        p_result := 0;
        RETURN;
    END IF;

    INSERT INTO students (student_code, full_name, email, password, date_of_birth,
                          address, gender, class_room_id, role_id)
    VALUES (p_stu_code, p_full_name, p_email, p_password, p_date_of_birth,
            p_address, p_gender, p_class_id, p_role_id);
    p_result := 1;
END;
$$
"#;

/// `p_result` is 0 when the student is missing or the new class is full.
const UPDATE_STU: &str = r#"
CREATE OR REPLACE PROCEDURE update_stu(
    p_class_id BIGINT,
    p_full_name TEXT,
    p_email TEXT,
    p_password TEXT,
    p_date_of_birth DATE,
    p_address TEXT,
    p_gender TEXT,
    p_stu_code TEXT,
    p_role_id BIGINT,
    INOUT p_result INTEGER DEFAULT 0
)
LANGUAGE plpgsql
AS $$
DECLARE
    v_old_class BIGINT;
BEGIN
    SELECT class_room_id INTO v_old_class
      FROM students
     WHERE student_code = p_stu_code
       FOR UPDATE;
    IF NOT FOUND THEN
        p_result := 0;
        RETURN;
    END IF;

    IF v_old_class <> p_class_id THEN
        UPDATE class_rooms
           SET current_students = current_students + 1
         WHERE id = p_class_id AND current_students < max_students;
        IF NOT FOUND THEN
            p_result := 0;
            RETURN;
        END IF;
        UPDATE class_rooms
           SET current_students = GREATEST(current_students - 1, 0)
         WHERE id = v_old_class;
    END IF;

    UPDATE students
       SET full_name = p_full_name,
           email = p_email,
           password = p_password,
           date_of_birth = p_date_of_birth,
           address = p_address,
           gender = p_gender,
           class_room_id = p_class_id,
           role_id = p_role_id
     WHERE student_code = p_stu_code;
    p_result := 1;
END;
$$
"#;

/// `p_result` is 0 when no row was removed.
const DELETE_STU: &str = r#"
CREATE OR REPLACE PROCEDURE delete_stu(
    p_stu_code TEXT,
    INOUT p_result INTEGER DEFAULT 0
)
LANGUAGE plpgsql
AS $$
DECLARE
    v_class BIGINT;
BEGIN
    DELETE FROM students
     WHERE student_code = p_stu_code
    RETURNING class_room_id INTO v_class;
    IF NOT FOUND THEN
        p_result := 0;
        RETURN;
    END IF;

    UPDATE class_rooms
       SET current_students = GREATEST(current_students - 1, 0)
     WHERE id = v_class;
    p_result := 1;
END;
$$
"#;

/// Create tables and (re)define the write procedures, then seed the default role.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), AppError> {
    for ddl in TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }
    for procedure in [CREATE_STU, UPDATE_STU, DELETE_STU] {
        sqlx::query(procedure).execute(pool).await?;
    }
    sqlx::query("INSERT INTO roles (name_role, description) VALUES ($1, $2) ON CONFLICT (name_role) DO NOTHING")
        .bind(DEFAULT_ROLE_NAME)
        .bind("Default role for enrolled students")
        .execute(pool)
        .await?;
    tracing::info!("schema and procedures ready");
    Ok(())
}

/// Connect to the `postgres` maintenance database and create the target
/// database named in `database_url` when it does not exist yet.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| ConfigError::Bootstrap(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| ConfigError::Bootstrap("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name_from_url() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@localhost:5432/student_records?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(db, "student_records");
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("school"), "\"school\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
