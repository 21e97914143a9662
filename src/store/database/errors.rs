use std::error::Error;
use std::fmt;

use sqlx::error::Error as SqlxError;
use sqlx::postgres::PgDatabaseError;

use crate::models::errors::{AppError, AppErrorKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DBErrorKind {
  NoRows,
  UniqueViolation,
  ForeignKeyViolation,
  NotNullViolation,
  Connection,
  Internal,
}

impl fmt::Display for DBErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DBErrorKind::NoRows => write!(f, "no_rows"),
      DBErrorKind::UniqueViolation => write!(f, "unique_violation"),
      DBErrorKind::ForeignKeyViolation => write!(f, "foreign_key_violation"),
      DBErrorKind::NotNullViolation => write!(f, "not_null_violation"),
      DBErrorKind::Connection => write!(f, "connection_exception"),
      DBErrorKind::Internal => write!(f, "internal_error"),
    }
  }
}

#[derive(Debug)]
pub struct DBError {
  pub kind: DBErrorKind,
  pub msg: String,
  pub op: String,
  pub source: Option<Box<dyn Error + Send + Sync>>,
}

impl DBError {
  pub fn new(
    kind: DBErrorKind,
    source: Option<Box<dyn Error + Send + Sync>>,
    msg: impl Into<String>,
    op: impl Into<String>,
  ) -> Self {
    Self { kind, msg: msg.into(), op: op.into(), source }
  }

  pub fn is_no_rows(&self) -> bool {
    self.kind == DBErrorKind::NoRows
  }
}

impl fmt::Display for DBError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut parts = Vec::new();

    if !self.op.is_empty() {
      parts.push(format!("op: {}", self.op));
    }
    parts.push(format!("kind: {}", self.kind));
    if !self.msg.is_empty() {
      parts.push(format!("msg: {}", self.msg));
    }
    if let Some(ref source) = self.source {
      parts.push(format!("err: {}", source));
    }

    write!(f, "{}", parts.join(", "))
  }
}

impl Error for DBError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    self.source.as_ref().map(|e| &**e as &(dyn Error + 'static))
  }
}

/// Map a sqlx error onto a store error, classifying Postgres SQLSTATE
/// codes for constraint and availability failures.
pub fn handle_db_error(err: SqlxError, op: &str) -> DBError {
  match err {
    SqlxError::RowNotFound => DBError::new(
      DBErrorKind::NoRows,
      Some(Box::new(SqlxError::RowNotFound)),
      "the requested row is not found",
      op,
    ),

    SqlxError::Database(db_err) => {
      let code = db_err
        .try_downcast_ref::<PgDatabaseError>()
        .map(|pg| pg.code().to_string())
        .unwrap_or_default();

      let (kind, msg) = match code.as_str() {
        "23505" => (DBErrorKind::UniqueViolation, "row already exists"),
        "23503" => (DBErrorKind::ForeignKeyViolation, "referenced row is not found"),
        "23502" => (DBErrorKind::NotNullViolation, "required column is null"),
        "08000" | "08003" | "08006" => {
          (DBErrorKind::Connection, "database connection exception")
        }
        _ => (DBErrorKind::Internal, "database error"),
      };

      DBError::new(kind, Some(Box::new(SqlxError::Database(db_err))), msg, op)
    }

    _ => DBError::new(DBErrorKind::Internal, Some(Box::new(err)), "database error", op),
  }
}

impl From<DBError> for AppError {
  fn from(err: DBError) -> AppError {
    let kind = match err.kind {
      DBErrorKind::NoRows => AppErrorKind::NotFound,
      _ => AppErrorKind::Store,
    };
    let where_ = err.op.clone();
    let message = err.msg.clone();
    AppError::new(kind, where_, message, Some(Box::new(err)))
  }
}
