use std::{error::Error, fmt};

const MAX_ERROR_LENGTH: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppErrorKind {
  Validation,
  NotFound,
  Store,
  Gateway,
  Internal,
}

impl AppErrorKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      AppErrorKind::Validation => "validation_error",
      AppErrorKind::NotFound => "not_found",
      AppErrorKind::Store => "store_error",
      AppErrorKind::Gateway => "gateway_error",
      AppErrorKind::Internal => "internal_error",
    }
  }
}

/// Service-level error: a kind for the caller to branch on, a user-safe
/// message, and the `where_` path of the operation that raised it.
#[derive(Debug)]
pub struct AppError {
  pub kind: AppErrorKind,
  pub message: String,
  pub where_: String,
  pub wrapped: Option<Box<dyn Error + Send + Sync>>,
}

impl AppError {
  pub fn new(
    kind: AppErrorKind,
    where_: impl Into<String>,
    message: impl Into<String>,
    wrapped: Option<Box<dyn Error + Send + Sync>>,
  ) -> Self {
    Self { kind, message: message.into(), where_: where_.into(), wrapped }
  }

  pub fn validation(where_: impl Into<String>, message: impl Into<String>) -> Self {
    Self::new(AppErrorKind::Validation, where_, message, None)
  }

  pub fn not_found(where_: impl Into<String>, message: impl Into<String>) -> Self {
    Self::new(AppErrorKind::NotFound, where_, message, None)
  }

  pub fn internal(
    where_: impl Into<String>,
    message: impl Into<String>,
    wrapped: Option<Box<dyn Error + Send + Sync>>,
  ) -> Self {
    Self::new(AppErrorKind::Internal, where_, message, wrapped)
  }

  pub fn error_string(&self) -> String {
    let mut s = String::new();

    if !self.where_.is_empty() {
      s.push_str(&self.where_);
      s.push_str(": ");
    }

    s.push_str(&self.message);

    if let Some(ref wrapped) = self.wrapped {
      s.push_str(", ");
      s.push_str(&wrapped.to_string());
    }

    if s.len() > MAX_ERROR_LENGTH {
      s.truncate(MAX_ERROR_LENGTH);
      s.push_str("...");
    }

    s
  }

  pub fn wrap(mut self, err: Box<dyn Error + Send + Sync>) -> Self {
    self.wrapped = Some(err);
    self
  }
}

impl fmt::Display for AppError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.error_string())
  }
}

impl Error for AppError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    self.wrapped.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_string_joins_path_message_and_source() {
    let inner: Box<dyn Error + Send + Sync> = "connection refused".to_string().into();
    let err = AppError::internal("storefront.controller.checkout", "checkout failed", Some(inner));
    assert_eq!(
      err.error_string(),
      "storefront.controller.checkout: checkout failed, connection refused"
    );
  }

  #[test]
  fn test_error_string_is_truncated() {
    let err = AppError::validation("p", "x".repeat(4096));
    assert!(err.error_string().len() <= MAX_ERROR_LENGTH + 3);
    assert!(err.error_string().ends_with("..."));
  }
}
