// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Errors

/// Reasons a mount can fail. The browser entry point turns all of them
/// into "no animation".
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("2d drawing surface unavailable")]
    SurfaceUnavailable,
    #[error("invalid animation config: {0}")]
    InvalidConfig(String),
    #[error("host rejected registration: {0}")]
    Host(String),
}
