//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page installs its route guard first, then owns its form state and
//! delegates shared pieces to `components`.

pub mod dashboard;
pub mod home;
pub mod login;
pub mod registration;
