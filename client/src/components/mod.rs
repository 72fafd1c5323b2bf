//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render form pieces and dialogs while reading shared state from
//! Leptos context providers.

pub mod create_tenant_modal;
pub mod field_error;
