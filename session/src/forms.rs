//! Form input validation.
//!
//! Each form collects raw field text from a screen, validates it, and yields
//! the request body for its endpoint. Errors are reported per field, first
//! failure wins, with the portal's user-facing copy.

#[cfg(test)]
#[path = "forms_test.rs"]
mod forms_test;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ApiError;
use crate::types::{CreateTenantInput, LoginInput, RegistrationInput, TenantResponse};

pub const MSG_EMAIL_INVALID: &str = "Email tidak valid";
pub const MSG_PASSWORD_SHORT: &str = "Kata sandi minimal 6 karakter";
pub const MSG_FULL_NAME_SHORT: &str = "Nama lengkap minimal 2 karakter";
pub const MSG_PASSWORD_MISMATCH: &str = "Kata sandi tidak cocok";
pub const MSG_NAME_REQUIRED: &str = "Nama wajib diisi";
pub const MSG_NAME_LONG: &str = "Nama maksimal 255 karakter";
pub const MSG_DOMAIN_LONG: &str = "Domain maksimal 255 karakter";
pub const MSG_EMAIL_LONG: &str = "Email maksimal 255 karakter";
pub const MSG_PHONE_LONG: &str = "Nomor telepon maksimal 50 karakter";

/// Shown when sign-in fails, whatever the cause.
pub const MSG_LOGIN_FAILED: &str = "Email atau kata sandi salah. Silakan coba lagi.";
/// Shown when registration fails without a server message.
pub const MSG_REGISTRATION_FAILED: &str = "Registrasi gagal. Silakan coba lagi.";
pub const MSG_REGISTRATION_SUCCEEDED: &str = "Registrasi Berhasil. Anda akan diarahkan ke halaman login.";
/// Shown when tenant creation fails without a server message.
pub const MSG_TENANT_FAILED: &str = "Gagal membuat tenant. Silakan coba lagi.";
pub const MSG_TENANT_CREATED: &str = "Tenant berhasil dibuat";

const MIN_PASSWORD: usize = 6;
const MIN_FULL_NAME: usize = 2;
const MAX_TEXT: usize = 255;
const MAX_PHONE: usize = 50;

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| match Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$") {
        Ok(re) => Some(re),
        Err(err) => {
            log::error!("forms: email pattern failed to compile: {err}");
            None
        }
    });

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(email))
}

/// The server's message for a failed request, or `fallback` when it gave none.
#[must_use]
pub fn failure_message(err: &ApiError, fallback: &str) -> String {
    if err.message.trim().is_empty() { fallback.to_owned() } else { err.message.clone() }
}

/// Confirmation shown after a tenant is created.
#[must_use]
pub fn tenant_success_message(response: &TenantResponse) -> String {
    response
        .message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(MSG_TENANT_CREATED)
        .to_owned()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Per-field validation messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, &'static str>);

impl FieldErrors {
    fn add(&mut self, field: &'static str, message: &'static str) {
        self.0.entry(field).or_insert(message);
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns the failing fields (`email`, `password`).
    pub fn validate(&self) -> Result<LoginInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        if !is_valid_email(&self.email) {
            errors.add("email", MSG_EMAIL_INVALID);
        }
        if char_len(&self.password) < MIN_PASSWORD {
            errors.add("password", MSG_PASSWORD_SHORT);
        }
        errors.into_result(LoginInput { email: self.email.clone(), password: self.password.clone() })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// # Errors
    ///
    /// Returns the failing fields (`full_name`, `email`, `password`,
    /// `confirm_password`).
    pub fn validate(&self) -> Result<RegistrationInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        if char_len(&self.full_name) < MIN_FULL_NAME {
            errors.add("full_name", MSG_FULL_NAME_SHORT);
        }
        if !is_valid_email(&self.email) {
            errors.add("email", MSG_EMAIL_INVALID);
        }
        if char_len(&self.password) < MIN_PASSWORD {
            errors.add("password", MSG_PASSWORD_SHORT);
        }
        if char_len(&self.confirm_password) < MIN_PASSWORD {
            errors.add("confirm_password", MSG_PASSWORD_SHORT);
        }
        // Only checked once both fields pass their own rules.
        if errors.is_empty() && self.password != self.confirm_password {
            errors.add("confirm_password", MSG_PASSWORD_MISMATCH);
        }
        errors.into_result(RegistrationInput {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateTenantForm {
    pub name: String,
    pub domain: String,
    pub contact_email: String,
    pub phone: String,
    pub address: String,
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

impl CreateTenantForm {
    /// # Errors
    ///
    /// Returns the failing fields (`name`, `domain`, `contact_email`, `phone`).
    pub fn validate(&self) -> Result<CreateTenantInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.name.is_empty() {
            errors.add("name", MSG_NAME_REQUIRED);
        } else if char_len(&self.name) > MAX_TEXT {
            errors.add("name", MSG_NAME_LONG);
        }
        if char_len(&self.domain) > MAX_TEXT {
            errors.add("domain", MSG_DOMAIN_LONG);
        }
        if !self.contact_email.is_empty() {
            if !is_valid_email(&self.contact_email) {
                errors.add("contact_email", MSG_EMAIL_INVALID);
            } else if char_len(&self.contact_email) > MAX_TEXT {
                errors.add("contact_email", MSG_EMAIL_LONG);
            }
        }
        if char_len(&self.phone) > MAX_PHONE {
            errors.add("phone", MSG_PHONE_LONG);
        }
        errors.into_result(CreateTenantInput {
            name: self.name.clone(),
            domain: optional(&self.domain),
            contact_email: optional(&self.contact_email),
            phone: optional(&self.phone),
            address: optional(&self.address),
        })
    }
}
