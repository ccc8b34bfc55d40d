//! The multi-step booking form.
//!
//! ```text
//! PersonalInfo ──validate──▶ AdditionalDetails ──▶ Review ──submit──▶ Submitting
//!                                                    ▲                    │
//!                                                    └──── failure ───────┤
//!                                                                         ▼
//!                                                                      Success
//! ```
//!
//! Only the first transition is gated. A persistence failure returns to
//! `Review` with every field intact so the visitor can retry. Abandoning the
//! form at any step has no side effects.

use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;

use crate::{
  Error, Result,
  booking::{DocumentAttachment, NewBooking},
  plot::PlotId,
};

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PHONE_LEN: usize = 10;

// ─── Steps ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  PersonalInfo,
  AdditionalDetails,
  Review,
  Submitting,
  Success,
}

impl Step {
  /// 1-based position among the three editable steps, if editable.
  pub fn ordinal(self) -> Option<usize> {
    match self {
      Self::PersonalInfo => Some(1),
      Self::AdditionalDetails => Some(2),
      Self::Review => Some(3),
      Self::Submitting | Self::Success => None,
    }
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::PersonalInfo => "Personal Information",
      Self::AdditionalDetails => "Additional Details",
      Self::Review => "Review",
      Self::Submitting => "Submitting",
      Self::Success => "Booked",
    })
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
  Name,
  Email,
  Phone,
}

/// Per-field messages from a failed step transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn get(&self, field: Field) -> Option<&str> {
    self.0.get(&field).map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
    self.0.iter().map(|(f, m)| (*f, m.as_str()))
  }

  fn insert(&mut self, field: Field, message: &str) {
    self.0.insert(field, message.to_owned());
  }
}

/// Check the personal-info fields.
pub fn validate_personal_info(name: &str, email: &str, phone: &str) -> FieldErrors {
  let mut errors = FieldErrors::default();
  if name.trim().chars().count() < MIN_NAME_LEN {
    errors.insert(Field::Name, "Name must be at least 2 characters");
  }
  if !is_valid_email(email) {
    errors.insert(Field::Email, "Please enter a valid email address");
  }
  if phone.trim().chars().count() < MIN_PHONE_LEN {
    errors.insert(Field::Phone, "Phone number must be at least 10 digits");
  }
  errors
}

/// Syntactic check only: `local@domain.tld`, no whitespace, one `@`, and a
/// dotted domain without empty labels.
pub fn is_valid_email(email: &str) -> bool {
  let email = email.trim();
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.contains('@')
    && domain.contains('.')
    && domain.split('.').all(|label| !label.is_empty())
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// Form state for booking a single plot.
#[derive(Debug, Clone)]
pub struct BookingForm {
  plot:           PlotId,
  step:           Step,
  pub name:       String,
  pub email:      String,
  pub phone:      String,
  pub visit_date: Option<NaiveDate>,
  pub note:       String,
  /// Optional government ID, stored after the booking is persisted.
  pub document:   Option<DocumentAttachment>,
  errors:         FieldErrors,
  submit_error:   Option<String>,
}

impl BookingForm {
  pub fn new(plot: PlotId) -> Self {
    Self {
      plot,
      step: Step::PersonalInfo,
      name: String::new(),
      email: String::new(),
      phone: String::new(),
      visit_date: None,
      note: String::new(),
      document: None,
      errors: FieldErrors::default(),
      submit_error: None,
    }
  }

  pub fn plot(&self) -> PlotId { self.plot }

  pub fn step(&self) -> Step { self.step }

  /// Field errors from the last gated transition attempt.
  pub fn errors(&self) -> &FieldErrors { &self.errors }

  /// Message from the last failed submission, if any.
  pub fn submit_error(&self) -> Option<&str> { self.submit_error.as_deref() }

  /// Whether the visitor can still change field values.
  pub fn is_editable(&self) -> bool { self.step.ordinal().is_some() }

  /// Advance one step. Leaving `PersonalInfo` requires valid personal info;
  /// on failure the step is unchanged and the errors are returned (and kept
  /// on the form for display).
  pub fn next(&mut self) -> Result<Step, FieldErrors> {
    match self.step {
      Step::PersonalInfo => {
        let errors = validate_personal_info(&self.name, &self.email, &self.phone);
        if !errors.is_empty() {
          self.errors = errors.clone();
          return Err(errors);
        }
        self.errors = FieldErrors::default();
        self.step = Step::AdditionalDetails;
      }
      Step::AdditionalDetails => self.step = Step::Review,
      Step::Review | Step::Submitting | Step::Success => {}
    }
    Ok(self.step)
  }

  /// Go back one editable step.
  pub fn back(&mut self) -> Step {
    self.step = match self.step {
      Step::AdditionalDetails => Step::PersonalInfo,
      Step::Review => Step::AdditionalDetails,
      other => other,
    };
    self.step
  }

  /// The booking payload the current values would produce.
  pub fn payload(&self) -> NewBooking {
    let mut booking = NewBooking::new(self.plot, self.name.trim());
    booking.contact_info = non_empty(&self.email);
    booking.phone = non_empty(&self.phone);
    booking.visit_date = self.visit_date;
    booking.note = non_empty(&self.note);
    booking
  }

  /// Enter `Submitting` from `Review` and return the payload to persist.
  pub fn begin_submit(&mut self) -> Result<NewBooking> {
    if self.step != Step::Review {
      return Err(Error::NotReadyToSubmit(self.step.to_string()));
    }
    self.step = Step::Submitting;
    self.submit_error = None;
    Ok(self.payload())
  }

  /// The booking was persisted.
  pub fn succeed(&mut self) {
    if self.step == Step::Submitting {
      self.step = Step::Success;
    }
  }

  /// Persisting failed: return to `Review` with nothing cleared.
  pub fn fail(&mut self, message: impl Into<String>) {
    if self.step == Step::Submitting {
      self.step = Step::Review;
      self.submit_error = Some(message.into());
    }
  }

  /// Clear every field and start over for the same plot.
  pub fn reset(&mut self) { *self = Self::new(self.plot); }
}

fn non_empty(s: &str) -> Option<String> {
  let s = s.trim();
  (!s.is_empty()).then(|| s.to_owned())
}
