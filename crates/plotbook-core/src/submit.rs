//! The booking submission flow.
//!
//! Three independent writes happen in order: insert the booking, store the
//! optional identity document, notify the relay. There is no transaction
//! spanning them. A failure in either of the first two sends the form back
//! to `Review`; a failed notification does not, because the booking already
//! exists by then. It is reported on the successful outcome instead.

use thiserror::Error;

use crate::{
  booking::{Booking, document_key},
  form::BookingForm,
  notification::BookingNotification,
  plot::Plot,
  store::{BookingStore, Notifier},
};

#[derive(Debug, Error)]
pub enum SubmitError {
  #[error(transparent)]
  Form(#[from] crate::Error),

  #[error("could not save booking: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("booking {booking_id} was saved but the document upload failed: {source}")]
  Document {
    booking_id: i64,
    #[source]
    source:     Box<dyn std::error::Error + Send + Sync>,
  },
}

/// What a successful submission produced.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
  pub booking:      Booking,
  /// Storage key of the uploaded document, if one was attached.
  pub document_key: Option<String>,
  /// Set when the admin notification could not be delivered.
  pub notify_error: Option<String>,
}

/// Submit `form` for `plot`.
///
/// The form must be at `Review`. On success it ends at `Success`; on a
/// persistence failure it is back at `Review` with the error recorded.
pub async fn submit_booking<S, N>(
  store: &S,
  notifier: &N,
  plot: &Plot,
  form: &mut BookingForm,
) -> Result<SubmitOutcome, SubmitError>
where
  S: BookingStore,
  N: Notifier,
{
  let payload = form.begin_submit()?;

  let booking = match store.insert_booking(payload).await {
    Ok(booking) => booking,
    Err(e) => {
      form.fail(e.to_string());
      return Err(SubmitError::Store(Box::new(e)));
    }
  };

  let document_key = match form.document.clone() {
    Some(doc) => {
      let key = document_key(booking.id, &doc.file_name);
      match store
        .put_document(key.clone(), doc.content_type, doc.bytes)
        .await
      {
        Ok(true) => Some(key),
        stored => {
          let source: Box<dyn std::error::Error + Send + Sync> = match stored {
            Err(e) => Box::new(e),
            _ => Box::new(crate::Error::DocumentExists(key)),
          };
          let err = SubmitError::Document {
            booking_id: booking.id,
            source,
          };
          form.fail(err.to_string());
          return Err(err);
        }
      }
    }
    None => None,
  };

  form.succeed();

  let notification =
    BookingNotification::new(plot, &booking, document_key.is_some());
  let notify_error = notifier
    .notify(&notification)
    .await
    .err()
    .map(|e| e.to_string());

  Ok(SubmitOutcome {
    booking,
    document_key,
    notify_error,
  })
}
