//! Renders the admin notification email for a new booking.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use plotbook_core::notification::BookingNotification;

use crate::mailer::OutgoingEmail;

const ACCENT: &str = "#1e6246";

/// Build the message sent to `admin` for `n`, stamped with `now`.
pub fn render(
  n: &BookingNotification,
  from: &str,
  admin: &str,
  now: DateTime<Utc>,
) -> OutgoingEmail {
  OutgoingEmail {
    from:    from.to_owned(),
    to:      vec![admin.to_owned()],
    subject: subject(n),
    html:    html(n, now),
  }
}

pub fn subject(n: &BookingNotification) -> String {
  format!("New Plot Booking: {} in Block {}", n.plot.id, n.plot.block)
}

fn html(n: &BookingNotification, now: DateTime<Utc>) -> String {
  let plot = &n.plot;
  let booking = &n.booking;

  let mut customer = String::new();
  line(&mut customer, "Name", &booking.booked_by);
  line(&mut customer, "Email", booking.contact_info.as_deref().unwrap_or("—"));
  line(&mut customer, "Phone", booking.phone.as_deref().unwrap_or("—"));
  if let Some(date) = booking.visit_date {
    line(&mut customer, "Preferred Visit Date", &date.format("%B %-d, %Y").to_string());
  }
  if let Some(note) = booking.note.as_deref().filter(|s| !s.trim().is_empty()) {
    line(&mut customer, "Additional Notes", note);
  }
  if n.has_document {
    line(&mut customer, "Government ID", "Uploaded (available in document storage)");
  }

  let mut plot_info = String::new();
  line(&mut plot_info, "Plot ID", &plot.id);
  line(&mut plot_info, "Block", &plot.block);
  line(&mut plot_info, "Plot Number", &plot.number.to_string());
  line(&mut plot_info, "Size", &format!("{} sq. yd", plot.size));

  let mut meta = String::new();
  line(&mut meta, "Booking ID", &booking.id.to_string());
  line(&mut meta, "Timestamp", &now.format("%Y-%m-%d %H:%M:%S UTC").to_string());

  format!(
    r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; color: #333;">
  <h1 style="color: {ACCENT}; border-bottom: 1px solid #eee; padding-bottom: 10px;">New Plot Booking</h1>
  <div style="margin: 20px 0; background: #f9f9f9; border-left: 4px solid {ACCENT}; padding: 15px;">
    <h2 style="margin-top: 0;">Plot Information</h2>
{plot_info}  </div>
  <div style="margin: 20px 0; background: #f9f9f9; border-left: 4px solid {ACCENT}; padding: 15px;">
    <h2 style="margin-top: 0;">Customer Information</h2>
{customer}  </div>
  <div style="margin: 20px 0; color: #666; font-size: 14px;">
{meta}  </div>
  <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee; font-size: 12px; color: #999;">
    <p>This is an automated notification from your Plot Booking System.</p>
  </div>
</div>
"#
  )
}

fn line(out: &mut String, label: &str, value: &str) {
  let _ = writeln!(out, "    <p><strong>{label}:</strong> {}</p>", escape(value));
}

/// Minimal HTML text escaping for visitor-supplied values.
pub fn escape(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}
