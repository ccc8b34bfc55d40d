//! SQL schema for the Plotbook SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Bookings are insert-only. No UPDATE or DELETE is ever issued.
-- plot_id is not UNIQUE: concurrent bookings of one plot are
-- both kept and readers show the earliest.
CREATE TABLE IF NOT EXISTS plot_bookings (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    plot_id       TEXT    NOT NULL,
    block_id      TEXT    NOT NULL,
    plot_number   INTEGER NOT NULL,
    booked_by     TEXT    NOT NULL,
    contact_info  TEXT,
    phone         TEXT,
    visit_date    TEXT,             -- ISO 8601 date or NULL
    note          TEXT,
    booked_at     TEXT    NOT NULL  -- RFC 3339 UTC; server-assigned
);

-- Write-once binary objects, e.g. `{booking_id}-govid.pdf`.
CREATE TABLE IF NOT EXISTS documents (
    key           TEXT PRIMARY KEY,
    content_type  TEXT,
    bytes         BLOB NOT NULL,
    uploaded_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS plot_bookings_plot_idx ON plot_bookings(plot_id);

PRAGMA user_version = 1;
";
