//! `ratatui-pickers-core` provides headless engines for picker-style widgets: date grids, date and
//! time inputs, searchable selects and command palettes.
//!
//! Nothing here renders. The facade crate `ratatui-pickers` draws engine state with `ratatui`;
//! other hosts can draw it however they like.
//!
//! ## Design goals
//!
//! - Event-loop agnostic: you feed [`input::InputEvent`]s and get action enums back.
//! - No async runtime: the remote insert flow is split into a request
//!   ([`select::SelectAction::InsertRequested`]) and a completion
//!   ([`select::SelectEngine::complete_insert`]) so the caller decides how to perform I/O.
//! - Host-owned configuration: every widget can be built from typed `*Options` or from
//!   string-encoded attributes ([`attrs::Attrs`]). Malformed attributes are logged and ignored.
//!
//! ## Getting started
//!
//! Useful entry points:
//! - [`calendar::Calendar`]: month grid with keyboard navigation, bounds and disabled dates.
//! - [`calendar::input_date::InputDate`]: text field bound to a calendar popover.
//! - [`time::TimeInput`]: hour/minute/meridiem segments.
//! - [`select::SelectEngine`]: single or multiple select with search and insertable options.
//! - [`command::CommandPalette`]: modal command list with global and per-item shortcuts.
//!
//! ## Form integration
//!
//! Widgets implement [`traits::FormValued`]; [`traits::FormValued::hidden_fields`] yields the
//! name/value pairs a native form submission would carry.
pub mod attrs;
pub mod date;
pub mod error;
pub mod form;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;

pub mod input;
pub mod keymap;
pub mod listeners;
pub mod traits;

pub mod options;

pub mod calendar;
pub mod command;
pub mod select;
pub mod time;
