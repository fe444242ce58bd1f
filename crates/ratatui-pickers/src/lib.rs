//! `ratatui-pickers` draws the engines from `ratatui-pickers-core` with `ratatui`.
//!
//! The engines own all state; the views here are stateless renderers that take an engine and a
//! [`theme::Theme`] and draw into a [`ratatui::buffer::Buffer`]. Feed input to the engine, react
//! to the action it returns, then redraw.
//!
//! - [`calendar_view::CalendarView`] for [`calendar::Calendar`] (and the popover of
//!   [`calendar::input_date::InputDate`]).
//! - [`select_view::SelectView`] for [`select::SelectEngine`].
//! - [`command_view::CommandPaletteView`] for [`command::CommandPalette`].
pub mod theme;

pub mod render;

pub mod calendar_view;
pub mod command_view;
pub mod select_view;

pub use ratatui_pickers_core::attrs;
pub use ratatui_pickers_core::calendar;
pub use ratatui_pickers_core::command;
pub use ratatui_pickers_core::date;
pub use ratatui_pickers_core::error;
pub use ratatui_pickers_core::form;
pub use ratatui_pickers_core::input;
pub use ratatui_pickers_core::keymap;
pub use ratatui_pickers_core::listeners;
pub use ratatui_pickers_core::options;
pub use ratatui_pickers_core::select;
pub use ratatui_pickers_core::time;
pub use ratatui_pickers_core::traits;

#[cfg(feature = "crossterm")]
pub use ratatui_pickers_core::crossterm_input;
