//! Keyboard focus movement over a [`CalendarGrid`].
//!
//! Every move lands on an enabled cell or does not happen at all. Left/Right stay within the
//! focused row; Up/Down keep the column and skip over disabled rows.

use crate::calendar::grid::CalendarGrid;
use crate::calendar::grid::GridPos;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::keymap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridMove {
    Left,
    Right,
    Up,
    Down,
    /// First enabled cell in the focused row.
    RowStart,
    /// Last enabled cell in the focused row.
    RowEnd,
    /// First enabled cell of the focused column, scanning from the top row.
    FirstRow,
    /// Last enabled cell of the focused column, scanning from the bottom row.
    LastRow,
}

/// Returns the cell `mv` lands on, or `None` when focus should stay where it is.
pub fn step(grid: &CalendarGrid, from: GridPos, mv: GridMove) -> Option<GridPos> {
    let rows = grid.rows();
    if from.row >= rows || from.col >= 7 {
        return None;
    }
    let in_row = |col: usize| GridPos::new(from.row, col);
    let in_col = |row: usize| GridPos::new(row, from.col);
    let enabled = |p: &GridPos| grid.is_enabled(*p);

    let target = match mv {
        GridMove::Right => (from.col + 1..7).map(in_row).find(enabled),
        GridMove::Left => (0..from.col).rev().map(in_row).find(enabled),
        GridMove::Down => (from.row + 1..rows).map(in_col).find(enabled),
        GridMove::Up => (0..from.row).rev().map(in_col).find(enabled),
        GridMove::RowStart => (0..7).map(in_row).find(enabled),
        GridMove::RowEnd => (0..7).rev().map(in_row).find(enabled),
        GridMove::FirstRow => (0..rows).map(in_col).find(enabled),
        GridMove::LastRow => (0..rows).rev().map(in_col).find(enabled),
    };
    target.filter(|p| *p != from)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalendarKey {
    Move(GridMove),
    Activate,
}

#[derive(Clone, Debug)]
pub struct CalendarBindings {
    pub left: Vec<KeyEvent>,
    pub right: Vec<KeyEvent>,
    pub up: Vec<KeyEvent>,
    pub down: Vec<KeyEvent>,
    pub row_start: Vec<KeyEvent>,
    pub row_end: Vec<KeyEvent>,
    pub first_row: Vec<KeyEvent>,
    pub last_row: Vec<KeyEvent>,
    pub activate: Vec<KeyEvent>,
}

impl Default for CalendarBindings {
    fn default() -> Self {
        Self {
            left: vec![keymap::key(KeyCode::Left)],
            right: vec![keymap::key(KeyCode::Right)],
            up: vec![keymap::key(KeyCode::Up)],
            down: vec![keymap::key(KeyCode::Down)],
            row_start: vec![keymap::key(KeyCode::Home)],
            row_end: vec![keymap::key(KeyCode::End)],
            first_row: vec![keymap::key(KeyCode::PageUp)],
            last_row: vec![keymap::key(KeyCode::PageDown)],
            activate: vec![keymap::key(KeyCode::Enter), keymap::key_char(' ')],
        }
    }
}

impl CalendarBindings {
    pub fn action_for(&self, key: &KeyEvent) -> Option<CalendarKey> {
        let table = [
            (&self.left, CalendarKey::Move(GridMove::Left)),
            (&self.right, CalendarKey::Move(GridMove::Right)),
            (&self.up, CalendarKey::Move(GridMove::Up)),
            (&self.down, CalendarKey::Move(GridMove::Down)),
            (&self.row_start, CalendarKey::Move(GridMove::RowStart)),
            (&self.row_end, CalendarKey::Move(GridMove::RowEnd)),
            (&self.first_row, CalendarKey::Move(GridMove::FirstRow)),
            (&self.last_row, CalendarKey::Move(GridMove::LastRow)),
            (&self.activate, CalendarKey::Activate),
        ];
        table
            .into_iter()
            .find(|(keys, _)| keymap::matches_any(keys, key))
            .map(|(_, action)| action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::grid::CalendarGridEngine;
    use crate::calendar::grid::DateConstraints;
    use crate::calendar::grid::YearMonth;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    /// February 2024, Sunday first:
    ///
    /// ```text
    /// 28 29 30 31  1  2  3
    ///  4  5  6  7  8  9 10
    /// 11 12 13 14 15 16 17
    /// 18 19 20 21 22 23 24
    /// 25 26 27 28 29  1  2
    /// ```
    fn grid(disabled: &[u32]) -> CalendarGrid {
        CalendarGridEngine::new(YearMonth::new(2024, 2).unwrap())
            .with_constraints(DateConstraints {
                disabled: disabled.iter().map(|day| d(*day)).collect(),
                ..DateConstraints::default()
            })
            .compute_grid()
    }

    #[test]
    fn right_skips_disabled_cells() {
        let g = grid(&[5, 6]);
        let from = g.position_of(d(4)).unwrap();
        assert_eq!(step(&g, from, GridMove::Right), g.position_of(d(7)));
    }

    #[test]
    fn right_stops_at_row_edge() {
        let g = grid(&[8, 9, 10]);
        let from = g.position_of(d(7)).unwrap();
        assert_eq!(step(&g, from, GridMove::Right), None);

        let from = g.position_of(d(3)).unwrap();
        assert_eq!(step(&g, from, GridMove::Right), None);
        assert_eq!(step(&g, g.position_of(d(11)).unwrap(), GridMove::Left), None);
    }

    #[test]
    fn vertical_moves_keep_column_across_disabled_rows() {
        let g = grid(&[14, 21]);
        let from = g.position_of(d(7)).unwrap();
        assert_eq!(step(&g, from, GridMove::Down), g.position_of(d(28)));

        let g = grid(&[14, 21, 28]);
        assert_eq!(step(&g, from, GridMove::Down), None);
        assert_eq!(step(&g, from, GridMove::Up), g.position_of(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
    }

    #[test]
    fn home_end_and_paging() {
        let g = grid(&[11, 17]);
        let from = g.position_of(d(14)).unwrap();
        assert_eq!(step(&g, from, GridMove::RowStart), g.position_of(d(12)));
        assert_eq!(step(&g, from, GridMove::RowEnd), g.position_of(d(16)));

        let from = g.position_of(d(15)).unwrap();
        assert_eq!(step(&g, from, GridMove::FirstRow), g.position_of(d(1)));
        assert_eq!(step(&g, from, GridMove::LastRow), g.position_of(d(29)));
    }

    #[test]
    fn bindings_map_default_keys() {
        let b = CalendarBindings::default();
        assert_eq!(
            b.action_for(&keymap::key(KeyCode::PageDown)),
            Some(CalendarKey::Move(GridMove::LastRow))
        );
        assert_eq!(b.action_for(&keymap::key_char(' ')), Some(CalendarKey::Activate));
        assert_eq!(b.action_for(&keymap::key_char('x')), None);
    }
}
